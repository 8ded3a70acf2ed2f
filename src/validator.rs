//! Rejects documents whose anchors can reach themselves.
//!
//! The graph is built over anchor *names*: an edge `a -> b` means that a
//! `*b` or `@b` occurs somewhere inside the value anchored as `&a`, at any
//! depth. A three-color depth-first search then looks for a back edge. Both
//! the subtree walk and the search run on explicit stacks, so neither depends
//! on the native call stack.

use crate::ast::{Document, NodeId};
use crate::error::ValidateError;
use log::{debug, trace, warn};
use std::collections::{btree_set, BTreeSet, HashMap};

/// Fails with [`ValidateError::Cycle`] if any anchor reaches itself through
/// references or links.
///
/// # Errors
/// See above. Dangling references are not an error here; they fail lazily
/// when accessed.
pub fn check_for_cycles(document: &Document) -> Result<(), ValidateError> {
    warn_dangling(document);
    let graph = AnchorGraph::build(document);
    match graph.find_cycle() {
        Some(cycle) => {
            let path = cycle.join(" -> ");
            debug!(path = path.as_str(); "cycle detected");
            Err(ValidateError::Cycle {
                anchor: cycle[0].to_string(),
                path,
            })
        }
        None => {
            debug!(anchors = graph.len(); "no cycles detected");
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet.
    White,
    /// On the current search path.
    Gray,
    /// Finished.
    Black,
}

/// Anchor-to-anchor reachability in one step.
#[derive(Debug)]
pub struct AnchorGraph<'a> {
    names: Vec<&'a str>,
    edges: Vec<BTreeSet<usize>>,
}

impl<'a> AnchorGraph<'a> {
    pub fn build(document: &'a Document) -> Self {
        let anchors = document.anchors();
        let names: Vec<&'a str> = anchors.iter().map(|(name, _)| name).collect();
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();

        let mut edges = vec![BTreeSet::new(); names.len()];
        for (from, (name, root)) in anchors.iter().enumerate() {
            let mut stack: Vec<NodeId> = vec![root];
            while let Some(id) = stack.pop() {
                let kind = document.node(id).kind();
                match kind.target() {
                    Some(target) => {
                        if let Some(&to) = index.get(target) {
                            trace!(from = name, to = target; "anchor edge");
                            edges[from].insert(to);
                        }
                    }
                    None => stack.extend(kind.children()),
                }
            }
        }

        Self { names, edges }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Targets directly reachable from `anchor`, in name order.
    #[must_use]
    pub fn successors(&self, anchor: &str) -> Vec<&'a str> {
        self.names
            .iter()
            .position(|name| *name == anchor)
            .map(|i| self.edges[i].iter().map(|&j| self.names[j]).collect())
            .unwrap_or_default()
    }

    /// The first cycle found, as the anchor path that closes on its first
    /// element (`[x, y, x]`), or `None` for an acyclic graph.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<&'a str>> {
        let mut color = vec![Color::White; self.names.len()];

        for start in 0..self.names.len() {
            if color[start] != Color::White {
                continue;
            }
            color[start] = Color::Gray;
            let mut stack: Vec<(usize, btree_set::Iter<'_, usize>)> =
                vec![(start, self.edges[start].iter())];

            while let Some((node, successors)) = stack.last_mut() {
                let node = *node;
                match successors.next().copied() {
                    Some(next) => match color[next] {
                        Color::White => {
                            color[next] = Color::Gray;
                            stack.push((next, self.edges[next].iter()));
                        }
                        Color::Gray => {
                            let from = stack
                                .iter()
                                .position(|(on_path, _)| *on_path == next)
                                .unwrap_or(0);
                            let mut cycle: Vec<&'a str> =
                                stack[from..].iter().map(|(i, _)| self.names[*i]).collect();
                            cycle.push(self.names[next]);
                            return Some(cycle);
                        }
                        Color::Black => {}
                    },
                    None => {
                        color[node] = Color::Black;
                        stack.pop();
                    }
                }
            }
        }
        None
    }
}

fn warn_dangling(document: &Document) {
    for index in 0..document.node_count() {
        let node = document.node(NodeId(index));
        if let Some(target) = node.target() {
            if !document.anchors().contains(target) {
                warn!(anchor = target, line = node.line(); "reference to undeclared anchor");
            }
        }
    }
}
