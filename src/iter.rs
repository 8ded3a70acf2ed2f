use crate::ast::{Document, NodeId, NodeKind};
use crate::node::Node;
use std::collections::btree_map;
use std::slice;

/// Children of a container node, whether it is map-like or sequence-like.
///
/// Maps yield their values in key order, sequences in insertion order. The
/// iterator is finite; calling [`Node::values`] again starts over.
#[derive(Debug, Clone)]
pub struct Values<'a> {
    doc: &'a Document,
    inner: ValuesInner<'a>,
}

#[derive(Debug, Clone)]
enum ValuesInner<'a> {
    Map(btree_map::Values<'a, String, NodeId>),
    Sequence(slice::Iter<'a, NodeId>),
}

impl<'a> Values<'a> {
    /// `None` for scalars and references.
    pub(crate) fn new(doc: &'a Document, kind: &'a NodeKind) -> Option<Self> {
        let inner = match kind {
            NodeKind::Map(fields) | NodeKind::ObjMap { fields, .. } => {
                ValuesInner::Map(fields.values())
            }
            NodeKind::Sequence(items) | NodeKind::ObjSequence { items, .. } => {
                ValuesInner::Sequence(items.iter())
            }
            _ => return None,
        };
        Some(Self { doc, inner })
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = match &mut self.inner {
            ValuesInner::Map(values) => values.next(),
            ValuesInner::Sequence(items) => items.next(),
        }?;
        Some(Node::new(self.doc, *id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            ValuesInner::Map(values) => values.size_hint(),
            ValuesInner::Sequence(items) => items.size_hint(),
        }
    }
}

impl ExactSizeIterator for Values<'_> {}

/// Key/value pairs of a map-like node, in key order.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    doc: &'a Document,
    inner: btree_map::Iter<'a, String, NodeId>,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(doc: &'a Document, kind: &'a NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Map(fields) | NodeKind::ObjMap { fields, .. } => Some(Self {
                doc,
                inner: fields.iter(),
            }),
            _ => None,
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a str, Node<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, id)| (key.as_str(), Node::new(self.doc, *id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
