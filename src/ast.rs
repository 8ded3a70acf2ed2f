use crate::error::NodeError;
use crate::node::Node;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The variant tag of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    String,
    Int,
    Float,
    Boolean,
    Map,
    Sequence,
    ObjMap,
    ObjSequence,
    Reference,
    Link,
}

impl NodeType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NodeType::String => "String",
            NodeType::Int => "Int",
            NodeType::Float => "Float",
            NodeType::Boolean => "Boolean",
            NodeType::Map => "Map",
            NodeType::Sequence => "Sequence",
            NodeType::ObjMap => "ObjMap",
            NodeType::ObjSequence => "ObjSequence",
            NodeType::Reference => "Reference",
            NodeType::Link => "Link",
        }
    }

    #[must_use]
    pub fn is_map_like(self) -> bool {
        matches!(self, NodeType::Map | NodeType::ObjMap)
    }

    #[must_use]
    pub fn is_sequence_like(self) -> bool {
        matches!(self, NodeType::Sequence | NodeType::ObjSequence)
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map children, kept in key order.
pub type Fields = BTreeMap<String, NodeId>;

#[derive(Debug, PartialEq, Clone)]
pub enum NodeKind {
    /// Unescaped string contents.
    String(String),
    /// Integer lexeme, parsed on access.
    Int(String),
    /// Float lexeme, parsed on access.
    Float(String),
    /// `true` or `false`.
    Boolean(String),
    Map(Fields),
    Sequence(Vec<NodeId>),
    ObjMap {
        class_name: String,
        fields: Fields,
    },
    ObjSequence {
        class_name: String,
        items: Vec<NodeId>,
    },
    /// `*name`
    Reference(String),
    /// `@name`
    Link(String),
}

impl NodeKind {
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::String(_) => NodeType::String,
            NodeKind::Int(_) => NodeType::Int,
            NodeKind::Float(_) => NodeType::Float,
            NodeKind::Boolean(_) => NodeType::Boolean,
            NodeKind::Map(_) => NodeType::Map,
            NodeKind::Sequence(_) => NodeType::Sequence,
            NodeKind::ObjMap { .. } => NodeType::ObjMap,
            NodeKind::ObjSequence { .. } => NodeType::ObjSequence,
            NodeKind::Reference(_) => NodeType::Reference,
            NodeKind::Link(_) => NodeType::Link,
        }
    }

    /// The anchor name a reference or link points at.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            NodeKind::Reference(name) | NodeKind::Link(name) => Some(name),
            _ => None,
        }
    }

    /// Direct children, in the order they are iterated and dumped.
    pub fn children(&self) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self {
            NodeKind::Map(fields) | NodeKind::ObjMap { fields, .. } => {
                Box::new(fields.values().copied())
            }
            NodeKind::Sequence(items) | NodeKind::ObjSequence { items, .. } => {
                Box::new(items.iter().copied())
            }
            _ => Box::new(std::iter::empty()),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// 1-based line where the value starts.
    pub line: usize,
}

/// Anchor names bound to nodes of one document. The first binding of a name
/// wins.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnchorTable {
    anchors: BTreeMap<String, NodeId>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `node` unless the name is already taken. Returns whether
    /// the binding was recorded.
    pub fn register(&mut self, name: &str, node: NodeId) -> bool {
        if self.anchors.contains_key(name) {
            return false;
        }
        self.anchors.insert(name.to_string(), node);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.anchors.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.anchors.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.anchors.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// A parsed Knot document: the node arena, its root and its anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    anchors: AnchorTable,
}

impl Document {
    pub(crate) fn new(nodes: Vec<NodeData>, root: NodeId, anchors: AnchorTable) -> Self {
        Self {
            nodes,
            root,
            anchors,
        }
    }

    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::new(self, self.root)
    }

    /// Handle for `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.0 < self.nodes.len(), "node id out of range");
        Node::new(self, id)
    }

    #[must_use]
    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    /// The node bound to anchor `name`.
    ///
    /// # Errors
    /// Returns [`NodeError::UnknownAlias`] if no value carries that anchor.
    pub fn anchor(&self, name: &str) -> Result<Node<'_>, NodeError> {
        self.anchors
            .get(name)
            .map(|id| Node::new(self, id))
            .ok_or_else(|| NodeError::UnknownAlias {
                name: name.to_string(),
            })
    }

    /// Total number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Renames the class of a tagged object. References are followed first.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the resolved node is an `ObjMap` or
    /// `ObjSequence`; [`NodeError::UnknownAlias`] for a dangling reference.
    pub fn set_class_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), NodeError> {
        let target = self.node(id).resolve()?.id();
        match &mut self.nodes[target.0].kind {
            NodeKind::ObjMap { class_name, .. } | NodeKind::ObjSequence { class_name, .. } => {
                *class_name = name.into();
                Ok(())
            }
            other => Err(NodeError::TypeMismatch {
                operation: "set_class_name",
                found: other.node_type(),
            }),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root().write_dump(f, 0)
    }
}

/// Accumulates nodes while a document is being built.
#[derive(Debug, Default)]
pub(crate) struct DocumentBuilder {
    nodes: Vec<NodeData>,
    anchors: AnchorTable,
}

impl DocumentBuilder {
    pub(crate) fn push(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { kind, line });
        id
    }

    pub(crate) fn anchors_mut(&mut self) -> &mut AnchorTable {
        &mut self.anchors
    }

    pub(crate) fn finish(self, root: NodeId) -> Document {
        Document::new(self.nodes, root, self.anchors)
    }
}

/// Keys of a map body; a repeated key keeps its first value.
pub(crate) fn insert_field(fields: &mut Fields, key: String, value: NodeId) {
    fields.entry(key).or_insert(value);
}
