//! Read access to a built [`Document`].
//!
//! A [`Node`] is a cheap `Copy` handle. Every accessor first follows a
//! `Reference`/`Link` through the document's anchor table, then checks the
//! variant it landed on. Lookups happen on every call; nothing is cached.

use crate::ast::{Document, NodeData, NodeId, NodeKind, NodeType};
use crate::error::NodeError;
use crate::iter::{Entries, Values};
use std::fmt::{self, Display, Write};

#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    fn data(&self) -> &'a NodeData {
        self.doc.data(self.id)
    }

    /// The variant held by this node itself; references are not followed.
    #[must_use]
    pub fn kind(&self) -> &'a NodeKind {
        &self.data().kind
    }

    /// The type of the variant held by this node itself; references are not followed.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.kind().node_type()
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.data().line
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.kind(), NodeKind::Reference(_) | NodeKind::Link(_))
    }

    /// Anchor name of a `Reference` or `Link`.
    #[must_use]
    pub fn target(&self) -> Option<&'a str> {
        self.kind().target()
    }

    /// Follows a reference or link to the anchored node. Other nodes resolve
    /// to themselves.
    ///
    /// # Errors
    /// [`NodeError::UnknownAlias`] if the target anchor does not exist.
    pub fn resolve(&self) -> Result<Node<'a>, NodeError> {
        match self.target() {
            // anchors are never placed on references, so one hop is enough
            Some(name) => self.doc.anchor(name),
            None => Ok(*self),
        }
    }

    /// The `index`-th element of a sequence or positional object.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] on other variants, [`NodeError::OutOfBounds`]
    /// past the end.
    pub fn get(&self, index: usize) -> Result<Node<'a>, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Sequence(items) | NodeKind::ObjSequence { items, .. } => items
                .get(index)
                .map(|id| Node::new(self.doc, *id))
                .ok_or(NodeError::OutOfBounds {
                    index,
                    size: items.len(),
                }),
            other => Err(mismatch("index by position", other)),
        }
    }

    /// The value stored under `key` in a map or field object.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] on other variants, [`NodeError::InvalidAccess`]
    /// for a missing key.
    pub fn field(&self, key: &str) -> Result<Node<'a>, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Map(fields) | NodeKind::ObjMap { fields, .. } => fields
                .get(key)
                .map(|id| Node::new(self.doc, *id))
                .ok_or_else(|| NodeError::InvalidAccess {
                    reason: format!("unknown key `{key}`"),
                }),
            other => Err(mismatch("index by key", other)),
        }
    }

    /// Number of children of a container.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] on scalars.
    pub fn size(&self) -> Result<usize, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Map(fields) | NodeKind::ObjMap { fields, .. } => Ok(fields.len()),
            NodeKind::Sequence(items) | NodeKind::ObjSequence { items, .. } => Ok(items.len()),
            other => Err(mismatch("size", other)),
        }
    }

    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is a tagged object.
    pub fn class_name(&self) -> Result<&'a str, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::ObjMap { class_name, .. } | NodeKind::ObjSequence { class_name, .. } => {
                Ok(class_name)
            }
            other => Err(mismatch("class_name", other)),
        }
    }

    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is an `Int`;
    /// [`NodeError::InvalidAccess`] if the lexeme does not fit in an `i64`.
    pub fn as_int(&self) -> Result<i64, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Int(text) => text.parse().map_err(|_| NodeError::InvalidAccess {
                reason: format!("integer literal `{text}` is out of range"),
            }),
            other => Err(mismatch("as_int", other)),
        }
    }

    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is a `Float`.
    pub fn as_float(&self) -> Result<f64, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Float(text) => text.parse().map_err(|_| NodeError::InvalidAccess {
                reason: format!("float literal `{text}` cannot be read"),
            }),
            other => Err(mismatch("as_float", other)),
        }
    }

    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is a `String`.
    pub fn as_str(&self) -> Result<&'a str, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::String(text) => Ok(text),
            other => Err(mismatch("as_str", other)),
        }
    }

    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is a `Boolean`.
    pub fn as_bool(&self) -> Result<bool, NodeError> {
        let node = self.resolve()?;
        match node.kind() {
            NodeKind::Boolean(text) => Ok(text == "true"),
            other => Err(mismatch("as_bool", other)),
        }
    }

    /// Children of a map-like or sequence-like node.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] on scalars.
    pub fn values(&self) -> Result<Values<'a>, NodeError> {
        let node = self.resolve()?;
        Values::new(self.doc, node.kind()).ok_or_else(|| mismatch("values", node.kind()))
    }

    /// Key/value pairs of a map-like node, in key order.
    ///
    /// # Errors
    /// [`NodeError::TypeMismatch`] unless the node is a `Map` or `ObjMap`.
    pub fn entries(&self) -> Result<Entries<'a>, NodeError> {
        let node = self.resolve()?;
        Entries::new(self.doc, node.kind()).ok_or_else(|| mismatch("entries", node.kind()))
    }

    /// The debug dump of this subtree, starting at `indent` spaces.
    #[must_use]
    pub fn dump(&self, indent: usize) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_dump(&mut out, indent);
        out
    }

    pub(crate) fn write_dump<W: Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        let ty = self.node_type();
        write!(out, "{:indent$}{ty} ", "")?;
        match self.kind() {
            NodeKind::String(text) => writeln!(out, "\"{text}\""),
            NodeKind::Int(text) | NodeKind::Float(text) | NodeKind::Boolean(text) => {
                writeln!(out, "{text}")
            }
            NodeKind::Reference(target) | NodeKind::Link(target) => writeln!(out, "->{target}"),
            kind => {
                if let NodeKind::ObjMap { class_name, .. }
                | NodeKind::ObjSequence { class_name, .. } = kind
                {
                    write!(out, "\"{class_name}\" ")?;
                }
                writeln!(out, ":")?;
                for child in kind.children() {
                    Node::new(self.doc, child).write_dump(out, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_dump(f, 0)
    }
}

fn mismatch(operation: &'static str, found: &NodeKind) -> NodeError {
    NodeError::TypeMismatch {
        operation,
        found: found.node_type(),
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::{NodeError, NodeType};

    fn doc(source: &str) -> crate::Document {
        Parser::new(source).into_document().unwrap()
    }

    #[test]
    fn test_scalar_extraction() {
        let d = doc(r#"[42, -7, 3.14e2, 0.5, true, false, "hi"]"#);
        let root = d.root();
        assert_eq!(root.get(0).unwrap().as_int().unwrap(), 42);
        assert_eq!(root.get(1).unwrap().as_int().unwrap(), -7);
        assert_eq!(root.get(2).unwrap().as_float().unwrap(), 314.0);
        assert_eq!(root.get(3).unwrap().as_float().unwrap(), 0.5);
        assert!(root.get(4).unwrap().as_bool().unwrap());
        assert!(!root.get(5).unwrap().as_bool().unwrap());
        assert_eq!(root.get(6).unwrap().as_str().unwrap(), "hi");
    }

    #[test]
    fn test_type_mismatches() {
        let d = doc(r#"{ n: 1, s: "x", l: [1] }"#);
        let root = d.root();
        assert!(matches!(
            root.field("n").unwrap().size(),
            Err(NodeError::TypeMismatch {
                found: NodeType::Int,
                ..
            })
        ));
        assert!(matches!(
            root.field("n").unwrap().as_float(),
            Err(NodeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            root.field("s").unwrap().as_int(),
            Err(NodeError::TypeMismatch { .. })
        ));
        assert!(matches!(root.get(0), Err(NodeError::TypeMismatch { .. })));
        assert!(matches!(
            root.field("l").unwrap().field("x"),
            Err(NodeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            root.class_name(),
            Err(NodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_and_missing_key() {
        let d = doc("{ seq: [1, 2, 3] }");
        let root = d.root();
        assert_eq!(
            root.field("seq").unwrap().get(5).unwrap_err(),
            NodeError::OutOfBounds { index: 5, size: 3 }
        );
        let err = root.field("nope").unwrap_err();
        assert!(matches!(err, NodeError::InvalidAccess { .. }));
        assert_eq!(err.to_string(), "invalid access: unknown key `nope`");
    }

    #[test]
    fn test_integer_overflow_is_invalid_access() {
        let d = doc("99999999999999999999");
        assert!(matches!(
            d.root().as_int(),
            Err(NodeError::InvalidAccess { .. })
        ));
    }

    #[test]
    fn test_references_are_chased() {
        let d = doc("{ base: &b !Point(x: 1, y: 2), copy: *b, link: @b }");
        let root = d.root();
        for key in ["copy", "link"] {
            let node = root.field(key).unwrap();
            assert!(node.is_reference());
            assert_eq!(node.target(), Some("b"));
            assert_eq!(node.class_name().unwrap(), "Point");
            assert_eq!(node.size().unwrap(), 2);
            assert_eq!(node.field("y").unwrap().as_int().unwrap(), 2);
            assert_eq!(node.resolve().unwrap().id(), root.field("base").unwrap().id());
        }
        assert_eq!(root.field("link").unwrap().node_type(), NodeType::Link);
    }

    #[test]
    fn test_forward_reference_resolves() {
        let d = doc("[ *a, &a 5 ]");
        let root = d.root();
        assert_eq!(root.get(0).unwrap().as_int().unwrap(), 5);
        assert_eq!(
            root.get(0).unwrap().resolve().unwrap().id(),
            root.get(1).unwrap().id()
        );
    }

    #[test]
    fn test_unknown_alias() {
        let d = doc("[*missing]");
        let err = d.root().get(0).unwrap().as_int().unwrap_err();
        assert_eq!(
            err,
            NodeError::UnknownAlias {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_dump_format() {
        let d = doc(r#"{ a: [1, 2.5, true], b: "s", c: !P(x: *r), d: &r !Q(@r2) }"#);
        let expected = "\
Map :
 Sequence :
  Int 1
  Float 2.5
  Boolean true
 String \"s\"
 ObjMap \"P\" :
  Reference ->r
 ObjSequence \"Q\" :
  Link ->r2
";
        assert_eq!(d.root().dump(0), expected);
        assert_eq!(d.to_string(), expected);
    }

    #[test]
    fn test_dump_indent() {
        let d = doc("[1]");
        assert_eq!(d.root().dump(2), "  Sequence :\n   Int 1\n");
    }

    #[test]
    fn test_set_class_name_through_reference() {
        let mut d = doc("[&o !Old(1), *o, 3]");
        let reference = d.root().get(1).unwrap().id();
        d.set_class_name(reference, "New").unwrap();
        assert_eq!(d.root().get(0).unwrap().class_name().unwrap(), "New");

        let scalar = d.root().get(2).unwrap().id();
        assert!(matches!(
            d.set_class_name(scalar, "X"),
            Err(NodeError::TypeMismatch { .. })
        ));
    }
}
