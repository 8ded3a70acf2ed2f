use crate::ast::NodeKind;
use crate::error::NodeError;
use crate::node::Node;
use crate::options::DEFAULT_MAX_DEPTH;
use serde::Serialize;
use std::collections::BTreeMap;

/// Default cap on the number of values one export may produce.
pub const DEFAULT_MAX_EXPORT_VALUES: usize = 1_000_000;

/// A resolved, serializable view of a Knot value.
///
/// References and links are replaced by the value they name, so the same
/// anchored subtree can appear several times in the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

/// Bounds on an export. Inlined references can nest and copy subtrees far
/// beyond the size of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLimits {
    /// Deepest allowed output nesting. Entering a container and following a
    /// reference each count as one level; the root is at depth 1.
    pub max_depth: usize,
    /// Most values the export may produce in total.
    pub max_values: usize,
}

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_values: DEFAULT_MAX_EXPORT_VALUES,
        }
    }
}

impl ExportLimits {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_values(mut self, max_values: usize) -> Self {
        self.max_values = max_values;
        self
    }
}

/// Converts `node` and everything below it under the default [`ExportLimits`].
///
/// Tagged objects become a single-key object `{ ClassName: body }`.
///
/// # Errors
/// See [`to_value_with`].
pub fn to_value(node: Node<'_>) -> Result<Value, NodeError> {
    to_value_with(node, ExportLimits::default())
}

/// Converts `node` and everything below it.
///
/// # Errors
/// [`NodeError::UnknownAlias`] for a dangling reference,
/// [`NodeError::InvalidAccess`] when `limits` are exceeded, and the errors of
/// [`Node::as_int`] / [`Node::as_float`] for unreadable number literals.
pub fn to_value_with(node: Node<'_>, limits: ExportLimits) -> Result<Value, NodeError> {
    Exporter {
        limits,
        produced: 0,
    }
    .convert(node, 1)
}

struct Exporter {
    limits: ExportLimits,
    produced: usize,
}

impl Exporter {
    // recursion is bounded by `limits.max_depth`
    fn convert(&mut self, node: Node<'_>, depth: usize) -> Result<Value, NodeError> {
        let (node, depth) = if node.is_reference() {
            (node.resolve()?, depth + 1)
        } else {
            (node, depth)
        };
        if depth > self.limits.max_depth {
            return Err(NodeError::InvalidAccess {
                reason: format!(
                    "export nesting exceeds {} levels (line {})",
                    self.limits.max_depth,
                    node.line()
                ),
            });
        }
        self.produced += 1;
        if self.produced > self.limits.max_values {
            return Err(NodeError::InvalidAccess {
                reason: format!("export exceeds {} values", self.limits.max_values),
            });
        }

        let value = match node.kind() {
            NodeKind::String(text) => Value::String(text.clone()),
            NodeKind::Int(_) => Value::Int(node.as_int()?),
            NodeKind::Float(_) => Value::Float(node.as_float()?),
            NodeKind::Boolean(_) => Value::Boolean(node.as_bool()?),
            NodeKind::Map(_) => self.object_body(node, depth)?,
            NodeKind::Sequence(_) => self.array_body(node, depth)?,
            NodeKind::ObjMap { class_name, .. } => {
                tagged(class_name, self.object_body(node, depth)?)
            }
            NodeKind::ObjSequence { class_name, .. } => {
                tagged(class_name, self.array_body(node, depth)?)
            }
            // anchors never sit on references
            NodeKind::Reference(name) | NodeKind::Link(name) => {
                return Err(NodeError::InvalidAccess {
                    reason: format!("reference to `{name}` resolves to another reference"),
                })
            }
        };
        Ok(value)
    }

    fn object_body(&mut self, node: Node<'_>, depth: usize) -> Result<Value, NodeError> {
        let mut map = BTreeMap::new();
        for (key, child) in node.entries()? {
            map.insert(key.to_string(), self.convert(child, depth + 1)?);
        }
        Ok(Value::Object(map))
    }

    fn array_body(&mut self, node: Node<'_>, depth: usize) -> Result<Value, NodeError> {
        let mut items = Vec::with_capacity(node.size()?);
        for child in node.values()? {
            items.push(self.convert(child, depth + 1)?);
        }
        Ok(Value::Array(items))
    }
}

fn tagged(class_name: &str, body: Value) -> Value {
    let mut map = BTreeMap::new();
    map.insert(class_name.to_string(), body);
    Value::Object(map)
}
