use crate::ast::Document;
use crate::error::{KnotError, NodeError};
use crate::options::ParseOptions;
use crate::parser::Parser;
use crate::serialization::{to_value_with, ExportLimits, Value};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self.to_value().map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

impl Document {
    /// The resolved data of the whole document as a generic, serializable `Value`.
    ///
    /// # Errors
    /// Returns a [`NodeError`] if a reference is dangling, a number literal
    /// does not fit its target type, or the default [`ExportLimits`] are exceeded.
    pub fn to_value(&self) -> Result<Value, NodeError> {
        self.to_value_with(ExportLimits::default())
    }

    /// Like [`Document::to_value`], with explicit bounds on output depth and size.
    ///
    /// # Errors
    /// Also returns [`NodeError::InvalidAccess`] when `limits` are exceeded.
    pub fn to_value_with(&self, limits: ExportLimits) -> Result<Value, NodeError> {
        to_value_with(self.root(), limits)
    }

    /// Serializes the resolved data into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the resolved data into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Parses and validates a Knot source string in one step.
///
/// # Arguments
///
/// * `source` - The Knot source text.
/// * `file_name` - Name shown in diagnostics.
///
/// # Errors
///
/// Returns a `KnotError` if lexing, parsing or cycle validation fails.
pub fn parse_document(source: &str, file_name: &str) -> Result<Document, KnotError> {
    Parser::with_options(source, ParseOptions::default().with_source_name(file_name))
        .into_document()
}
