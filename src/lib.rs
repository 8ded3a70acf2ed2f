//! Parser and in-memory tree for Knot, a compact data language with scalars,
//! maps, sequences, tagged objects and named anchors that values can
//! reference (`*name`) or link to (`@name`).
//!
//! ```
//! use knot_core::Parser;
//!
//! let parser = Parser::new("{ base: &b [1, 2], copy: *b }");
//! let doc = parser.get_document().unwrap();
//! assert_eq!(doc.root().field("copy").unwrap().size().unwrap(), 2);
//! ```

pub mod api;
pub mod ast;
pub mod error;
mod grammar;
mod interpreter;
pub mod iter;
pub mod lexer;
pub mod node;
pub mod options;
pub mod parser;
pub mod serialization;
pub mod validator;

pub use api::parse_document;
pub use ast::{AnchorTable, Document, NodeId, NodeKind, NodeType};
pub use error::{KnotError, LexError, NodeError, ParseError, ValidateError};
pub use iter::{Entries, Values};
pub use node::Node;
pub use options::ParseOptions;
pub use parser::Parser;
pub use serialization::{ExportLimits, Value};
