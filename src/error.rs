use crate::ast::NodeType;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Every failure the crate can report.
///
/// Lex, parse and validate errors abort [`crate::Parser::get_document`]; node
/// errors are raised later by accessors that misuse an already built tree.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum KnotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Node(#[from] NodeError),

    #[error("failed to read input: {0}")]
    #[diagnostic(code(knot::io))]
    Io(String),
}

impl KnotError {
    /// The 1-based source line, for lex and parse failures.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            KnotError::Lex(e) => Some(e.line()),
            KnotError::Parse(e) => Some(e.line()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KnotError {
    fn from(error: std::io::Error) -> Self {
        KnotError::Io(error.to_string())
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexError {
    #[error("line {line}: unterminated string")]
    #[diagnostic(
        code(knot::lex::unterminated_string),
        help("Close the string with a double quote. A trailing `\\` escapes the closing quote.")
    )]
    UnterminatedString {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("line {line}: invalid token")]
    #[diagnostic(
        code(knot::lex::invalid_token),
        help("This character cannot start any Knot token.")
    )]
    InvalidToken {
        line: usize,
        found: char,
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected `{found}`")]
        span: SourceSpan,
    },

    #[error("line {line}: malformed number")]
    #[diagnostic(
        code(knot::lex::malformed_number),
        help("Numbers need at least one digit, and an exponent marker must be followed by digits.")
    )]
    MalformedNumber {
        line: usize,
        lexeme: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("`{lexeme}` is not a number")]
        span: SourceSpan,
    },
}

impl LexError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedString { line, .. }
            | LexError::InvalidToken { line, .. }
            | LexError::MalformedNumber { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            LexError::UnterminatedString { .. } => "unterminated string",
            LexError::InvalidToken { .. } => "invalid token",
            LexError::MalformedNumber { .. } => "malformed number",
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("line {line}: unexpected token {found}, expected {expected}")]
    #[diagnostic(
        code(knot::parse::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        line: usize,
        found: String,
        expected: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {expected}, but found this")]
        span: SourceSpan,
    },

    #[error("line {line}: invalid value")]
    #[diagnostic(
        code(knot::parse::invalid_value),
        help(
            "A value is a map, sequence, tagged object, reference, link, boolean, number or string."
        )
    )]
    InvalidValue {
        line: usize,
        found: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{found} cannot start a value")]
        span: SourceSpan,
    },

    #[error("line {line}: reference or link is aliased")]
    #[diagnostic(
        code(knot::parse::aliased_reference),
        help("Anchors name values; a reference or link cannot carry an anchor itself.")
    )]
    AliasedReference {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("anchor on a reference or link")]
        span: SourceSpan,
    },

    #[error("line {line}: maximum nesting depth of {limit} exceeded")]
    #[diagnostic(
        code(knot::parse::too_deep),
        help("Raise `ParseOptions::max_depth` if this document is trusted.")
    )]
    TooDeep {
        line: usize,
        limit: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("nesting limit reached here")]
        span: SourceSpan,
    },
}

impl ParseError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidValue { line, .. }
            | ParseError::AliasedReference { line, .. }
            | ParseError::TooDeep { line, .. } => *line,
        }
    }

    /// The error text without the line prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ParseError::UnexpectedToken {
                found, expected, ..
            } => format!("unexpected token {found}, expected {expected}"),
            ParseError::InvalidValue { .. } => "invalid value".to_string(),
            ParseError::AliasedReference { .. } => "reference or link is aliased".to_string(),
            ParseError::TooDeep { limit, .. } => {
                format!("maximum nesting depth of {limit} exceeded")
            }
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error("cyclical reference or link")]
    #[diagnostic(
        code(knot::validate::cycle),
        help("anchor `{anchor}` reaches itself: {path}")
    )]
    Cycle { anchor: String, path: String },
}

impl ValidateError {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ValidateError::Cycle { .. } => "cyclical reference or link",
        }
    }
}

/// Misuse of a successfully built tree.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("type mismatch: {operation} is not supported on {found}")]
    #[diagnostic(code(knot::node::type_mismatch))]
    TypeMismatch {
        operation: &'static str,
        found: NodeType,
    },

    #[error("index {index} out of bounds for size {size}")]
    #[diagnostic(code(knot::node::out_of_bounds))]
    OutOfBounds { index: usize, size: usize },

    #[error("unknown alias `{name}`")]
    #[diagnostic(
        code(knot::node::unknown_alias),
        help("No value in this document is anchored as `&{name}`.")
    )]
    UnknownAlias { name: String },

    #[error("invalid access: {reason}")]
    #[diagnostic(code(knot::node::invalid_access))]
    InvalidAccess { reason: String },
}
