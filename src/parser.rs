use crate::ast::Document;
use crate::error::{KnotError, ParseError};
use crate::grammar::GrammarChecker;
use crate::interpreter::Interpreter;
use crate::lexer::{Lexer, Token, TokenType};
use crate::options::ParseOptions;
use crate::validator;
use log::debug;
use miette::{NamedSource, SourceSpan};
use std::cell::OnceCell;
use std::fmt::Display;
use std::io::Read;

/// Drives a Knot source through lexing, the grammar check, tree building and
/// cycle validation.
///
/// All work happens on the first call to [`Parser::get_document`]; the outcome,
/// success or failure, is cached and handed out again on later calls.
#[derive(Debug)]
pub struct Parser {
    source: String,
    options: ParseOptions,
    outcome: OnceCell<Result<Parsed, KnotError>>,
}

#[derive(Debug)]
struct Parsed {
    tokens: Vec<Token>,
    document: Document,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn new_with_name(source: &str, name: impl Into<String>) -> Self {
        Self::with_options(source, ParseOptions::default().with_source_name(name))
    }

    pub fn with_options(source: &str, options: ParseOptions) -> Self {
        Self {
            source: source.to_string(),
            options,
            outcome: OnceCell::new(),
        }
    }

    /// Reads the whole stream up front; parsing is still deferred.
    ///
    /// # Errors
    /// Returns [`KnotError::Io`] if the reader fails or yields invalid UTF-8.
    pub fn from_reader<R: Read>(reader: R, options: ParseOptions) -> Result<Self, KnotError> {
        let mut reader = reader;
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self {
            source,
            options,
            outcome: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses and validates the document once, then returns the cached result.
    ///
    /// # Errors
    /// Returns the [`KnotError::Lex`], [`KnotError::Parse`] or
    /// [`KnotError::Validate`] that aborted the parse. No partial document is
    /// ever produced.
    pub fn get_document(&self) -> Result<&Document, KnotError> {
        match self
            .outcome
            .get_or_init(|| run(&self.source, &self.options))
        {
            Ok(parsed) => Ok(&parsed.document),
            Err(err) => Err(err.clone()),
        }
    }

    /// Like [`Parser::get_document`], but hands over ownership of the document.
    ///
    /// # Errors
    /// See [`Parser::get_document`].
    pub fn into_document(self) -> Result<Document, KnotError> {
        let outcome = match self.outcome.into_inner() {
            Some(outcome) => outcome,
            None => run(&self.source, &self.options),
        };
        outcome.map(|parsed| parsed.document)
    }

    /// Tokens of a successful parse; empty before the first parse or after a
    /// failed one.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        match self.outcome.get() {
            Some(Ok(parsed)) => &parsed.tokens,
            _ => &[],
        }
    }
}

fn run(source: &str, options: &ParseOptions) -> Result<Parsed, KnotError> {
    let tokens = Lexer::new_with_name(source, options.source_name.as_str()).lex()?;
    debug!(source = options.source_name.as_str(), tokens = tokens.len(); "lexing complete");

    GrammarChecker::new(TokenCursor::new(&tokens, source, &options.source_name), options.max_depth)
        .check_document()?;
    debug!("grammar check passed");

    let document = Interpreter::new(TokenCursor::new(&tokens, source, &options.source_name))
        .interpret_document()?;
    debug!(
        nodes = document.node_count(),
        anchors = document.anchors().len();
        "document built"
    );

    validator::check_for_cycles(&document)?;
    Ok(Parsed { tokens, document })
}

/// Position in a token list plus the helpers both parse passes share.
///
/// The token list always ends with [`TokenType::Eof`], so there is always a
/// current token.
#[derive(Debug, Clone)]
pub(crate) struct TokenCursor<'t> {
    tokens: &'t [Token],
    position: usize,
    source_text: &'t str,
    source_name: &'t str,
}

impl<'t> TokenCursor<'t> {
    pub(crate) fn new(tokens: &'t [Token], source_text: &'t str, source_name: &'t str) -> Self {
        Self {
            tokens,
            position: 0,
            source_text,
            source_name,
        }
    }

    pub(crate) fn current(&self) -> &'t Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn line(&self) -> usize {
        self.current().line
    }

    pub(crate) fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, ttype: TokenType) -> bool {
        self.current().ttype == ttype
    }

    /// Consumes the current token if it has type `ttype`.
    pub(crate) fn accept(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes and returns the current token, which must have type `ttype`.
    pub(crate) fn expect(&mut self, ttype: TokenType) -> Result<&'t Token, ParseError> {
        if self.check(ttype) {
            Ok(self.advance())
        } else {
            Err(self.err_unexpected(ttype))
        }
    }

    pub(crate) fn err_unexpected(&self, expected: impl Display) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            line: token.line,
            found: token.ttype.to_string(),
            expected: expected.to_string(),
            src: self.named_source(),
            span: span_of(token),
        }
    }

    pub(crate) fn err_invalid_value(&self) -> ParseError {
        let token = self.current();
        ParseError::InvalidValue {
            line: token.line,
            found: token.ttype.to_string(),
            src: self.named_source(),
            span: span_of(token),
        }
    }

    pub(crate) fn err_aliased(&self, anchor: &Token) -> ParseError {
        ParseError::AliasedReference {
            line: self.line(),
            src: self.named_source(),
            span: span_of(anchor),
        }
    }

    pub(crate) fn err_too_deep(&self, limit: usize) -> ParseError {
        let token = self.current();
        ParseError::TooDeep {
            line: token.line,
            limit,
            src: self.named_source(),
            span: span_of(token),
        }
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.source_name, self.source_text.to_string())
    }
}

fn span_of(token: &Token) -> SourceSpan {
    (token.pos_start, token.pos_end - token.pos_start).into()
}
