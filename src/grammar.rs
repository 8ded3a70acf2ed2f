//! Syntax-only pass over the token list.
//!
//! Nothing is allocated here; the point is to reject malformed input with a
//! line-tagged [`ParseError`] before the interpreter builds any node. The
//! recognizer also enforces the nesting limit, which in turn bounds the
//! recursion of every later pass.

use crate::error::ParseError;
use crate::lexer::{Token, TokenType};
use crate::parser::TokenCursor;

pub(crate) struct GrammarChecker<'t> {
    cursor: TokenCursor<'t>,
    max_depth: usize,
    depth: usize,
}

impl<'t> GrammarChecker<'t> {
    pub(crate) fn new(cursor: TokenCursor<'t>, max_depth: usize) -> Self {
        Self {
            cursor,
            max_depth,
            depth: 0,
        }
    }

    /// Document ::= Value EOF
    pub(crate) fn check_document(mut self) -> Result<(), ParseError> {
        self.check_value()?;
        self.cursor.expect(TokenType::Eof)?;
        Ok(())
    }

    /// Value ::= [ Anchor ] ( Map | Seq | Obj | Ref | Link | Scalar ) [ Anchor ]
    ///
    /// Only one anchor is allowed, and never on a reference or link.
    fn check_value(&mut self) -> Result<(), ParseError> {
        let leading_anchor = self.check_optional_anchor()?;

        let is_reference = match self.cursor.current().ttype {
            TokenType::LBrace => {
                self.nested(Self::check_map)?;
                false
            }
            TokenType::LBracket => {
                self.nested(Self::check_seq)?;
                false
            }
            TokenType::Bang => {
                self.nested(Self::check_obj)?;
                false
            }
            TokenType::Asterisk | TokenType::At => {
                if let Some(anchor) = leading_anchor {
                    return Err(self.cursor.err_aliased(anchor));
                }
                self.cursor.advance();
                self.cursor.expect(TokenType::Identifier)?;
                true
            }
            TokenType::Boolean | TokenType::Int | TokenType::Float | TokenType::String => {
                self.cursor.advance();
                false
            }
            _ => return Err(self.cursor.err_invalid_value()),
        };

        if leading_anchor.is_none() && self.cursor.check(TokenType::Ampersand) {
            if is_reference {
                return Err(self.cursor.err_aliased(self.cursor.current()));
            }
            self.check_optional_anchor()?;
        }
        Ok(())
    }

    /// Anchor ::= "&" Identifier
    fn check_optional_anchor(&mut self) -> Result<Option<&'t Token>, ParseError> {
        if !self.cursor.check(TokenType::Ampersand) {
            return Ok(None);
        }
        let ampersand = self.cursor.advance();
        self.cursor.expect(TokenType::Identifier)?;
        Ok(Some(ampersand))
    }

    /// Map ::= "{" [ Pair { "," Pair } ] "}"
    fn check_map(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(TokenType::LBrace)?;
        if !self.cursor.accept(TokenType::RBrace) {
            self.check_pairs()?;
            self.cursor.expect(TokenType::RBrace)?;
        }
        Ok(())
    }

    /// Seq ::= "[" [ Value { "," Value } ] "]"
    fn check_seq(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(TokenType::LBracket)?;
        if !self.cursor.accept(TokenType::RBracket) {
            self.check_values()?;
            self.cursor.expect(TokenType::RBracket)?;
        }
        Ok(())
    }

    /// Obj ::= "!" Identifier "(" [ PairList | ValueList ] ")"
    ///
    /// A leading identifier selects the field form; no value can start with a
    /// bare identifier, so one token of lookahead is enough.
    fn check_obj(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(TokenType::Bang)?;
        self.cursor.expect(TokenType::Identifier)?;
        self.cursor.expect(TokenType::LParen)?;
        if !self.cursor.accept(TokenType::RParen) {
            if self.cursor.check(TokenType::Identifier) {
                self.check_pairs()?;
            } else {
                self.check_values()?;
            }
            self.cursor.expect(TokenType::RParen)?;
        }
        Ok(())
    }

    /// Pair ::= Identifier ":" Value
    fn check_pair(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(TokenType::Identifier)?;
        self.cursor.expect(TokenType::Colon)?;
        self.check_value()
    }

    fn check_pairs(&mut self) -> Result<(), ParseError> {
        loop {
            self.check_pair()?;
            if !self.cursor.accept(TokenType::Comma) {
                return Ok(());
            }
        }
    }

    fn check_values(&mut self) -> Result<(), ParseError> {
        loop {
            self.check_value()?;
            if !self.cursor.accept(TokenType::Comma) {
                return Ok(());
            }
        }
    }

    fn nested(
        &mut self,
        check: fn(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.cursor.err_too_deep(self.max_depth));
        }
        self.depth += 1;
        let result = check(self);
        self.depth -= 1;
        result
    }
}
