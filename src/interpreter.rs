use crate::ast::{insert_field, Document, DocumentBuilder, Fields, NodeId, NodeKind};
use crate::error::ParseError;
use crate::lexer::TokenType;
use crate::parser::TokenCursor;
use log::trace;

/// Builds the document tree from a token list that already passed the grammar
/// check, registering anchors as it goes.
///
/// The grammar pass has bounded the nesting depth, so the recursion here is
/// bounded as well.
pub(crate) struct Interpreter<'t> {
    cursor: TokenCursor<'t>,
    builder: DocumentBuilder,
}

impl<'t> Interpreter<'t> {
    pub(crate) fn new(cursor: TokenCursor<'t>) -> Self {
        Self {
            cursor,
            builder: DocumentBuilder::default(),
        }
    }

    pub(crate) fn interpret_document(mut self) -> Result<Document, ParseError> {
        let root = self.interpret_value()?;
        self.cursor.expect(TokenType::Eof)?;
        Ok(self.builder.finish(root))
    }

    fn interpret_value(&mut self) -> Result<NodeId, ParseError> {
        let mut anchor = self.interpret_optional_anchor()?;
        let token = self.cursor.current();
        let line = token.line;

        let id = match token.ttype {
            TokenType::LBrace => self.interpret_map()?,
            TokenType::LBracket => self.interpret_seq()?,
            TokenType::Bang => self.interpret_obj()?,
            TokenType::Asterisk => {
                self.cursor.advance();
                let target = self.cursor.expect(TokenType::Identifier)?;
                self.builder
                    .push(NodeKind::Reference(target.text.clone()), line)
            }
            TokenType::At => {
                self.cursor.advance();
                let target = self.cursor.expect(TokenType::Identifier)?;
                self.builder.push(NodeKind::Link(target.text.clone()), line)
            }
            TokenType::Int => self.scalar(NodeKind::Int(token.text.clone()), line),
            TokenType::Float => self.scalar(NodeKind::Float(token.text.clone()), line),
            TokenType::Boolean => self.scalar(NodeKind::Boolean(token.text.clone()), line),
            TokenType::String => self.scalar(NodeKind::String(token.text.clone()), line),
            _ => return Err(self.cursor.err_invalid_value()),
        };

        if anchor.is_none() {
            anchor = self.interpret_optional_anchor()?;
        }
        if let Some(name) = anchor {
            if !self.builder.anchors_mut().register(name, id) {
                trace!(anchor = name, line = line; "anchor already declared, keeping the first");
            }
        }
        Ok(id)
    }

    fn scalar(&mut self, kind: NodeKind, line: usize) -> NodeId {
        self.cursor.advance();
        self.builder.push(kind, line)
    }

    fn interpret_optional_anchor(&mut self) -> Result<Option<&'t str>, ParseError> {
        if self.cursor.accept(TokenType::Ampersand) {
            let name = self.cursor.expect(TokenType::Identifier)?;
            Ok(Some(name.text.as_str()))
        } else {
            Ok(None)
        }
    }

    fn interpret_map(&mut self) -> Result<NodeId, ParseError> {
        let line = self.cursor.expect(TokenType::LBrace)?.line;
        let mut fields = Fields::new();
        if !self.cursor.accept(TokenType::RBrace) {
            self.interpret_pairs(&mut fields)?;
            self.cursor.expect(TokenType::RBrace)?;
        }
        Ok(self.builder.push(NodeKind::Map(fields), line))
    }

    fn interpret_seq(&mut self) -> Result<NodeId, ParseError> {
        let line = self.cursor.expect(TokenType::LBracket)?.line;
        let mut items = Vec::new();
        if !self.cursor.accept(TokenType::RBracket) {
            self.interpret_values(&mut items)?;
            self.cursor.expect(TokenType::RBracket)?;
        }
        Ok(self.builder.push(NodeKind::Sequence(items), line))
    }

    /// `!Name()` with an empty body becomes an empty `ObjMap`.
    fn interpret_obj(&mut self) -> Result<NodeId, ParseError> {
        let line = self.cursor.expect(TokenType::Bang)?.line;
        let class_name = self.cursor.expect(TokenType::Identifier)?.text.clone();
        self.cursor.expect(TokenType::LParen)?;

        let kind = if self.cursor.accept(TokenType::RParen) {
            NodeKind::ObjMap {
                class_name,
                fields: Fields::new(),
            }
        } else if self.cursor.check(TokenType::Identifier) {
            let mut fields = Fields::new();
            self.interpret_pairs(&mut fields)?;
            self.cursor.expect(TokenType::RParen)?;
            NodeKind::ObjMap { class_name, fields }
        } else {
            let mut items = Vec::new();
            self.interpret_values(&mut items)?;
            self.cursor.expect(TokenType::RParen)?;
            NodeKind::ObjSequence { class_name, items }
        };
        Ok(self.builder.push(kind, line))
    }

    fn interpret_pairs(&mut self, fields: &mut Fields) -> Result<(), ParseError> {
        loop {
            let key = self.cursor.expect(TokenType::Identifier)?.text.clone();
            self.cursor.expect(TokenType::Colon)?;
            let value = self.interpret_value()?;
            insert_field(fields, key, value);
            if !self.cursor.accept(TokenType::Comma) {
                return Ok(());
            }
        }
    }

    fn interpret_values(&mut self, items: &mut Vec<NodeId>) -> Result<(), ParseError> {
        loop {
            items.push(self.interpret_value()?);
            if !self.cursor.accept(TokenType::Comma) {
                return Ok(());
            }
        }
    }
}
