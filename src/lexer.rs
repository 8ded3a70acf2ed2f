use crate::error::LexError;
use miette::NamedSource;
use std::fmt::{self, Display};
use std::iter::Peekable;
use std::str::CharIndices;

/// Represents the different kinds of tokens that the lexer can produce.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,

    // == Literals ==
    /// Keys, class names, and anchor/reference names: `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// A double-quoted string. The token text holds the unescaped contents.
    String,
    /// A number without fractional part or exponent, e.g. `-42`.
    Int,
    /// A number with a fractional part and/or an exponent, e.g. `3.14e2`.
    Float,
    /// `true` or `false`.
    Boolean,

    // == Structural ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Left Parenthesis: `(`
    LParen,
    /// Right Parenthesis: `)`
    RParen,
    /// Bang: `!` (starts a tagged object, e.g. `!Point(x: 1, y: 2)`)
    Bang,

    // == Operators ==
    /// Asterisk: `*` (reference to an anchor)
    Asterisk,
    /// At: `@` (link to an anchor)
    At,
    /// Ampersand: `&` (declares an anchor)
    Ampersand,
    /// Colon: `:`
    Colon,
    /// Comma: `,`
    Comma,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Eof => "end of input",
            TokenType::Identifier => "identifier",
            TokenType::String => "string",
            TokenType::Int => "integer",
            TokenType::Float => "float",
            TokenType::Boolean => "boolean",
            TokenType::LBrace => "`{`",
            TokenType::RBrace => "`}`",
            TokenType::LBracket => "`[`",
            TokenType::RBracket => "`]`",
            TokenType::LParen => "`(`",
            TokenType::RParen => "`)`",
            TokenType::Bang => "`!`",
            TokenType::Asterisk => "`*`",
            TokenType::At => "`@`",
            TokenType::Ampersand => "`&`",
            TokenType::Colon => "`:`",
            TokenType::Comma => "`,`",
        };
        f.write_str(name)
    }
}

/// A token with its type, text, line and byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub text: String,
    pub line: usize,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(
        ttype: TokenType,
        text: String,
        line: usize,
        pos_start: usize,
        pos_end: usize,
    ) -> Token {
        Token {
            ttype,
            text,
            line,
            pos_start,
            pos_end,
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    name: String,
    chars: Peekable<CharIndices<'a>>,
    position: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::new_with_name(input, "input.knot")
    }

    /// `name` only labels diagnostics.
    pub fn new_with_name(input: &'a str, name: impl Into<String>) -> Self {
        Self {
            input,
            name: name.into(),
            chars: input.char_indices().peekable(),
            position: 0,
            line: 1,
        }
    }

    /// Tokenizes the whole input. The last token is always [`TokenType::Eof`].
    ///
    /// # Errors
    /// Returns a [`LexError`] for an unterminated string, a malformed number or
    /// a character that cannot start a token.
    pub fn lex(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.ttype == TokenType::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start_pos = self.position;
        let start_line = self.line;

        let Some(c) = self.advance() else {
            return Ok(Token::new(
                TokenType::Eof,
                String::new(),
                start_line,
                start_pos,
                start_pos,
            ));
        };

        let ttype = match c {
            '{' => TokenType::LBrace,
            '}' => TokenType::RBrace,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '!' => TokenType::Bang,
            '*' => TokenType::Asterisk,
            '@' => TokenType::At,
            '&' => TokenType::Ampersand,
            ':' => TokenType::Colon,
            ',' => TokenType::Comma,
            '"' => return self.read_string(start_pos, start_line),
            c if is_identifier_start(c) => {
                return Ok(self.read_identifier(c, start_pos, start_line))
            }
            c if c.is_ascii_digit() || is_sign(c) || c == '.' => {
                return self.read_number(c, start_pos, start_line)
            }
            other => {
                return Err(LexError::InvalidToken {
                    line: start_line,
                    found: other,
                    src: self.named_source(),
                    span: (start_pos, other.len_utf8()).into(),
                })
            }
        };

        Ok(Token::new(
            ttype,
            c.to_string(),
            start_line,
            start_pos,
            self.position,
        ))
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Skips whitespace and `#` line comments, including the terminating newline.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                self.advance();
            } else if c == '#' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Called after the opening quote. Comments are not recognized in here.
    fn read_string(&mut self, start_pos: usize, start_line: usize) -> Result<Token, LexError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                // `\"`, `\\` and `\#` keep the escaped character; so does
                // anything else, minus the backslash.
                Some('\\') => match self.advance() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.unterminated_string(start_pos, start_line)),
                },
                Some(c) => value.push(c),
                None => return Err(self.unterminated_string(start_pos, start_line)),
            }
        }
        Ok(Token::new(
            TokenType::String,
            value,
            start_line,
            start_pos,
            self.position,
        ))
    }

    fn read_identifier(&mut self, first_char: char, start_pos: usize, start_line: usize) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let ttype = match ident.as_str() {
            "true" | "false" => TokenType::Boolean,
            _ => TokenType::Identifier,
        };
        Token::new(ttype, ident, start_line, start_pos, self.position)
    }

    /// `[sign] digits ['.' digits] [('e'|'E') [sign] digits]`, with at least one
    /// mantissa digit. A dot or an exponent makes the lexeme a float.
    fn read_number(
        &mut self,
        first_char: char,
        start_pos: usize,
        start_line: usize,
    ) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        lexeme.push(first_char);
        let mut has_dot = first_char == '.';
        let mut has_digits = first_char.is_ascii_digit();

        has_digits |= self.take_digits(&mut lexeme);
        if !has_dot && self.peek() == Some('.') {
            has_dot = true;
            lexeme.push('.');
            self.advance();
            has_digits |= self.take_digits(&mut lexeme);
        }
        if !has_digits {
            return Err(self.malformed_number(lexeme, start_pos, start_line));
        }

        let mut has_exponent = false;
        if let Some(marker @ ('e' | 'E')) = self.peek() {
            has_exponent = true;
            lexeme.push(marker);
            self.advance();
            if let Some(sign) = self.peek().filter(|c| is_sign(*c)) {
                lexeme.push(sign);
                self.advance();
            }
            if !self.take_digits(&mut lexeme) {
                return Err(self.malformed_number(lexeme, start_pos, start_line));
            }
        }

        let ttype = if has_dot || has_exponent {
            TokenType::Float
        } else {
            TokenType::Int
        };
        Ok(Token::new(ttype, lexeme, start_line, start_pos, self.position))
    }

    fn take_digits(&mut self, lexeme: &mut String) -> bool {
        let mut any = false;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            lexeme.push(c);
            self.advance();
            any = true;
        }
        any
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.input.to_string())
    }

    fn unterminated_string(&self, start_pos: usize, start_line: usize) -> LexError {
        LexError::UnterminatedString {
            line: start_line,
            src: self.named_source(),
            span: (start_pos, 1).into(),
        }
    }

    fn malformed_number(&self, lexeme: String, start_pos: usize, start_line: usize) -> LexError {
        LexError::MalformedNumber {
            line: start_line,
            src: self.named_source(),
            span: (start_pos, self.position - start_pos).into(),
            lexeme,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}
