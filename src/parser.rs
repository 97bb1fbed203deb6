// ABOUTME: Reader turning the token stream into expression trees

use crate::error::ReadError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::{Expr, ListBuilder};
use std::rc::Rc;

/// Recursive-descent reader over a [`Lexer`]. Produces one [`Expr`] per form
/// and desugars the four reader abbreviations into syntax nodes.
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new(source: &str, filename: &str) -> Self {
        Parser {
            lexer: Lexer::new(source, filename),
        }
    }

    /// Read forms until end of input.
    pub fn parse_top_level(&mut self) -> Result<Vec<Expr>, ReadError> {
        let mut forms = Vec::new();
        while let Some(form) = self.parse_next()? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Read a single form, or `None` at end of input.
    pub fn parse_next(&mut self) -> Result<Option<Expr>, ReadError> {
        if self.lexer.peek()?.kind == TokenKind::Eof {
            return Ok(None);
        }
        let token = self.lexer.next()?;
        Ok(Some(self.parse_form(token)?))
    }

    fn parse_form(&mut self, token: Token) -> Result<Expr, ReadError> {
        match token.kind {
            TokenKind::LParen => self.parse_list(token),
            TokenKind::RParen => Err(ReadError::unexpected_close(
                self.lexer.filename(),
                token.start,
            )),
            TokenKind::Identifier => Ok(Expr::symbol(&token.text)),
            TokenKind::Integer => match token.text.parse::<i64>() {
                Ok(i) => Ok(Expr::Int(i)),
                Err(_) => Err(ReadError::malformed_number(
                    self.lexer.filename(),
                    token.start,
                    &token.text,
                )),
            },
            TokenKind::Float => match token.text.parse::<f64>() {
                Ok(x) => Ok(Expr::Float(x)),
                Err(_) => Err(ReadError::malformed_number(
                    self.lexer.filename(),
                    token.start,
                    &token.text,
                )),
            },
            TokenKind::Str => Ok(Expr::string(token.text)),
            TokenKind::Quote => self.parse_abbreviation(&token, "'", Expr::Quote),
            TokenKind::Backtick => self.parse_abbreviation(&token, "`", Expr::Backtick),
            TokenKind::Comma => self.parse_abbreviation(&token, ",", Expr::Comma),
            TokenKind::CommaAt => self.parse_abbreviation(&token, ",@", Expr::CommaAt),
            TokenKind::Eof => {
                // parse_next filters Eof before dispatching here
                Err(ReadError::unmatched_open(
                    self.lexer.filename(),
                    token.start,
                ))
            }
        }
    }

    fn parse_list(&mut self, open: Token) -> Result<Expr, ReadError> {
        let mut builder = ListBuilder::new();
        loop {
            let token = self.lexer.next()?;
            match token.kind {
                TokenKind::RParen => return Ok(Expr::List(builder.finish())),
                TokenKind::Eof => {
                    return Err(ReadError::unmatched_open(
                        self.lexer.filename(),
                        open.start,
                    ))
                }
                _ => builder.push(self.parse_form(token)?),
            }
        }
    }

    /// `'x`, `` `x ``, `,x`, `,@x`: consume the following form and wrap it.
    fn parse_abbreviation(
        &mut self,
        token: &Token,
        abbrev: &'static str,
        wrap: fn(Rc<Expr>) -> Expr,
    ) -> Result<Expr, ReadError> {
        let next = self.lexer.peek()?;
        if next.kind == TokenKind::Eof {
            return Err(ReadError::dangling_abbreviation(
                self.lexer.filename(),
                token.start,
                abbrev,
            ));
        }
        let inner_token = self.lexer.next()?;
        let inner = self.parse_form(inner_token)?;
        Ok(wrap(Rc::new(inner)))
    }
}

/// Read every top-level form in `source`.
pub fn read_source(source: &str, filename: &str) -> Result<Vec<Expr>, ReadError> {
    Parser::new(source, filename).parse_top_level()
}
