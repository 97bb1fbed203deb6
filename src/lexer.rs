// ABOUTME: Token stream over source text with one-token lookahead

use crate::error::ReadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Identifier,
    Integer,
    Float,
    Str,
    Quote,
    Backtick,
    Comma,
    CommaAt,
    Eof,
}

/// Line and column of a token, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// The token's text. String tokens hold the unescaped content without
    /// the surrounding quotes.
    pub text: String,
    pub start: Position,
    pub end: Position,
}

/// Streams tokens from a source string. `peek` inspects the next token
/// without consuming it; `next` consumes it.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    filename: String,
    peeked: Option<Token>,
}

impl Lexer {
    pub fn new(source: &str, filename: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            filename: filename.to_string(),
            peeked: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn peek(&mut self) -> Result<Token, ReadError> {
        if let Some(token) = &self.peeked {
            return Ok(token.clone());
        }
        let token = self.scan()?;
        self.peeked = Some(token.clone());
        Ok(token)
    }

    pub fn next(&mut self) -> Result<Token, ReadError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Advance one character, keeping the line/column counters honest.
    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Whitespace is space, tab, newline; a `;` comment runs to end of line.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            match c {
                ' ' | '\t' | '\n' | '\r' => {
                    self.bump();
                }
                ';' => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn single(&mut self, kind: TokenKind, text: &str) -> Token {
        let start = self.here();
        self.bump();
        Token {
            kind,
            text: text.to_string(),
            start,
            end: start,
        }
    }

    fn scan(&mut self) -> Result<Token, ReadError> {
        self.skip_whitespace();

        let start = self.here();
        let c = match self.current() {
            Some(c) => c,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    start,
                    end: start,
                })
            }
        };

        match c {
            '(' => Ok(self.single(TokenKind::LParen, "(")),
            ')' => Ok(self.single(TokenKind::RParen, ")")),
            '\'' => Ok(self.single(TokenKind::Quote, "'")),
            '`' => Ok(self.single(TokenKind::Backtick, "`")),
            ',' => {
                self.bump();
                if self.current() == Some('@') {
                    self.bump();
                    Ok(Token {
                        kind: TokenKind::CommaAt,
                        text: ",@".to_string(),
                        start,
                        end: self.here(),
                    })
                } else {
                    Ok(Token {
                        kind: TokenKind::Comma,
                        text: ",".to_string(),
                        start,
                        end: start,
                    })
                }
            }
            '"' => self.read_string(start),
            c if c.is_ascii_digit() => Ok(self.read_number(start)),
            _ => Ok(self.read_identifier(start)),
        }
    }

    /// A numeric token starts with a digit; a `.` anywhere in it makes it a
    /// float. Negative literals do not exist at this level.
    fn read_number(&mut self, start: Position) -> Token {
        let mut text = String::new();
        let mut kind = TokenKind::Integer;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c == '.' {
                kind = TokenKind::Float;
                text.push(c);
            } else {
                break;
            }
            self.bump();
        }
        Token {
            kind,
            text,
            start,
            end: self.here(),
        }
    }

    /// Everything up to whitespace or a structural character.
    fn read_identifier(&mut self, start: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.current() {
            match c {
                ' ' | '\t' | '\n' | '\r' | '(' | ')' | '\'' | '`' | ',' | '"' | ';' => break,
                _ => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        Token {
            kind: TokenKind::Identifier,
            text,
            start,
            end: self.here(),
        }
    }

    fn read_string(&mut self, start: Position) -> Result<Token, ReadError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(ReadError::unterminated_string(&self.filename, start)),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    None => return Err(ReadError::unterminated_string(&self.filename, start)),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    // Unknown escapes pass through verbatim
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(c) => text.push(c),
            }
        }
        Ok(Token {
            kind: TokenKind::Str,
            text,
            start,
            end: self.here(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source, "test");
        let mut out = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn test_parens_and_atoms() {
        assert_eq!(
            kinds("(+ 1 2.5 foo)"),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Float,
                TokenKind::Identifier,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_reader_abbreviations() {
        assert_eq!(
            kinds("'x `y ,z ,@w"),
            vec![
                TokenKind::Quote,
                TokenKind::Identifier,
                TokenKind::Backtick,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::CommaAt,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("(a)", "test");
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.peek().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::LParen);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Identifier);
    }

    #[test]
    fn test_identifier_stops_at_structural_chars() {
        let mut lexer = Lexer::new("ab'cd", "test");
        let first = lexer.next().unwrap();
        assert_eq!(first.kind, TokenKind::Identifier);
        assert_eq!(first.text, "ab");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Quote);
    }

    #[test]
    fn test_operator_identifiers() {
        let mut lexer = Lexer::new("<= >= type= empty?", "test");
        let mut names = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            if token.kind == TokenKind::Eof {
                break;
            }
            names.push(token.text);
        }
        assert_eq!(names, vec!["<=", ">=", "type=", "empty?"]);
    }

    #[test]
    fn test_positions_track_lines() {
        let mut lexer = Lexer::new("a\n  b", "test");
        let a = lexer.next().unwrap();
        assert_eq!(a.start, Position { line: 1, column: 1 });
        let b = lexer.next().unwrap();
        assert_eq!(b.start, Position { line: 2, column: 3 });
    }

    #[test]
    fn test_string_with_escapes() {
        let mut lexer = Lexer::new(r#""a\nb\t\"c\\""#, "test");
        let token = lexer.next().unwrap();
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.text, "a\nb\t\"c\\");
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let mut lexer = Lexer::new("  \"oops", "demo.lisp");
        let err = lexer.next().unwrap_err();
        assert_eq!(format!("{}", err), "demo.lisp:1:3: unterminated string literal");
    }

    #[test]
    fn test_comments_are_whitespace() {
        assert_eq!(
            kinds("; heading\n(1) ; trailing\n2"),
            vec![
                TokenKind::LParen,
                TokenKind::Integer,
                TokenKind::RParen,
                TokenKind::Integer,
            ]
        );
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("", "test");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eof);
    }
}
