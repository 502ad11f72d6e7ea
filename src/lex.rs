//! Tokenizer for the uenv label/path/view/mount/date grammar.
//!
//! Hand-rolled, not regex-based: the parser needs one-token lookahead and
//! per-token source offsets, which a whole-string matcher can't give us.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    At,
    Slash,
    Integer,
    Comma,
    Colon,
    Symbol,
    Dash,
    Dot,
    Whitespace,
    Bang,
    Star,
    Percent,
    End,
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::At => "at",
            TokenKind::Slash => "slash",
            TokenKind::Integer => "integer",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::Symbol => "symbol",
            TokenKind::Dash => "dash",
            TokenKind::Dot => "dot",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Bang => "bang",
            TokenKind::Star => "star",
            TokenKind::Percent => "percent",
            TokenKind::End => "end",
            TokenKind::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub loc: usize,
    pub kind: TokenKind,
    pub spelling: &'a str,
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_symbol_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// A lexer over a single input string, with one-token lookahead.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    lookahead: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            lookahead: Vec::new(),
        }
    }

    pub fn string(&self) -> &'a str {
        self.input
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token<'a> {
        if !self.lookahead.is_empty() {
            return self.lookahead.remove(0);
        }
        self.scan()
    }

    /// Look at the nth token ahead (0 = next token to be returned by
    /// `next`) without consuming it.
    pub fn peek(&mut self, n: usize) -> Token<'a> {
        while self.lookahead.len() <= n {
            let tok = self.scan();
            let at_end = tok.kind == TokenKind::End;
            self.lookahead.push(tok);
            if at_end {
                break;
            }
        }
        self.lookahead[n.min(self.lookahead.len() - 1)].clone()
    }

    pub fn current_kind(&mut self) -> TokenKind {
        self.peek(0).kind
    }

    fn scan(&mut self) -> Token<'a> {
        if self.pos >= self.input.len() {
            return Token {
                loc: self.input.len(),
                kind: TokenKind::End,
                spelling: "",
            };
        }

        let start = self.pos;
        let rest = &self.input[start..];
        let mut chars = rest.char_indices();
        let (_, c0) = chars.next().expect("pos < len");

        let (kind, len) = match c0 {
            '@' => (TokenKind::At, 1),
            '/' => (TokenKind::Slash, 1),
            ',' => (TokenKind::Comma, 1),
            ':' => (TokenKind::Colon, 1),
            '-' => (TokenKind::Dash, 1),
            '.' => (TokenKind::Dot, 1),
            '!' => (TokenKind::Bang, 1),
            '*' => (TokenKind::Star, 1),
            '%' => (TokenKind::Percent, 1),
            c if c.is_ascii_digit() => {
                let mut end = c0.len_utf8();
                for (i, c) in chars {
                    if c.is_ascii_digit() {
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                (TokenKind::Integer, end)
            }
            c if is_symbol_start(c) => {
                let mut end = c0.len_utf8();
                for (i, c) in chars {
                    if is_symbol_continue(c) {
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                (TokenKind::Symbol, end)
            }
            c if is_whitespace(c) => {
                let mut end = c0.len_utf8();
                for (i, c) in chars {
                    if is_whitespace(c) {
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                (TokenKind::Whitespace, end)
            }
            _ => (TokenKind::Error, c0.len_utf8()),
        };

        self.pos = start + len;
        Token {
            loc: start,
            kind,
            spelling: &rest[..len],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lx = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let t = lx.next();
            let done = t.kind == TokenKind::End;
            out.push(t.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn tokenizes_a_label() {
        use TokenKind::*;
        assert_eq!(
            kinds("prgenv-gnu/24.7:v1@gh200%zen2"),
            vec![
                Symbol, Dash, Symbol, Slash, Integer, Dot, Integer, Colon, Symbol, At, Symbol,
                Percent, Symbol, End
            ]
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lx = Lexer::new("a:b");
        assert_eq!(lx.peek(0).kind, TokenKind::Symbol);
        assert_eq!(lx.peek(1).kind, TokenKind::Colon);
        assert_eq!(lx.next().kind, TokenKind::Symbol);
        assert_eq!(lx.next().kind, TokenKind::Colon);
    }

    #[test]
    fn keeps_yielding_end() {
        let mut lx = Lexer::new("");
        assert_eq!(lx.next().kind, TokenKind::End);
        assert_eq!(lx.next().kind, TokenKind::End);
    }

    #[test]
    fn unknown_byte_is_error() {
        assert_eq!(kinds("a#b"), vec![
            TokenKind::Symbol,
            TokenKind::Error,
            TokenKind::Symbol,
            TokenKind::End
        ]);
    }

    #[test]
    fn whitespace_runs_join() {
        assert_eq!(kinds(" \t\n a"), vec![TokenKind::Whitespace, TokenKind::Symbol, TokenKind::End]);
    }
}
