use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::{expect_end, parse_name, strip};

/// `(name ':')? name` — a view name, optionally qualified by the uenv it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub uenv: Option<String>,
    pub name: String,
}

impl fmt::Display for ViewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(u) = &self.uenv {
            write!(f, "{}:", u)?;
        }
        write!(f, "{}", self.name)
    }
}

pub fn parse_view_description(lx: &mut Lexer<'_>) -> Result<ViewDescriptor, ParseError> {
    let first = parse_name(lx)?;
    if lx.peek(0).kind == TokenKind::Colon {
        lx.next();
        let name = parse_name(lx)?;
        Ok(ViewDescriptor {
            uenv: Some(first),
            name,
        })
    } else {
        Ok(ViewDescriptor {
            uenv: None,
            name: first,
        })
    }
}

pub fn parse_view_args(input: &str) -> Result<Vec<ViewDescriptor>, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);
    let mut out = vec![parse_view_description(&mut lx)?];
    while lx.peek(0).kind == TokenKind::Comma {
        lx.next();
        out.push(parse_view_description(&mut lx)?);
    }
    expect_end(&mut lx)?;
    Ok(out)
}
