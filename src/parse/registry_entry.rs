use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::{expect_end, parse_name, parse_version_like, strip};

/// `ns '/' system '/' uarch '/' name '/' version '/' tag` — a fully
/// qualified registry coordinate, minus the registry host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub nspace: String,
    pub system: String,
    pub uarch: String,
    pub name: String,
    pub version: String,
    pub tag: String,
}

impl fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.nspace, self.system, self.uarch, self.name, self.version, self.tag
        )
    }
}

fn expect_slash(lx: &mut Lexer<'_>) -> Result<(), ParseError> {
    let t = lx.peek(0);
    if t.kind != TokenKind::Slash {
        return Err(ParseError::new(t.loc, "expected '/'"));
    }
    lx.next();
    Ok(())
}

pub fn parse_registry_entry(input: &str) -> Result<RegistryEntry, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);

    let nspace = parse_name(&mut lx)?;
    expect_slash(&mut lx)?;
    let system = parse_name(&mut lx)?;
    expect_slash(&mut lx)?;
    let uarch = parse_name(&mut lx)?;
    expect_slash(&mut lx)?;
    let name = parse_name(&mut lx)?;
    expect_slash(&mut lx)?;
    let version = parse_version_like(&mut lx)?;
    expect_slash(&mut lx)?;
    let tag = parse_version_like(&mut lx)?;
    expect_end(&mut lx)?;

    Ok(RegistryEntry {
        nspace,
        system,
        uarch,
        name,
        version,
        tag,
    })
}
