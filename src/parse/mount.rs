use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::{expect_end, parse_path, strip};

/// `path ':' path` — a squashfs file paired with the directory it mounts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub sqfs_path: String,
    pub mount_path: String,
}

impl fmt::Display for MountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sqfs_path, self.mount_path)
    }
}

pub fn parse_mount_entry(lx: &mut Lexer<'_>) -> Result<MountEntry, ParseError> {
    let sqfs_path = parse_path(lx)?;
    let colon = lx.peek(0);
    if colon.kind != TokenKind::Colon {
        return Err(ParseError::new(colon.loc, "expected ':' in mount entry"));
    }
    lx.next();
    let mount_path = parse_path(lx)?;
    Ok(MountEntry {
        sqfs_path,
        mount_path,
    })
}

pub fn parse_mount_list(input: &str) -> Result<Vec<MountEntry>, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);
    let mut out = vec![parse_mount_entry(&mut lx)?];
    while lx.peek(0).kind == TokenKind::Comma {
        lx.next();
        out.push(parse_mount_entry(&mut lx)?);
    }
    expect_end(&mut lx)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry() {
        let r = parse_mount_list("/images/store.squashfs:/user-environment").unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].sqfs_path, "/images/store.squashfs");
        assert_eq!(r[0].mount_path, "/user-environment");
    }

    #[test]
    fn two_entries() {
        let r = parse_mount_list(
            "/images/store.squashfs:/user-environment,/images/wombat.squashfs:/user-tools",
        )
        .unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[1].sqfs_path, "/images/wombat.squashfs");
        assert_eq!(r[1].mount_path, "/user-tools");
    }

    #[test]
    fn empty_input_fails() {
        assert!(parse_mount_list("").is_err());
    }
}
