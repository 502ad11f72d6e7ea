//! Recursive-descent parsers over the label/path/view/mount/date grammar.
//!
//! Each parsed value lives in its own submodule; this module holds the
//! handful of grammar fragments (`name`, `path`, version-shaped runs) shared
//! by more than one of them, plus `strip`.

mod date;
mod label;
mod mount;
mod nslabel;
mod registry_entry;
mod uenv_desc;
mod view;

pub use date::{parse_uenv_date, UenvDate};
pub use label::{parse_uenv_label, UenvLabel};
pub use mount::{parse_mount_entry, parse_mount_list, MountEntry};
pub use nslabel::{parse_uenv_nslabel, NamespaceLabel};
pub use registry_entry::{parse_registry_entry, RegistryEntry};
pub use uenv_desc::{parse_uenv_args, parse_uenv_description, UenvDescription};
pub use view::{parse_view_args, parse_view_description, ViewDescriptor};

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

/// Trim leading and trailing whitespace, same character class the lexer
/// treats as whitespace.
pub fn strip(input: &str) -> String {
    input.trim().to_string()
}

/// `symbol { (dash|dot|integer|symbol) }` — the "bare name" production
/// shared by label fields, namespaces, view names, and registry segments.
pub(crate) fn parse_name(lx: &mut Lexer<'_>) -> Result<String, ParseError> {
    let first = lx.peek(0);
    if first.kind != TokenKind::Symbol {
        return Err(ParseError::new(first.loc, "expected a name"));
    }
    let start = first.loc;
    lx.next();
    let mut end = start + first.spelling.len();
    loop {
        let t = lx.peek(0);
        match t.kind {
            TokenKind::Dash | TokenKind::Dot | TokenKind::Integer | TokenKind::Symbol => {
                lx.next();
                end = t.loc + t.spelling.len();
            }
            _ => break,
        }
    }
    Ok(lx.string()[start..end].to_string())
}

/// `(integer|symbol) { (dot|dash|integer|symbol) }` — the shape shared by
/// `version` and `tag`.
pub(crate) fn parse_version_like(lx: &mut Lexer<'_>) -> Result<String, ParseError> {
    let first = lx.peek(0);
    if !matches!(first.kind, TokenKind::Integer | TokenKind::Symbol) {
        return Err(ParseError::new(first.loc, "expected a version or tag"));
    }
    let start = first.loc;
    lx.next();
    let mut end = start + first.spelling.len();
    loop {
        let t = lx.peek(0);
        match t.kind {
            TokenKind::Dot | TokenKind::Dash | TokenKind::Integer | TokenKind::Symbol => {
                lx.next();
                end = t.loc + t.spelling.len();
            }
            _ => break,
        }
    }
    Ok(lx.string()[start..end].to_string())
}

/// `name | '*'` — the shape shared by `system` and `uarch`.
pub(crate) fn parse_name_or_star(lx: &mut Lexer<'_>) -> Result<String, ParseError> {
    if lx.peek(0).kind == TokenKind::Star {
        lx.next();
        Ok("*".to_string())
    } else {
        parse_name(lx)
    }
}

/// `('/' | '.' | './') { any-non-comma-non-colon }`
pub(crate) fn parse_path(lx: &mut Lexer<'_>) -> Result<String, ParseError> {
    let first = lx.peek(0);
    if !matches!(first.kind, TokenKind::Slash | TokenKind::Dot) {
        return Err(ParseError::new(first.loc, "expected a path"));
    }
    let start = first.loc;
    let mut end = start;
    loop {
        let t = lx.peek(0);
        match t.kind {
            TokenKind::Comma | TokenKind::Colon | TokenKind::End => break,
            _ => {
                lx.next();
                end = t.loc + t.spelling.len();
            }
        }
    }
    Ok(lx.string()[start..end].to_string())
}

/// The parser consumes the full input; anything left over is an error.
pub(crate) fn expect_end(lx: &mut Lexer<'_>) -> Result<(), ParseError> {
    let t = lx.peek(0);
    if t.kind == TokenKind::End {
        Ok(())
    } else {
        Err(ParseError::new(
            t.loc,
            format!("unexpected {} token '{}'", t.kind, t.spelling),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_cases() {
        assert_eq!(strip("wombat"), "wombat");
        assert_eq!(strip("wombat soup"), "wombat soup");
        assert_eq!(strip("wombat-soup"), "wombat-soup");
        assert_eq!(strip("wombat \nsoup"), "wombat \nsoup");
        assert_eq!(strip(""), "");
        assert_eq!(strip(" "), "");
        assert_eq!(strip(" x"), "x");
        assert_eq!(strip("x "), "x");
        assert_eq!(strip(" x "), "x");
        assert_eq!(strip(" \n\x0c  "), "");
        assert_eq!(strip(" wombat"), "wombat");
        assert_eq!(strip("wombat \n"), "wombat");
        assert_eq!(strip("\t\x0c\x0bwombat \n"), "wombat");
    }

    #[test]
    fn name_cases() {
        for s in ["default", "prgenv-gnu", "a", "x.y", "x_y", "_"] {
            let mut lx = Lexer::new(s);
            let r = parse_name(&mut lx).unwrap();
            assert_eq!(r, s);
        }
    }

    #[test]
    fn path_cases() {
        for s in [
            "./etc",
            "/etc",
            "/etc.",
            "/etc/usr/file.txt",
            "/etc-car/hole_s/_.",
            ".",
            "./.ssh/config",
            ".bashrc",
            ".2",
            "./2-w_00",
            "/tmp/uenv-repo/create-6urQBN",
        ] {
            let mut lx = Lexer::new(s);
            let r = parse_path(&mut lx).unwrap();
            assert_eq!(r, s);
        }
    }
}
