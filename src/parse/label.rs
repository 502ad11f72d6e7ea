use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::{expect_end, parse_name, parse_name_or_star, parse_version_like, strip};

/// A query pattern over uenv records: `name/version:tag@system%uarch`, all
/// fields optional. A label with every field empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UenvLabel {
    pub name: Option<String>,
    pub version: Option<String>,
    pub tag: Option<String>,
    pub system: Option<String>,
    pub uarch: Option<String>,
}

impl UenvLabel {
    pub fn empty(&self) -> bool {
        self.name.is_none()
            && self.version.is_none()
            && self.tag.is_none()
            && self.system.is_none()
            && self.uarch.is_none()
    }
}

impl fmt::Display for UenvLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = &self.name {
            write!(f, "{}", n)?;
        }
        if let Some(v) = &self.version {
            write!(f, "/{}", v)?;
        }
        if let Some(t) = &self.tag {
            write!(f, ":{}", t)?;
        }
        if let Some(s) = &self.system {
            write!(f, "@{}", s)?;
        }
        if let Some(u) = &self.uarch {
            write!(f, "%{}", u)?;
        }
        Ok(())
    }
}

/// The raw `label` production, without requiring the lexer be at `end`
/// afterwards — used both by the public `parse_uenv_label` (which does
/// check `end`) and by `uenv_description`, which may have a trailing
/// `:mount` left for it to consume.
pub(crate) fn label_grammar(lx: &mut Lexer<'_>) -> Result<UenvLabel, ParseError> {
    let mut label = UenvLabel::default();

    if lx.peek(0).kind == TokenKind::Symbol {
        label.name = Some(parse_name(lx)?);
    }

    if lx.peek(0).kind == TokenKind::Slash {
        lx.next();
        label.version = Some(parse_version_like(lx)?);
    }

    if lx.peek(0).kind == TokenKind::Colon {
        // A colon that precedes a path marker belongs to the enclosing
        // uenv_description's mount suffix, not to this label's tag.
        let after = lx.peek(1);
        if !matches!(after.kind, TokenKind::Slash | TokenKind::Dot) {
            lx.next();
            label.tag = Some(parse_version_like(lx)?);
        }
    }

    // `@system` and `%uarch` may appear in either order.
    loop {
        match lx.peek(0).kind {
            TokenKind::At if label.system.is_none() => {
                lx.next();
                label.system = Some(parse_name_or_star(lx)?);
            }
            TokenKind::Percent if label.uarch.is_none() => {
                lx.next();
                label.uarch = Some(parse_name_or_star(lx)?);
            }
            _ => break,
        }
    }

    Ok(label)
}

pub fn parse_uenv_label(input: &str) -> Result<UenvLabel, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);
    let label = label_grammar(&mut lx)?;
    expect_end(&mut lx)?;
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name() {
        let r = parse_uenv_label("prgenv-gnu").unwrap();
        assert_eq!(r.name.as_deref(), Some("prgenv-gnu"));
        assert_eq!(r.version, None);
        assert_eq!(r.tag, None);
        assert_eq!(r.system, None);
        assert_eq!(r.uarch, None);
    }

    #[test]
    fn name_and_version() {
        let r = parse_uenv_label("prgenv-gnu/24.7").unwrap();
        assert_eq!(r.name.as_deref(), Some("prgenv-gnu"));
        assert_eq!(r.version.as_deref(), Some("24.7"));
        assert_eq!(r.tag, None);
    }

    #[test]
    fn full_label() {
        let r = parse_uenv_label("prgenv-gnu/24.7:v1@santis%a100").unwrap();
        assert_eq!(r.name.as_deref(), Some("prgenv-gnu"));
        assert_eq!(r.version.as_deref(), Some("24.7"));
        assert_eq!(r.tag.as_deref(), Some("v1"));
        assert_eq!(r.system.as_deref(), Some("santis"));
        assert_eq!(r.uarch.as_deref(), Some("a100"));
    }

    #[test]
    fn uarch_before_system() {
        let r = parse_uenv_label("prgenv-gnu/24.7:v1%a100@santis").unwrap();
        assert_eq!(r.uarch.as_deref(), Some("a100"));
        assert_eq!(r.system.as_deref(), Some("santis"));
    }

    #[test]
    fn name_and_tag_only() {
        let r = parse_uenv_label("prgenv-gnu:v1").unwrap();
        assert_eq!(r.name.as_deref(), Some("prgenv-gnu"));
        assert_eq!(r.version, None);
        assert_eq!(r.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn defective_labels_fail() {
        for s in [
            "prgenv-gnu/:v1",
            "prgenv-gnu/wombat:",
            "prgenv-gnu/24:v1@",
            "prgenv-gnu/24:@",
            "prgenv-gnu/24:v1@gh200%",
            ".wombat",
        ] {
            assert!(parse_uenv_label(s).is_err(), "expected '{}' to fail", s);
        }
    }

    #[test]
    fn display_round_trips() {
        for s in [
            "prgenv-gnu",
            "prgenv-gnu/24.7",
            "prgenv-gnu/24.7:v1",
            "prgenv-gnu/24.7:v1@santis%a100",
        ] {
            let r = parse_uenv_label(s).unwrap();
            assert_eq!(r.to_string(), s);
        }
    }
}
