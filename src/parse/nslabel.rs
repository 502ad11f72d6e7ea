use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::label::{label_grammar, UenvLabel};
use super::{expect_end, parse_name, strip};

/// A label optionally qualified by a registry namespace: `ns::label`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceLabel {
    pub namespace: Option<String>,
    pub label: UenvLabel,
}

impl fmt::Display for NamespaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}::", ns)?;
        }
        write!(f, "{}", self.label)
    }
}

pub fn parse_uenv_nslabel(input: &str) -> Result<NamespaceLabel, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);

    // Speculatively try `name '::'`; roll back to a plain label if the
    // double-colon doesn't follow.
    let mut probe = lx.clone();
    if probe.peek(0).kind == TokenKind::Symbol {
        if let Ok(ns) = parse_name(&mut probe) {
            if probe.peek(0).kind == TokenKind::Colon && probe.peek(1).kind == TokenKind::Colon {
                probe.next();
                probe.next();
                let label = label_grammar(&mut probe)?;
                expect_end(&mut probe)?;
                return Ok(NamespaceLabel {
                    namespace: Some(ns),
                    label,
                });
            }
        }
    }

    let label = label_grammar(&mut lx)?;
    expect_end(&mut lx)?;
    Ok(NamespaceLabel {
        namespace: None,
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let r = parse_uenv_nslabel("").unwrap();
        assert_eq!(r.namespace, None);
        assert!(r.label.empty());
    }

    #[test]
    fn namespace_only() {
        let r = parse_uenv_nslabel("deploy::").unwrap();
        assert_eq!(r.namespace.as_deref(), Some("deploy"));
        assert!(r.label.empty());
    }

    #[test]
    fn label_only() {
        let r = parse_uenv_nslabel("prgenv-gnu/24.7:v1").unwrap();
        assert_eq!(r.namespace, None);
        assert_eq!(r.label.name.as_deref(), Some("prgenv-gnu"));
        assert_eq!(r.label.version.as_deref(), Some("24.7"));
        assert_eq!(r.label.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn namespace_and_tag_only() {
        let r = parse_uenv_nslabel("deploy:::v1").unwrap();
        assert_eq!(r.namespace.as_deref(), Some("deploy"));
        assert_eq!(r.label.name, None);
        assert_eq!(r.label.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn namespace_and_system_wildcard() {
        let r = parse_uenv_nslabel("wombat::@*").unwrap();
        assert_eq!(r.namespace.as_deref(), Some("wombat"));
        assert_eq!(r.label.system.as_deref(), Some("*"));
    }

    #[test]
    fn defective_inputs_fail() {
        for s in [
            "build::prgenv-gnu/:v1",
            "build::prgenv-gnu/wombat:",
            "build::.wombat",
            "-build::.wombat",
            "_build::.wombat",
        ] {
            assert!(parse_uenv_nslabel(s).is_err(), "expected '{}' to fail", s);
        }
    }
}
