use std::fmt;

use crate::errors::ParseError;
use crate::lex::{Lexer, TokenKind};

use super::label::{label_grammar, UenvLabel};
use super::{expect_end, parse_path, strip};

/// A single entry of a `uenv_list` argument: either a direct squashfs file
/// path, or a label, each with an optional explicit mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UenvDescription {
    File {
        filename: String,
        mount: Option<String>,
    },
    Label {
        label: UenvLabel,
        mount: Option<String>,
    },
}

impl UenvDescription {
    pub fn label(&self) -> Option<&UenvLabel> {
        match self {
            UenvDescription::Label { label, .. } => Some(label),
            UenvDescription::File { .. } => None,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            UenvDescription::File { filename, .. } => Some(filename),
            UenvDescription::Label { .. } => None,
        }
    }

    pub fn mount(&self) -> Option<&str> {
        match self {
            UenvDescription::File { mount, .. } | UenvDescription::Label { mount, .. } => {
                mount.as_deref()
            }
        }
    }
}

impl fmt::Display for UenvDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UenvDescription::File { filename, mount } => {
                write!(f, "{}", filename)?;
                if let Some(m) = mount {
                    write!(f, ":{}", m)?;
                }
                Ok(())
            }
            UenvDescription::Label { label, mount } => {
                write!(f, "{}", label)?;
                if let Some(m) = mount {
                    write!(f, ":{}", m)?;
                }
                Ok(())
            }
        }
    }
}

pub fn parse_uenv_description(lx: &mut Lexer<'_>) -> Result<UenvDescription, ParseError> {
    let first = lx.peek(0);
    if matches!(first.kind, TokenKind::Slash | TokenKind::Dot) {
        let filename = parse_path(lx)?;
        let mount = if lx.peek(0).kind == TokenKind::Colon {
            lx.next();
            Some(parse_path(lx)?)
        } else {
            None
        };
        Ok(UenvDescription::File { filename, mount })
    } else {
        let label = label_grammar(lx)?;
        let mount = if lx.peek(0).kind == TokenKind::Colon {
            lx.next();
            Some(parse_path(lx)?)
        } else {
            None
        };
        Ok(UenvDescription::Label { label, mount })
    }
}

pub fn parse_uenv_args(input: &str) -> Result<Vec<UenvDescription>, ParseError> {
    let input = strip(input);
    let mut lx = Lexer::new(&input);
    let mut out = vec![parse_uenv_description(&mut lx)?];
    while lx.peek(0).kind == TokenKind::Comma {
        lx.next();
        out.push(parse_uenv_description(&mut lx)?);
    }
    expect_end(&mut lx)?;
    Ok(out)
}
