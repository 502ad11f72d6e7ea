//! Content digests: the sha256 of a `store.squashfs`, in full (64 hex) and
//! id (16 hex) form.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest as _, Sha256};

use crate::errors::ParseError;

/// A 32-byte sha256 digest. Equality and hashing are always on the full
/// value; the 16-hex "id" form is a display/matching shorthand derived from
/// it, never stored separately.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    pub fn from_content(bytes: &[u8]) -> Sha256Digest {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let out = hasher.finalize();
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&out);
        Sha256Digest(buf)
    }

    /// Full 64-character lowercase hex form.
    pub fn full(&self) -> String {
        hex_encode(&self.0)
    }

    /// First 16 hex characters of the full digest.
    pub fn id(&self) -> String {
        let mut s = self.full();
        s.truncate(16);
        s
    }

    pub fn matches_id_prefix(&self, prefix: &str) -> bool {
        self.full().starts_with(&prefix.to_ascii_lowercase())
    }

    /// True if `s` is a well-formed full digest (64 lowercase hex chars).
    pub fn looks_like_full(s: &str) -> bool {
        s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) && s == s.to_ascii_lowercase()
    }

    /// True if `s` is a well-formed id prefix (16 lowercase hex chars).
    pub fn looks_like_id(s: &str) -> bool {
        s.len() == 16 && s.bytes().all(|b| b.is_ascii_hexdigit()) && s == s.to_ascii_lowercase()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

impl FromStr for Sha256Digest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError {
                offset: 0,
                message: format!("'{}' is not a well-formed sha256 digest", s),
            });
        }
        let mut buf = [0u8; 32];
        for i in 0..32 {
            buf[i] = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).map_err(|_| ParseError {
                offset: 2 * i,
                message: format!("invalid hex byte in digest '{}'", s),
            })?;
        }
        Ok(Sha256Digest(buf))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.full())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_id_are_consistent() {
        let d = Sha256Digest::from_content(b"hello world");
        assert_eq!(d.full().len(), 64);
        assert_eq!(d.id().len(), 16);
        assert!(d.full().starts_with(&d.id()));
    }

    #[test]
    fn round_trips_through_from_str() {
        let d = Sha256Digest::from_content(b"uenv");
        let s = d.full();
        let parsed: Sha256Digest = s.parse().unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn rejects_short_input() {
        assert!("deadbeef".parse::<Sha256Digest>().is_err());
    }

    #[test]
    fn shape_predicates() {
        let d = Sha256Digest::from_content(b"x");
        assert!(Sha256Digest::looks_like_full(&d.full()));
        assert!(Sha256Digest::looks_like_id(&d.id()));
        assert!(!Sha256Digest::looks_like_id(&d.full()));
        assert!(!Sha256Digest::looks_like_full("ABCDEF"));
    }
}
