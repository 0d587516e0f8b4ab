//! Needle validation and matching.

use std::fmt;

use crate::crypto::{base32, Address, ADDRESS_LEN};

/// Reasons a needle is rejected before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NeedleError {
    #[error("Needle cannot be empty")]
    Empty,

    #[error("Needle cannot be longer than 40 characters (full address), got {0}")]
    TooLong(usize),

    #[error("Invalid character: {0:?}, does not occur in base32")]
    InvalidCharacter(char),
}

/// A validated, uppercased search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle {
    needle: String,
}

impl Needle {
    /// Uppercases `input` and checks every character against the address
    /// alphabet (`A-Z`, `2-7`).
    pub fn parse(input: &str) -> Result<Self, NeedleError> {
        let needle = input.to_ascii_uppercase();

        if needle.is_empty() {
            return Err(NeedleError::Empty);
        }

        if let Some(c) = needle
            .chars()
            .find(|&c| !c.is_ascii() || !base32::is_base32(c as u8))
        {
            return Err(NeedleError::InvalidCharacter(c));
        }

        if needle.len() > ADDRESS_LEN {
            return Err(NeedleError::TooLong(needle.len()));
        }

        Ok(Self { needle })
    }

    /// Returns the needle string.
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Returns the needle length in characters.
    pub fn len(&self) -> usize {
        self.needle.len()
    }

    /// Always false; empty needles are rejected by [`Needle::parse`].
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns the offset of the first occurrence of the needle in `address`.
    #[inline]
    pub fn find(&self, address: &Address) -> Option<usize> {
        let needle = self.needle.as_bytes();
        address
            .as_bytes()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Returns the expected number of candidates per match.
    ///
    /// Each character has 32 possible values and the needle can start at
    /// any of `41 - len` offsets: expected attempts = 32^n / (41 - n).
    pub fn estimated_difficulty(&self) -> u64 {
        let len = self.len() as u32;
        let offsets = (ADDRESS_LEN + 1 - self.len()) as u64;
        32u64.saturating_pow(len) / offsets
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=1_000_000 => "Easy (seconds)".into(),
            1_000_001..=100_000_000 => "Medium (minutes)".into(),
            100_000_001..=10_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_ADDRESS: &str = "NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4";

    fn address() -> Address {
        Address::parse(VECTOR_ADDRESS).unwrap()
    }

    #[test]
    fn test_parse_uppercases() {
        let needle = Needle::parse("nem").unwrap();
        assert_eq!(needle.as_str(), "NEM");
        assert_eq!(needle.len(), 3);
    }

    #[test]
    fn test_invalid_characters() {
        for bad in ["N0M", "NEM1", "A8", "9", "NE-M", "N M", "é", "ß", "ı", "straße"] {
            assert!(
                matches!(Needle::parse(bad), Err(NeedleError::InvalidCharacter(_))),
                "{} should be rejected",
                bad
            );
        }
        assert_eq!(
            Needle::parse("ab1"),
            Err(NeedleError::InvalidCharacter('1'))
        );
        // Non-ASCII letters are never case-folded into the alphabet.
        assert_eq!(Needle::parse("ß"), Err(NeedleError::InvalidCharacter('ß')));
        assert_eq!(Needle::parse("ı"), Err(NeedleError::InvalidCharacter('ı')));
    }

    #[test]
    fn test_empty_and_too_long() {
        assert_eq!(Needle::parse(""), Err(NeedleError::Empty));
        assert_eq!(Needle::parse(&"A".repeat(41)), Err(NeedleError::TooLong(41)));
        assert!(Needle::parse(&"A".repeat(40)).is_ok());
    }

    #[test]
    fn test_find_known_offset() {
        let address = address();
        assert_eq!(Needle::parse("ENTM").unwrap().find(&address), Some(20));
        assert_eq!(Needle::parse("Q56K").unwrap().find(&address), Some(12));
        assert_eq!(Needle::parse("ndd").unwrap().find(&address), Some(0));
        assert_eq!(Needle::parse("JFXJ4R4").unwrap().find(&address), Some(33));
        assert_eq!(Needle::parse(VECTOR_ADDRESS).unwrap().find(&address), Some(0));
    }

    #[test]
    fn test_find_first_occurrence() {
        // 'D' occurs at 1, 2 and 28
        assert_eq!(Needle::parse("D").unwrap().find(&address()), Some(1));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(Needle::parse("NEM").unwrap().find(&address()), None);
        assert_eq!(Needle::parse("ZZZZ").unwrap().find(&address()), None);
    }

    #[test]
    fn test_difficulty() {
        let needle = Needle::parse("NEM").unwrap();
        assert_eq!(needle.estimated_difficulty(), 32768 / 38);
        assert_eq!(
            Needle::parse(&"A".repeat(40)).unwrap().estimated_difficulty(),
            u64::MAX
        );
    }
}
