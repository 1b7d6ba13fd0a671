//! Byte-wise binary operations.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A bitwise operation combining each input byte with the comparator byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `byte ^ comparator`
    Xor,
    /// `byte & comparator`
    And,
    /// `byte | comparator`
    Or,
}

impl BinaryOp {
    /// All supported operations, in the order they are listed to users
    pub const ALL: [BinaryOp; 3] = [BinaryOp::Xor, BinaryOp::And, BinaryOp::Or];

    /// The name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Xor => "XOR",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Names of every supported operation
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::name)
    }

    /// Applies the operation to a single byte
    #[inline]
    pub fn apply(self, byte: u8, comparator: u8) -> u8 {
        match self {
            Self::Xor => byte ^ comparator,
            Self::And => byte & comparator,
            Self::Or => byte | comparator,
        }
    }

    /// Applies the operation to every byte of `buf` in place
    pub fn apply_in_place(self, buf: &mut [u8], comparator: u8) {
        // Dispatch once per chunk, not per byte
        match self {
            Self::Xor => buf.iter_mut().for_each(|b| *b ^= comparator),
            Self::And => buf.iter_mut().for_each(|b| *b &= comparator),
            Self::Or => buf.iter_mut().for_each(|b| *b |= comparator),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinaryOp {
    type Err = Error;

    /// Parses an operation name. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Error::unsupported_operation(s, Self::names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("XOR".parse::<BinaryOp>().unwrap(), BinaryOp::Xor);
        assert_eq!("AND".parse::<BinaryOp>().unwrap(), BinaryOp::And);
        assert_eq!("OR".parse::<BinaryOp>().unwrap(), BinaryOp::Or);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "xor".parse::<BinaryOp>().unwrap_err();
        match err {
            Error::UnsupportedOperation {
                operation,
                supported,
            } => {
                assert_eq!(operation, "xor");
                assert_eq!(supported, vec!["XOR", "AND", "OR"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!("NAND".parse::<BinaryOp>().is_err());
        assert!("".parse::<BinaryOp>().is_err());
    }

    #[test]
    fn test_apply() {
        assert_eq!(BinaryOp::Xor.apply(0b1010_1010, 0b1111_0000), 0b0101_1010);
        assert_eq!(BinaryOp::And.apply(0b1010_1010, 0b1111_0000), 0b1010_0000);
        assert_eq!(BinaryOp::Or.apply(0b1010_1010, 0b1111_0000), 0b1111_1010);
    }

    #[test]
    fn test_apply_in_place_matches_apply() {
        let input: Vec<u8> = (0..=255).collect();
        for op in BinaryOp::ALL {
            let mut buf = input.clone();
            op.apply_in_place(&mut buf, 0x5A);
            for (i, byte) in buf.iter().enumerate() {
                assert_eq!(*byte, op.apply(input[i], 0x5A), "{op} at {i}");
            }
        }
    }

    #[test]
    fn test_xor_mask() {
        let mut buf = [0x00, 0xFF, 0x0F];
        BinaryOp::Xor.apply_in_place(&mut buf, 0xFF);
        assert_eq!(buf, [0xFF, 0x00, 0xF0]);
    }

    #[test]
    fn test_display_round_trips_name() {
        for op in BinaryOp::ALL {
            assert_eq!(op.to_string().parse::<BinaryOp>().unwrap(), op);
        }
    }
}
