//! ECC ROM to FPGA memory-init conversion ("memmix").
//!
//! Each data line of a ROM dump holds one 72-bit ECC-protected memory word
//! as hexadecimal. The FPGA init format wants the same words with their bit
//! order reversed, re-flowed into 16-character lines. Lines starting with
//! `@` are address markers and pass through untouched.
//!
//! The fast reversal in [`kernel`] is checked against two independently
//! written references in [`verify`] for every word unless the codec runs in
//! [`Mode::Fast`]. A disagreement aborts the conversion: a wrongly ordered
//! ECC word silently corrupts the programmed memory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod kernel;
pub mod stream;
pub mod verify;

pub use stream::{convert, Rewrap, StreamStats, HEADER_MARKER, LINE_WIDTH};

/// Width of one memory word in bits
pub const WORD_BITS: u32 = 72;

/// Width of one memory word in hex digits
pub const WORD_DIGITS: usize = 18;

/// Bits 0..72 set
pub const WORD_MASK: u128 = (1 << WORD_BITS) - 1;

/// Errors that can occur while converting a ROM dump
#[derive(Debug, Error)]
pub enum MemmixError {
    #[error("Empty data line")]
    Empty,

    #[error("Data line is not valid UTF-8")]
    NotUtf8,

    #[error("Invalid hex digit {0:?}")]
    InvalidDigit(char),

    #[error("Data line has {len} hex digits, expected 18")]
    Width { len: usize },

    #[error("Value {0} does not fit in 72 bits")]
    Overflow(String),

    #[error(
        "Data verify error: input {input:018x}, kernel {fast:018x}, \
         special {special:018x}, normal {normal:018x}"
    )]
    Verify {
        input: u128,
        fast: u128,
        special: u128,
        normal: u128,
    },

    #[error("line {line}: {error}")]
    Line {
        line: usize,
        error: Box<MemmixError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One 72-bit memory word
///
/// The value is held in a `u128` and is guaranteed to be below `2^72`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(u128);

impl Word {
    pub const ZERO: Word = Word(0);
    pub const MAX: Word = Word(WORD_MASK);

    /// Wrap a raw value, rejecting anything wider than 72 bits
    pub fn new(value: u128) -> Result<Self, MemmixError> {
        if value > WORD_MASK {
            return Err(MemmixError::Overflow(format!("{value:#x}")));
        }
        Ok(Word(value))
    }

    /// A word with only bit `index` set, or `None` past bit 71
    pub fn from_bit(index: u32) -> Option<Self> {
        (index < WORD_BITS).then(|| Word(1 << index))
    }

    pub const fn value(self) -> u128 {
        self.0
    }
}

impl TryFrom<u128> for Word {
    type Error = MemmixError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        Word::new(value)
    }
}

impl From<Word> for u128 {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl FromStr for Word {
    type Err = MemmixError;

    /// Parse a bare hex string (no `0x`, no sign) of at least 18 digits
    ///
    /// Shorter strings are rejected. Leading zeros beyond 18 digits are
    /// accepted; any value that needs more than 72 bits is rejected instead
    /// of truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty() {
            return Err(MemmixError::Empty);
        }
        if let Some(ch) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(MemmixError::InvalidDigit(ch));
        }
        if digits.len() < WORD_DIGITS {
            return Err(MemmixError::Width { len: digits.len() });
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > WORD_DIGITS {
            return Err(MemmixError::Overflow(digits.to_string()));
        }
        if significant.is_empty() {
            return Ok(Word::ZERO);
        }

        let value = u128::from_str_radix(significant, 16)
            .map_err(|_| MemmixError::Overflow(digits.to_string()))?;
        Word::new(value)
    }
}

impl fmt::Display for Word {
    /// 18 lowercase hex digits, zero padded
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.0, width = WORD_DIGITS)
    }
}

/// The unit whose internal order the reversal keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Full reversal: bit `i` moves to bit `71 - i`
    #[default]
    Bit,
    /// 2-bit groups reversed as units: the group at `i` moves to `70 - i`
    Pair,
}

impl Granularity {
    /// Group width in bits
    pub const fn width(self) -> u32 {
        match self {
            Granularity::Bit => 1,
            Granularity::Pair => 2,
        }
    }
}

/// Whether every word is cross-checked against the reference reversals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Verified,
    Fast,
}

/// Word reversal with a fixed granularity and verification policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    pub granularity: Granularity,
    pub mode: Mode,
    /// Kernel result corruption for one input: `(input, xor mask)`
    #[cfg(test)]
    fault: Option<(u128, u128)>,
}

impl Codec {
    pub const fn new(granularity: Granularity, mode: Mode) -> Self {
        Self {
            granularity,
            mode,
            #[cfg(test)]
            fault: None,
        }
    }

    /// Flip `mask` in the kernel result whenever the input is `input`
    #[cfg(test)]
    pub(crate) fn with_fault(mut self, input: u128, mask: u128) -> Self {
        self.fault = Some((input, mask));
        self
    }

    #[cfg(not(test))]
    fn kernel(&self, input: u128) -> u128 {
        kernel::reverse72(input, self.granularity)
    }

    #[cfg(test)]
    fn kernel(&self, input: u128) -> u128 {
        let fast = kernel::reverse72(input, self.granularity);
        match self.fault {
            Some((target, mask)) if target == input => (fast ^ mask) & WORD_MASK,
            _ => fast,
        }
    }

    /// Reverse one word, verifying the result unless running in [`Mode::Fast`]
    pub fn reverse(&self, word: Word) -> Result<Word, MemmixError> {
        let input = word.value();
        let fast = self.kernel(input);
        if self.mode == Mode::Verified {
            cross_check(input, fast, self.granularity)?;
        }
        debug_assert!(fast <= WORD_MASK);
        Ok(Word(fast))
    }
}

/// Compare a kernel result against both references
fn cross_check(input: u128, fast: u128, granularity: Granularity) -> Result<(), MemmixError> {
    let special = verify::reverse_special(input, granularity);
    let normal = verify::reverse_normal(input, granularity);
    if fast != special || fast != normal {
        return Err(MemmixError::Verify {
            input,
            fast,
            special,
            normal,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_width() {
        let word: Word = "800000000000000001".parse().unwrap();
        assert_eq!(word.value(), (1 << 71) | 1);
    }

    #[test]
    fn test_parse_extra_leading_zeros() {
        let word: Word = "0000000000000000001".parse().unwrap();
        assert_eq!(word, Word::new(1).unwrap());
    }

    #[test]
    fn test_parse_uppercase() {
        let word: Word = "ABCDEF0123456789AB".parse().unwrap();
        assert_eq!(word.value(), 0xabcdef0123456789ab);
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        assert!(matches!(
            "Ab".parse::<Word>(),
            Err(MemmixError::Width { len: 2 })
        ));
        assert!(matches!(
            "0".parse::<Word>(),
            Err(MemmixError::Width { len: 1 })
        ));
        // One digit lost from an 18-digit word
        assert!(matches!(
            "00000000000000001".parse::<Word>(),
            Err(MemmixError::Width { len: 17 })
        ));
        assert_eq!(
            "1".parse::<Word>().unwrap_err().to_string(),
            "Data line has 1 hex digits, expected 18"
        );
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let result = "1000000000000000000".parse::<Word>();
        assert!(matches!(result, Err(MemmixError::Overflow(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("".parse::<Word>(), Err(MemmixError::Empty)));
        assert!(matches!("  \t".parse::<Word>(), Err(MemmixError::Empty)));
        assert!(matches!(
            "0x12".parse::<Word>(),
            Err(MemmixError::InvalidDigit('x'))
        ));
        assert!(matches!(
            "12g4".parse::<Word>(),
            Err(MemmixError::InvalidDigit('g'))
        ));
        assert!(matches!(
            "-1".parse::<Word>(),
            Err(MemmixError::InvalidDigit('-'))
        ));
    }

    #[test]
    fn test_new_rejects_wide_values() {
        assert!(Word::new(WORD_MASK).is_ok());
        assert!(Word::new(WORD_MASK + 1).is_err());
        assert!(Word::try_from(u128::MAX).is_err());
    }

    #[test]
    fn test_display_pads_to_18_digits() {
        assert_eq!(Word::ZERO.to_string(), "000000000000000000");
        assert_eq!(Word::new(0xabc).unwrap().to_string(), "000000000000000abc");
        assert_eq!(Word::MAX.to_string(), "ffffffffffffffffff");
    }

    #[test]
    fn test_from_bit() {
        assert_eq!(Word::from_bit(0), Some(Word(1)));
        assert_eq!(Word::from_bit(71).map(Word::value), Some(1 << 71));
        assert_eq!(Word::from_bit(72), None);
    }

    #[test]
    fn test_codec_bit_reversal() {
        let codec = Codec::default();
        let word = Word::new(1).unwrap();
        assert_eq!(codec.reverse(word).unwrap().to_string(), "800000000000000000");
    }

    #[test]
    fn test_codec_pair_reversal() {
        let codec = Codec::new(Granularity::Pair, Mode::Verified);
        let word = Word::new(1).unwrap();
        assert_eq!(codec.reverse(word).unwrap().to_string(), "400000000000000000");
    }

    #[test]
    fn test_fast_mode_matches_verified() {
        let word = Word::new(0x0123_4567_89ab_cdef_55).unwrap();
        for granularity in [Granularity::Bit, Granularity::Pair] {
            let verified = Codec::new(granularity, Mode::Verified).reverse(word).unwrap();
            let fast = Codec::new(granularity, Mode::Fast).reverse(word).unwrap();
            assert_eq!(verified, fast);
        }
    }

    #[test]
    fn test_cross_check_reports_mismatch() {
        let input = 0x12_3456_789a_bcde_f012;
        let good = kernel::reverse72(input, Granularity::Bit);
        assert!(cross_check(input, good, Granularity::Bit).is_ok());

        let err = cross_check(input, good ^ 1, Granularity::Bit).unwrap_err();
        match err {
            MemmixError::Verify {
                fast,
                special,
                normal,
                ..
            } => {
                assert_eq!(fast, good ^ 1);
                assert_eq!(special, good);
                assert_eq!(normal, good);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_error_message() {
        let err = MemmixError::Verify {
            input: 1,
            fast: 2,
            special: 3,
            normal: 3,
        };
        assert!(err.to_string().starts_with("Data verify error"));
    }
}
