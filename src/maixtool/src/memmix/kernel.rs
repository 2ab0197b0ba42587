//! Constant-step 72-bit reversal.
//!
//! Standard power-of-two reversal tricks stop at 64 bits; 72 = 8 x 9 needs
//! its own schedule. The word is reversed inside each byte with the usual
//! masked swaps, then the nine bytes are reversed as three 24-bit lanes of
//! three bytes each.

use super::{Granularity, WORD_MASK};

/// Bit 1 of every 2-bit pair (bits 1, 3, 5, .. 71)
pub const ODD_BITS: u128 = 0xaaaaaaaaaaaaaaaaaa;
/// Bit 0 of every 2-bit pair (bits 0, 2, 4, .. 70)
pub const EVEN_BITS: u128 = 0x555555555555555555;

/// Upper pair of every nibble: bits `i` with `(i / 2) % 2 == 1`
pub const HIGH_PAIRS: u128 = 0xcccccccccccccccccc;
/// Lower pair of every nibble: bits `i` with `(i / 2) % 2 == 0`
pub const LOW_PAIRS: u128 = 0x333333333333333333;

/// Upper nibble of every byte (bits 4..8, 12..16, .. 68..72)
pub const HIGH_NIBBLES: u128 = 0xf0f0f0f0f0f0f0f0f0;
/// Lower nibble of every byte (bits 0..4, 8..12, .. 64..68)
pub const LOW_NIBBLES: u128 = 0x0f0f0f0f0f0f0f0f0f;

/// Top byte of each 24-bit lane (bits 16..24, 40..48, 64..72)
pub const LANE_HIGH_BYTES: u128 = 0xff0000ff0000ff0000;
/// Middle byte of each 24-bit lane (bits 8..16, 32..40, 56..64)
pub const LANE_MID_BYTES: u128 = 0x00ff0000ff0000ff00;
/// Bottom byte of each 24-bit lane (bits 0..8, 24..32, 48..56)
pub const LANE_LOW_BYTES: u128 = 0x0000ff0000ff0000ff;

/// Top 24-bit lane (bits 48..72)
pub const HIGH_LANE: u128 = 0xffffff000000000000;
/// Middle 24-bit lane (bits 24..48)
pub const MID_LANE: u128 = 0x000000ffffff000000;
/// Bottom 24-bit lane (bits 0..24)
pub const LOW_LANE: u128 = 0x000000000000ffffff;

/// Reverse a 72-bit value at the given granularity
///
/// Bits above 71 are ignored. The result always fits in 72 bits.
pub fn reverse72(data: u128, granularity: Granularity) -> u128 {
    let mut data = data & WORD_MASK;

    if granularity == Granularity::Bit {
        data = ((data & ODD_BITS) >> 1) | ((data & EVEN_BITS) << 1);
    }
    data = ((data & HIGH_PAIRS) >> 2) | ((data & LOW_PAIRS) << 2);
    data = ((data & HIGH_NIBBLES) >> 4) | ((data & LOW_NIBBLES) << 4);

    // Bytes within each lane: 2 <-> 0, 1 stays
    data = ((data & LANE_HIGH_BYTES) >> 16)
        | (data & LANE_MID_BYTES)
        | ((data & LANE_LOW_BYTES) << 16);

    // Lanes: 2 <-> 0, 1 stays
    ((data & HIGH_LANE) >> 48) | (data & MID_LANE) | ((data & LOW_LANE) << 48)
}
