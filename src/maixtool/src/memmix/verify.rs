//! Reference reversals used to cross-check the kernel.
//!
//! Both are written without the kernel's masks so a bad constant there
//! cannot hide behind the same bad constant here.

use super::{Granularity, WORD_BITS};

/// Mirror the groups inside one byte
fn mirror_byte(byte: u8, granularity: Granularity) -> u8 {
    match granularity {
        Granularity::Bit => byte.reverse_bits(),
        Granularity::Pair => {
            (byte >> 6) | ((byte >> 2) & 0x0c) | ((byte << 2) & 0x30) | (byte << 6)
        }
    }
}

/// Byte-oriented reversal
///
/// Holds out the top byte, mirrors every byte, reverses the low eight bytes
/// with 8/16/32-bit swaps and puts the held-out byte at the bottom.
pub fn reverse_special(data: u128, granularity: Granularity) -> u128 {
    let top = mirror_byte((data >> 64) as u8, granularity);

    let mut bytes = (data as u64).to_le_bytes();
    for byte in &mut bytes {
        *byte = mirror_byte(*byte, granularity);
    }
    let mut low = u64::from_le_bytes(bytes);

    low = ((low & 0xff00ff00ff00ff00) >> 8) | ((low & 0x00ff00ff00ff00ff) << 8);
    low = ((low & 0xffff0000ffff0000) >> 16) | ((low & 0x0000ffff0000ffff) << 16);
    low = (low >> 32) | (low << 32);

    ((low as u128) << 8) | top as u128
}

/// Group-by-group reversal
///
/// Moves the group at bit `i` to bit `72 - width - i`, one group at a time.
pub fn reverse_normal(data: u128, granularity: Granularity) -> u128 {
    let width = granularity.width();
    let group = (1u128 << width) - 1;

    let mut result = 0;
    for i in (0..WORD_BITS).step_by(width as usize) {
        result |= ((data >> i) & group) << (WORD_BITS - width - i);
    }
    result
}
