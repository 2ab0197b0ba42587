//! Boot record stamping and verification.
//!
//! A boot record is what the bootloader reads out of a flash slot:
//!
//! ```text
//! +------+------------+---------------+--------------------+
//! | flag | length u32 | body (length) | SHA-256 (32 bytes) |
//! +------+------------+---------------+--------------------+
//! ```
//!
//! The length is little-endian and the digest covers flag, length and body.

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Size of the cipher flag
pub const FLAG_LEN: usize = 1;

/// Size of the little-endian body length
pub const LENGTH_LEN: usize = 4;

/// Flag plus length
pub const HEADER_LEN: usize = FLAG_LEN + LENGTH_LEN;

/// Size of the trailing SHA-256 digest
pub const DIGEST_LEN: usize = 32;

/// Body alignment in bytes
pub const BODY_ALIGN: usize = 64;

/// Bias added to the body length before rounding up to [`BODY_ALIGN`]
pub const PAD_BIAS: usize = 37;

/// Errors that can occur while building or reading boot records
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Padded body of {0} bytes does not fit a 32-bit length field")]
    TooLarge(usize),

    #[error("Record truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("Code length {length:#010x} is larger than slot payload {capacity:#010x}")]
    Oversize { length: u32, capacity: usize },

    #[error("SHA-256 mismatch: record has {expected}, computed {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// Cipher flag stored in the first byte of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    Plain,
    Aes,
}

impl CipherMode {
    /// The bootloader only looks at bit 0
    pub const fn from_flag(flag: u8) -> Self {
        if flag & 1 == 1 {
            CipherMode::Aes
        } else {
            CipherMode::Plain
        }
    }

    pub const fn flag(self) -> u8 {
        match self {
            CipherMode::Plain => 0x00,
            CipherMode::Aes => 0x01,
        }
    }
}

/// Zero bytes appended to a body of `len` bytes
pub fn padding_for(len: usize) -> usize {
    match (len + PAD_BIAS) % BODY_ALIGN {
        0 => 0,
        rem => BODY_ALIGN - rem,
    }
}

/// SHA-256 over flag, little-endian length and body
pub fn record_digest(flag: u8, length: u32, body: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update([flag]);
    hasher.update(length.to_le_bytes());
    hasher.update(body);
    hasher.finalize().into()
}

/// Stamp a raw firmware binary into an unencrypted boot record
///
/// The body is zero padded so that `(length + PAD_BIAS)` is a multiple of
/// [`BODY_ALIGN`]; the digest is computed over the padded record.
pub fn stamp(firmware: &[u8]) -> Result<Vec<u8>, ImageError> {
    let padded_len = firmware
        .len()
        .checked_add(padding_for(firmware.len()))
        .ok_or(ImageError::TooLarge(usize::MAX))?;
    let length = u32::try_from(padded_len).map_err(|_| ImageError::TooLarge(padded_len))?;

    let mut record = Vec::with_capacity(HEADER_LEN + padded_len + DIGEST_LEN);
    record.push(CipherMode::Plain.flag());
    record.extend_from_slice(&length.to_le_bytes());
    record.extend_from_slice(firmware);
    record.resize(HEADER_LEN + padded_len, 0);

    let digest = Sha256::digest(&record);
    record.extend_from_slice(&digest);

    tracing::debug!(
        "Stamped {} byte firmware: {} bytes padding, {} byte record",
        firmware.len(),
        padded_len - firmware.len(),
        record.len()
    );
    Ok(record)
}

/// A boot record borrowed from an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRecord<'a> {
    pub flag: u8,
    pub body: &'a [u8],
    pub digest: [u8; DIGEST_LEN],
}

impl<'a> ImageRecord<'a> {
    /// Parse a record starting at the beginning of `data`
    ///
    /// Trailing bytes after the digest are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Self, ImageError> {
        let header = data.get(..HEADER_LEN).ok_or(ImageError::Truncated {
            need: HEADER_LEN,
            have: data.len(),
        })?;
        let length = u32::from_le_bytes([header[1], header[2], header[3], header[4]]);

        let body_end = HEADER_LEN + length as usize;
        let need = body_end + DIGEST_LEN;
        if data.len() < need {
            return Err(ImageError::Truncated {
                need,
                have: data.len(),
            });
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&data[body_end..need]);

        Ok(Self {
            flag: header[0],
            body: &data[HEADER_LEN..body_end],
            digest,
        })
    }

    /// Parse a record the way the bootloader reads a flash slot
    ///
    /// Rejects a length that would run past a slot of `slot_len` bytes
    /// before touching the body.
    pub fn parse_in_slot(data: &'a [u8], slot_len: usize) -> Result<Self, ImageError> {
        let capacity = slot_len.saturating_sub(HEADER_LEN + DIGEST_LEN);
        if data.len() >= HEADER_LEN {
            let length = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
            if length as usize > capacity {
                return Err(ImageError::Oversize { length, capacity });
            }
        }
        Self::parse(&data[..data.len().min(slot_len)])
    }

    pub fn cipher(&self) -> CipherMode {
        CipherMode::from_flag(self.flag)
    }

    /// Body length as stored in the header
    pub fn length(&self) -> u32 {
        // parse() took the body length from a u32
        self.body.len() as u32
    }

    /// Total bytes the record occupies
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.body.len() + DIGEST_LEN
    }

    pub fn computed_digest(&self) -> [u8; DIGEST_LEN] {
        record_digest(self.flag, self.length(), self.body)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Check the stored digest against the record contents
    pub fn verify(&self) -> Result<(), ImageError> {
        let actual = self.computed_digest();
        if actual != self.digest {
            return Err(ImageError::DigestMismatch {
                expected: self.digest_hex(),
                actual: hex::encode(actual),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(27), 0);
        assert_eq!(padding_for(0), 27);
        assert_eq!(padding_for(28), 63);
        assert_eq!(padding_for(91), 0);
    }

    #[test]
    fn test_stamp_layout() {
        let record = stamp(b"hello").unwrap();

        // 5 + 22 padding = 27 body bytes
        assert_eq!(record.len(), HEADER_LEN + 27 + DIGEST_LEN);
        assert_eq!(record[0], 0x00);
        assert_eq!(&record[1..5], &27u32.to_le_bytes());
        assert_eq!(&record[5..10], b"hello");
        assert!(record[10..32].iter().all(|&b| b == 0));

        let digest = Sha256::digest(&record[..32]);
        assert_eq!(&record[32..], digest.as_slice());
    }

    #[test]
    fn test_stamp_record_is_64_byte_aligned() {
        for len in [0usize, 1, 26, 27, 28, 63, 64, 1000, 4096] {
            let record = stamp(&vec![0xa5; len]).unwrap();
            assert_eq!(record.len() % BODY_ALIGN, 0, "firmware length {len}");
        }
    }

    #[test]
    fn test_stamp_empty_firmware() {
        let record = stamp(&[]).unwrap();
        assert_eq!(record.len(), 64);
        let parsed = ImageRecord::parse(&record).unwrap();
        assert_eq!(parsed.length(), 27);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_parse_stamped_record() {
        let record = stamp(b"firmware body").unwrap();
        let parsed = ImageRecord::parse(&record).unwrap();

        assert_eq!(parsed.cipher(), CipherMode::Plain);
        assert_eq!(&parsed.body[..13], b"firmware body");
        assert_eq!(parsed.encoded_len(), record.len());
        assert_eq!(parsed.digest_hex().len(), 64);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_parse_ignores_trailing_bytes() {
        let mut image = stamp(b"abc").unwrap();
        let len = image.len();
        image.extend_from_slice(&[0xff; 100]);

        let parsed = ImageRecord::parse(&image).unwrap();
        assert_eq!(parsed.encoded_len(), len);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_verify_detects_corruption() {
        let mut record = stamp(b"firmware body").unwrap();
        record[7] ^= 0x01;

        let err = ImageRecord::parse(&record).unwrap().verify().unwrap_err();
        assert!(matches!(err, ImageError::DigestMismatch { .. }));
    }

    #[test]
    fn test_verify_covers_flag() {
        let mut record = stamp(b"firmware body").unwrap();
        record[0] = CipherMode::Aes.flag();

        let parsed = ImageRecord::parse(&record).unwrap();
        assert_eq!(parsed.cipher(), CipherMode::Aes);
        assert!(parsed.verify().is_err());
    }

    #[test]
    fn test_parse_truncated() {
        let record = stamp(b"abc").unwrap();

        let err = ImageRecord::parse(&record[..3]).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { need: 5, have: 3 }));

        let err = ImageRecord::parse(&record[..record.len() - 1]).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { .. }));
    }

    #[test]
    fn test_parse_in_slot_rejects_erased_flash() {
        let erased = [0xffu8; 256];
        let err = ImageRecord::parse_in_slot(&erased, 256).unwrap_err();
        assert!(matches!(
            err,
            ImageError::Oversize {
                length: 0xffff_ffff,
                capacity: 219
            }
        ));
    }

    #[test]
    fn test_parse_in_slot_exact_fit() {
        // 27 + 37 = 64 bytes: fits a 64 byte slot exactly
        let record = stamp(&[]).unwrap();
        ImageRecord::parse_in_slot(&record, 64).unwrap().verify().unwrap();
        assert!(ImageRecord::parse_in_slot(&record, 63).is_err());
    }

    #[test]
    fn test_cipher_flag_bit_zero() {
        assert_eq!(CipherMode::from_flag(0x00), CipherMode::Plain);
        assert_eq!(CipherMode::from_flag(0x01), CipherMode::Aes);
        assert_eq!(CipherMode::from_flag(0x03), CipherMode::Aes);
        assert_eq!(CipherMode::from_flag(0x02), CipherMode::Plain);
    }
}
