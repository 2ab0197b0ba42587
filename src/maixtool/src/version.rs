//! Version fields embedded in loader binaries.
//!
//! The firmware version is reached through a pointer stored at offset 2 of
//! the binary. The pointer is a load address, so [`BASE_ADDRESS`] is
//! subtracted to get a file offset. The hardware version is a plain 32-bit
//! field at offset 32. Both are written out as 8 little-endian bytes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

/// Load address of the first byte of the binary
pub const BASE_ADDRESS: u32 = 0x8000_0000;

/// Offset of the little-endian pointer to the firmware version
pub const POINTER_OFFSET: usize = 2;

/// Offset of the little-endian 32-bit hardware version
pub const HARDWARE_VERSION_OFFSET: usize = 32;

/// Size of an encoded version
pub const VERSION_LEN: usize = 8;

/// Errors that can occur while reading or appending versions
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Binary truncated: need {need} bytes at offset {offset:#x}, file is {len} bytes")]
    Truncated {
        offset: usize,
        need: usize,
        len: usize,
    },

    #[error("Version pointer {0:#010x} is below the load address")]
    BelowBase(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn read_at<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], VersionError> {
    let truncated = || VersionError::Truncated {
        offset,
        need: N,
        len: data.len(),
    };
    let end = offset.checked_add(N).ok_or_else(truncated)?;
    let bytes = data.get(offset..end).ok_or_else(truncated)?;

    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Follow the version pointer and read the 64-bit firmware version
pub fn firmware_version(binary: &[u8]) -> Result<u64, VersionError> {
    let pointer = u32::from_le_bytes(read_at(binary, POINTER_OFFSET)?);
    tracing::debug!("Version pointer: {:#010x}", pointer);

    let offset = pointer
        .checked_sub(BASE_ADDRESS)
        .ok_or(VersionError::BelowBase(pointer))?;
    Ok(u64::from_le_bytes(read_at(binary, offset as usize)?))
}

/// Read the 32-bit hardware version, widened to 64 bits
pub fn hardware_version(binary: &[u8]) -> Result<u64, VersionError> {
    let version = u32::from_le_bytes(read_at(binary, HARDWARE_VERSION_OFFSET)?);
    Ok(u64::from(version))
}

/// Encode a version the way it is stored in a firmware image
pub fn encode(version: u64) -> [u8; VERSION_LEN] {
    version.to_le_bytes()
}

/// Append the contents of `addition` to `target`
///
/// Creates `target` if it does not exist. Returns the number of bytes
/// appended.
pub fn append(target: &Path, addition: &Path) -> Result<u64, VersionError> {
    let data = std::fs::read(addition)?;
    let mut file = OpenOptions::new().create(true).append(true).open(target)?;
    file.write_all(&data)?;
    file.flush()?;

    tracing::debug!(
        "Appended {} bytes from {} to {}",
        data.len(),
        addition.display(),
        target.display()
    );
    Ok(data.len() as u64)
}
