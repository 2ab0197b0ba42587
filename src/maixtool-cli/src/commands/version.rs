//! Version command handlers

use anyhow::{Context, Result};
use maixtool::version;
use std::path::Path;

use crate::file_io;

/// Handle `version firmware`
pub fn firmware(input: &Path, output: &Path) -> Result<()> {
    let binary = file_io::read_file(input)?;
    let value = maixtool::firmware_version(&binary)
        .with_context(|| format!("Failed to read firmware version from {}", input.display()))?;

    tracing::info!("Firmware version: {:#x}", value);
    file_io::write_file(output, &version::encode(value))
}

/// Handle `version hardware`
pub fn hardware(input: &Path, output: &Path) -> Result<()> {
    let binary = file_io::read_file(input)?;
    let value = maixtool::hardware_version(&binary)
        .with_context(|| format!("Failed to read hardware version from {}", input.display()))?;

    tracing::info!("Hardware version: {:#x}", value);
    file_io::write_file(output, &version::encode(value))
}

/// Handle `version append`
pub fn append(target: &Path, addition: &Path) -> Result<()> {
    let appended = version::append(target, addition).with_context(|| {
        format!(
            "Failed to append {} to {}",
            addition.display(),
            target.display()
        )
    })?;

    tracing::info!("version appended ({} bytes)", appended);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_and_append() {
        let dir = TempDir::new().unwrap();
        let loader = dir.path().join("loader.bin");
        let fw_version = dir.path().join("fw_version.bin");
        let hw_version = dir.path().join("hw_version.bin");
        let image = dir.path().join("firmware.img");

        let mut binary = vec![0u8; 0x50];
        binary[2..6].copy_from_slice(&(version::BASE_ADDRESS + 0x48).to_le_bytes());
        binary[32..36].copy_from_slice(&0x210u32.to_le_bytes());
        binary[0x48..0x50].copy_from_slice(&0x0102_0304u64.to_le_bytes());
        std::fs::write(&loader, &binary).unwrap();
        std::fs::write(&image, b"img").unwrap();

        firmware(&loader, &fw_version).unwrap();
        hardware(&loader, &hw_version).unwrap();
        append(&image, &fw_version).unwrap();

        assert_eq!(
            std::fs::read(&fw_version).unwrap(),
            0x0102_0304u64.to_le_bytes()
        );
        assert_eq!(std::fs::read(&hw_version).unwrap(), 0x210u64.to_le_bytes());
        assert_eq!(std::fs::read(&image).unwrap().len(), 3 + 8);
    }

    #[test]
    fn test_bad_pointer_names_file() {
        let dir = TempDir::new().unwrap();
        let loader = dir.path().join("loader.bin");
        std::fs::write(&loader, [0u8; 16]).unwrap();

        let err = firmware(&loader, &dir.path().join("out.bin")).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("loader.bin"));
        assert!(message.contains("below the load address"));
    }
}
