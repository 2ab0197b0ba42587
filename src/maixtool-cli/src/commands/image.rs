//! Boot record command handlers

use anyhow::{Context, Result};
use maixtool::ImageRecord;
use std::path::Path;

use crate::file_io;

/// Handle `stamp`
pub fn stamp(input: &Path, output: &Path) -> Result<()> {
    let firmware = file_io::read_file(input)?;
    let record = maixtool::stamp(&firmware)
        .with_context(|| format!("Failed to stamp {}", input.display()))?;
    file_io::write_file(output, &record)?;

    tracing::info!(
        "Stamped {} ({} bytes) into {} ({} bytes)",
        input.display(),
        firmware.len(),
        output.display(),
        record.len()
    );
    Ok(())
}

/// Handle `verify`
pub fn verify(input: &Path) -> Result<()> {
    let data = file_io::read_file(input)?;
    let record = ImageRecord::parse(&data)
        .with_context(|| format!("Failed to parse record in {}", input.display()))?;
    record
        .verify()
        .with_context(|| format!("{} failed verification", input.display()))?;

    println!("Cipher:  {:?}", record.cipher());
    println!("Length:  {:#x}", record.length());
    println!("SHA-256: {}", record.digest_hex());
    if data.len() > record.encoded_len() {
        println!(
            "Trailing: {} bytes after the record",
            data.len() - record.encoded_len()
        );
    }
    Ok(())
}
