//! Memmix command handler

use anyhow::{Context, Result};
use maixtool::Codec;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::file_io;

/// Handle `memmix`
///
/// Nothing past the first bad line is written; the error carries its line
/// number.
pub fn convert(input: Option<&Path>, output: Option<&Path>, codec: &Codec) -> Result<()> {
    let reader = file_io::open_input(input)?;
    let writer = file_io::open_output(output)?;
    run(reader, writer, codec)
}

fn run(reader: impl BufRead, writer: impl Write, codec: &Codec) -> Result<()> {
    tracing::debug!(
        "memmix: {:?} granularity, {:?} mode",
        codec.granularity,
        codec.mode
    );
    let stats = maixtool::convert(reader, writer, codec).context("memmix failed")?;
    tracing::info!(
        "Converted {} words ({} header lines)",
        stats.words,
        stats.headers
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maixtool::{Granularity, Mode};
    use tempfile::TempDir;

    #[test]
    fn test_convert_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("rom.hex");
        let output = dir.path().join("init.hex");
        std::fs::write(&input, "@0\n000000000000000001\n").unwrap();

        convert(Some(&input), Some(&output), &Codec::default()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "@0\n8000000000000000\n00"
        );
    }

    #[test]
    fn test_error_is_single_line() {
        let mut out = Vec::new();
        let codec = Codec::new(Granularity::Bit, Mode::Fast);
        let err = run(&b"zz\n"[..], &mut out, &codec).unwrap_err();

        let message = format!("{err:#}");
        assert_eq!(message, "memmix failed: line 1: Invalid hex digit 'z'");
        assert!(!message.contains('\n'));
        assert!(out.is_empty());
    }
}
