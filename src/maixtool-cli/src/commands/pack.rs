//! Pack and inspect command handlers

use anyhow::{bail, Context, Result};
use maixtool::pack::{PackReport, SlotStatus};
use maixtool::Layout;
use std::path::Path;

use crate::file_io;

/// Handle `pack loader`
pub fn loader(stage1: &Path, stage2: &Path, output: &Path) -> Result<()> {
    let stage1_bin = file_io::read_file(stage1)?;
    let stage2_bin = file_io::read_file(stage2)?;

    let image =
        maixtool::pack_loader(&stage1_bin, &stage2_bin).context("Failed to pack loader image")?;
    file_io::write_file(output, &image)?;

    tracing::info!("Wrote {} ({} bytes)", output.display(), image.len());
    Ok(())
}

/// Handle `pack firmware`
pub fn firmware(loader: &Path, app: &Path, output: &Path) -> Result<()> {
    let loader_image = file_io::read_file(loader)?;
    let app_bin = file_io::read_file(app)?;

    let image =
        maixtool::pack_firmware(&loader_image, &app_bin).context("Failed to pack firmware image")?;
    file_io::write_file(output, &image)?;

    tracing::info!("Wrote {} ({} bytes)", output.display(), image.len());
    Ok(())
}

/// Handle `inspect`
///
/// Fails when any slot is bad so scripts can rely on the exit status.
pub fn inspect(input: &Path, layout: Layout, json: bool) -> Result<()> {
    let data = file_io::read_file(input)?;
    let report = maixtool::inspect(&data, layout);

    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print!("{}", render(&report));
    }

    if !report.is_healthy() {
        bail!("{} has invalid or mismatched slots", input.display());
    }
    Ok(())
}

fn render(report: &PackReport) -> String {
    let mut out = format!("Image: {} bytes, {:?} layout\n", report.size, report.layout);

    for slot in &report.slots {
        let status = match &slot.status {
            SlotStatus::Valid {
                cipher,
                length,
                digest,
            } => format!("ok      {:?}, {:#x} bytes, {}", cipher, length, digest),
            SlotStatus::Invalid { reason, .. } => format!("INVALID {}", reason),
            SlotStatus::Missing => "missing".to_string(),
        };
        out.push_str(&format!("  {:#07x} {:<14} {}\n", slot.offset, slot.name, status));
    }

    for pair in &report.pairs {
        let verdict = match pair.identical {
            Some(true) => "identical",
            Some(false) => "Different image found",
            None => "cannot compare",
        };
        out.push_str(&format!("  {} / {}: {}\n", pair.primary, pair.backup, verdict));
    }

    out
}
