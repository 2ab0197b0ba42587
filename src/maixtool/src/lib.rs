//! # maixtool
//!
//! Build-time image tooling for the MAIX two-stage bootloader.
//!
//! This library provides functionality to:
//! - Stamp firmware binaries into boot records (cipher flag, length, SHA-256)
//! - Parse and verify boot records the way the bootloader does
//! - Pack records into flash slots and inspect packed images
//! - Extract firmware and hardware version fields from binaries
//! - Convert ECC ROM dumps into the bit-reversed FPGA init format (memmix)
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stage1 = fs::read("loader_stage1.bin")?;
//! let stage2 = fs::read("loader_stage2.bin")?;
//!
//! // Stamp both loaders and lay them out in their 64 KiB slots
//! let image = maixtool::pack_loader(&stage1, &stage2)?;
//!
//! // Check every slot the bootloader would read
//! let report = maixtool::inspect(&image, maixtool::Layout::Loader);
//! assert!(report.is_healthy());
//!
//! fs::write("loader.img", image)?;
//! # Ok(())
//! # }
//! ```

pub mod image;
pub mod memmix;
pub mod pack;
pub mod version;

// Re-export commonly used items
#[doc(inline)]
pub use image::{stamp, CipherMode, ImageError, ImageRecord};
#[doc(inline)]
pub use memmix::{convert, Codec, Granularity, MemmixError, Mode, Rewrap, StreamStats, Word};
#[doc(inline)]
pub use pack::{inspect, pack_firmware, pack_loader, Layout, PackError, PackReport, Packer};
#[doc(inline)]
pub use version::{firmware_version, hardware_version, VersionError};
