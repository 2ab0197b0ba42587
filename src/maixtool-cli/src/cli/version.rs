//! Version command CLI definitions

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum VersionCommand {
    /// Extract the firmware version a loader binary points to
    #[command(visible_alias = "fw")]
    Firmware {
        /// Loader binary
        input: PathBuf,

        /// 8-byte little-endian version file to write
        output: PathBuf,
    },

    /// Extract the 32-bit hardware version at offset 32
    #[command(visible_alias = "hw")]
    Hardware {
        /// Loader binary
        input: PathBuf,

        /// 8-byte little-endian version file to write
        output: PathBuf,
    },

    /// Append a file (normally an extracted version) to an image
    Append {
        /// Image to extend; created if missing
        target: PathBuf,

        /// File whose bytes are appended
        addition: PathBuf,
    },
}
