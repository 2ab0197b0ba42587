//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::memmix::{GranularityArg, ModeArg};
use super::pack::{LayoutArg, PackCommand};
use super::version::VersionCommand;

#[derive(Parser)]
#[command(name = "maixtool")]
#[command(about = "MAIX bootloader image tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "MAIXTOOL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an ECC ROM dump into bit-reversed FPGA init format
    #[command(visible_alias = "m")]
    Memmix {
        /// ROM dump to read (reads stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the result (uses stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reversal granularity (uses configured default if not provided)
        #[arg(short, long, value_enum)]
        granularity: Option<GranularityArg>,

        /// Verification policy (uses configured default if not provided)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Stamp a firmware binary with cipher flag, length and SHA-256
    #[command(visible_alias = "s")]
    Stamp {
        /// Raw firmware binary
        input: PathBuf,

        /// Stamped record to write
        output: PathBuf,
    },

    /// Verify the boot record at the start of a file
    Verify {
        /// Stamped record or packed image
        input: PathBuf,
    },

    /// Pack stamped records into flash slots
    #[command(visible_alias = "p")]
    Pack {
        #[command(subcommand)]
        command: PackCommand,
    },

    /// Check every slot of a packed image
    #[command(visible_alias = "i")]
    Inspect {
        /// Packed image
        input: PathBuf,

        /// Which flash map the image follows
        #[arg(short, long, value_enum, default_value = "firmware")]
        layout: LayoutArg,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Firmware and hardware version fields
    #[command(visible_alias = "v")]
    Version {
        #[command(subcommand)]
        command: VersionCommand,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default memmix verification policy
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Set default memmix reversal granularity
        #[arg(long, value_enum)]
        granularity: Option<GranularityArg>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
