//! Pack command CLI definitions

use clap::{Subcommand, ValueEnum};
use maixtool::Layout;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum PackCommand {
    /// Stamp stage1 and stage2 loaders and pack them with a stage2 backup
    Loader {
        /// Raw stage1 loader binary
        stage1: PathBuf,

        /// Raw stage2 loader binary
        stage2: PathBuf,

        /// Packed loader image to write
        output: PathBuf,
    },

    /// Append a stamped application and its backup to a packed loader image
    Firmware {
        /// Packed loader image (from `pack loader`)
        loader: PathBuf,

        /// Raw application binary
        app: PathBuf,

        /// Packed firmware image to write
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// stage1, stage2 and stage2 backup
    Loader,
    /// Loader slots plus app and app backup
    Firmware,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Loader => Layout::Loader,
            LayoutArg::Firmware => Layout::Firmware,
        }
    }
}
