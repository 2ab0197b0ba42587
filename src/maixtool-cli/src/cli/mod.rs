//! CLI argument definitions for maixtool
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod memmix;
mod pack;
mod version;

pub use core::{Cli, Commands};
pub use pack::PackCommand;
pub use version::VersionCommand;
