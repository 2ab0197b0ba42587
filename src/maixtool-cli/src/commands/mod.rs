//! Command handlers for maixtool CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod image;
pub mod memmix;
pub mod pack;
pub mod version;
