//! Memmix option values

use clap::ValueEnum;
use maixtool::{Granularity, Mode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    /// Full bit reversal
    Bit,
    /// Reverse 2-bit groups, keeping each group's order
    Pair,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Bit => Granularity::Bit,
            GranularityArg::Pair => Granularity::Pair,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Cross-check every word against the reference reversals
    Verified,
    /// Skip the cross-check
    Fast,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Verified => Mode::Verified,
            ModeArg::Fast => Mode::Fast,
        }
    }
}
