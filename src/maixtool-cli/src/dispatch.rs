//! Command dispatch functions
//!
//! Breaks up the main match statement into focused dispatch functions.

use anyhow::Result;

use crate::cli::*;
use crate::commands;
use crate::config::Config;

/// Dispatch a parsed command line
pub fn dispatch(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Memmix {
            input,
            output,
            granularity,
            mode,
        } => {
            let config = Config::load_from(&config_path)?;
            let codec = config.codec(granularity.map(Into::into), mode.map(Into::into));
            commands::memmix::convert(input.as_deref(), output.as_deref(), &codec)
        }

        Commands::Stamp { input, output } => commands::image::stamp(&input, &output),

        Commands::Verify { input } => commands::image::verify(&input),

        Commands::Pack { command } => dispatch_pack(command),

        Commands::Inspect {
            input,
            layout,
            json,
        } => commands::pack::inspect(&input, layout.into(), json),

        Commands::Version { command } => dispatch_version(command),

        Commands::Configure {
            mode,
            granularity,
            show,
        } => commands::configure::handle(
            &config_path,
            mode.map(Into::into),
            granularity.map(Into::into),
            show,
        ),
    }
}

/// Dispatch pack subcommands
pub fn dispatch_pack(command: PackCommand) -> Result<()> {
    match command {
        PackCommand::Loader {
            stage1,
            stage2,
            output,
        } => commands::pack::loader(&stage1, &stage2, &output),

        PackCommand::Firmware {
            loader,
            app,
            output,
        } => commands::pack::firmware(&loader, &app, &output),
    }
}

/// Dispatch version subcommands
pub fn dispatch_version(command: VersionCommand) -> Result<()> {
    match command {
        VersionCommand::Firmware { input, output } => {
            commands::version::firmware(&input, &output)
        }

        VersionCommand::Hardware { input, output } => {
            commands::version::hardware(&input, &output)
        }

        VersionCommand::Append { target, addition } => {
            commands::version::append(&target, &addition)
        }
    }
}
