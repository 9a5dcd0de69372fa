//! Fluid CLI
//!
//! Command-line interface for scripting edit files.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use fluid::cli::{commands, Cli, Commands};
use fluid::config::EngineConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Fluid Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Some(cmd) => handle_command(&config, cmd, cli.verbose),
        None => {
            println!("Fluid Engine v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(config: &EngineConfig, cmd: Commands, verbose: bool) -> anyhow::Result<()> {
    match cmd {
        Commands::Create { path } => commands::create_edit(config, &path)?,
        Commands::Exec {
            path,
            address,
            args,
            mode,
        } => {
            commands::exec(config, &path, &address, &args, mode.into())
                .with_context(|| format!("running {} on {}", address, path.display()))?;
        }
        Commands::Insert { path, name } => commands::insert(config, &path, name.as_deref())?,
        Commands::Plugin {
            path,
            name,
            plugin_type,
            track,
        } => commands::add_plugin(config, &path, &name, &plugin_type, track.as_deref())?,
        Commands::Normalize { path, mode, strict } => {
            let report = commands::normalize(config, &path, mode.into(), verbose)?;
            if strict {
                if let Some(error) = report.failures().next() {
                    return Err(error).with_context(|| {
                        format!("{} source(s) in {} could not be resolved", report.failed, path.display())
                    });
                }
            }
        }
        Commands::Print { path } => commands::print_edit(&path)?,
    }
    Ok(())
}
