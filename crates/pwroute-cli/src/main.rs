//! pwroute - list, link and watch PipeWire ports.
//!
//! Thin front end over `pwroute-pipewire`: every subcommand runs one of the
//! PipeWire tools and prints the parsed result as text or JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pwroute_pipewire::{PipeWire, PortDirection, SystemRunner};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod signals;
#[cfg(test)]
mod test_support;
mod watch;

#[derive(Parser)]
#[command(name = "pwroute", version)]
#[command(about = "Inspect and rewire the PipeWire graph", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that pw-cli and pw-link work and the server answers
    Check,
    /// Show PipeWire core information
    Info {
        /// Print pw-cli output unparsed
        #[arg(long, conflicts_with = "json")]
        raw: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List input ports
    Inputs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List output ports
    Outputs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List active links
    Links {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Link an output port to an input port (IDs or node:port names)
    Link {
        /// Output port
        output: String,
        /// Input port
        input: String,
    },
    /// Remove a link by ID
    Unlink {
        /// Link ID
        link_id: u32,
    },
    /// Print link changes as they happen
    Watch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("pwroute={level},pwroute_pipewire={level}"))),
        )
        .init();

    debug!(?config, "Configuration loaded");

    let runner = if config.general.quiet { SystemRunner::quiet() } else { SystemRunner::new() };
    let pw = PipeWire::with_runner(runner, config.tools.clone());

    match cli.command {
        Command::Check => commands::check(&pw),
        Command::Info { raw, json } => commands::info(&pw, raw, json),
        Command::Inputs { json } => commands::ports(&pw, PortDirection::Input, json),
        Command::Outputs { json } => commands::ports(&pw, PortDirection::Output, json),
        Command::Links { json } => commands::links(&pw, json),
        Command::Link { output, input } => commands::link(&pw, &output, &input),
        Command::Unlink { link_id } => commands::unlink(&pw, link_id),
        Command::Watch => watch::run(&config, pw),
    }
}
