mod cli;
mod config;
mod core;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Args, Commands};

fn main() -> Result<()> {
    let args = Args::parse();

    // Log to stderr so stdout stays clean for command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::State { user, data_dir } => cli::handle_state(user, data_dir),
        Commands::Interact {
            user,
            action,
            data_dir,
        } => cli::handle_interact(user, action, data_dir),
    }
}
