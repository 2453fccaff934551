use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use crate::config::Config;
use crate::core::{Action, CompanionEngine, CompanionState, SqliteStore};

#[derive(Parser)]
#[command(name = "maple", version, about = "AI companion state engine")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the companion's current state for a user
    State {
        /// User identifier
        #[arg(short, long)]
        user: String,
        /// Data directory (defaults to the platform config dir)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Apply an interaction (play, feed, chat, rest)
    Interact {
        /// User identifier
        #[arg(short, long)]
        user: String,
        /// Action to apply; unknown actions are a counted no-op
        action: String,
        /// Data directory (defaults to the platform config dir)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

fn build_engine(config: &Config) -> Result<CompanionEngine<SqliteStore>> {
    let store = SqliteStore::new(config.db_path())?;
    Ok(CompanionEngine::new(store, config.decay_rate))
}

pub fn handle_state(user: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let engine = build_engine(&config)?;

    let state = engine.get_state(&user)?;
    print_state(&config.companion_name, &state);

    Ok(())
}

pub fn handle_interact(user: String, action: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let engine = build_engine(&config)?;

    let action = Action::parse(&action);
    let outcome = engine.interact(&user, action)?;

    println!(
        "{}: {}",
        config.companion_name.cyan().bold(),
        outcome.message
    );
    println!();
    print_state(&config.companion_name, &outcome.state);

    if !outcome.next_suggestions.is_empty() {
        println!("\n{}", "Suggestions".cyan().bold());
        for suggestion in &outcome.next_suggestions {
            println!("  - {}", suggestion);
        }
    }

    Ok(())
}

fn print_state(name: &str, state: &CompanionState) {
    println!("{}", format!("{} Status", name).cyan().bold());
    println!("Mood: {}", state.mood);
    println!("Energy: {}/100", state.energy);
    println!("Bond Level: {}/100", state.bond_level);
    println!("Total Interactions: {}", state.total_interactions);
    println!(
        "Last Interaction: {}",
        state.last_interaction.format("%Y-%m-%d %H:%M UTC")
    );

    if state.energy < 20 {
        println!("{}", "Running low on energy - a rest would help.".yellow());
    }

    println!("\n{}", "Personality".cyan().bold());
    for (trait_name, value) in state.personality.traits() {
        println!("{}: {:.2}", trait_name.cyan(), value);
    }

    if !state.skills.is_empty() {
        println!("\n{}", "Skills".cyan().bold());
        let mut skills: Vec<_> = state.skills.iter().collect();
        skills.sort();
        for (skill, level) in skills {
            println!("{}: Lv.{}", skill.cyan(), level);
        }
    }
}
