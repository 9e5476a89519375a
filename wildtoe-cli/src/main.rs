//! WILDTOE CLI - Command-line interface
//!
//! Commands:
//! - play: Interactive game in the terminal (all four rule combinations)

use clap::{Parser, Subcommand};

mod play;

#[derive(Parser)]
#[command(name = "wildtoe")]
#[command(about = "Tic-tac-toe with Wild and Misere rule variants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game
    Play(play::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
    }
}
