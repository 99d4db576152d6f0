//! revfeed CLI
//!
//! Command-line interface for the revision change feed

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "revfeed")]
#[command(about = "revfeed - reconstruct work item changes between revisions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the feed over HTTP
    Serve(commands::serve::ServeArgs),
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Run one feed query and print the response as JSON
    Updates(commands::updates::UpdatesArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args),
        Commands::Seed(args) => commands::seed::execute(args),
        Commands::Updates(args) => commands::updates::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
