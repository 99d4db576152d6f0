//! Seed import command
//!
//! Usage: revfeed seed import <PATH> [--db <FILE>]

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file, or every seed in a directory, into the database
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,

    /// SQLite database to import into; created and migrated if missing
    #[arg(long, default_value = super::DEFAULT_DB)]
    pub db: PathBuf,
}

pub fn execute(args: SeedArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args),
    }
}

fn execute_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = revfeed_store::db::open_migrated(&args.db)?;

    let seed_files = if args.path.is_dir() {
        // sorted so a directory imports in a stable order
        let mut files: Vec<PathBuf> = std::fs::read_dir(&args.path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    } else {
        vec![args.path]
    };

    for seed_file in seed_files {
        println!("Importing {}...", seed_file.display());
        let summary = revfeed_store::seed::import_seed(&seed_file, &mut conn)?;
        println!(
            "✓ Imported {} items, {} snapshots (digest: {}, latest revision: {})",
            summary.items, summary.snapshots, summary.digest, summary.latest_revision
        );
    }

    Ok(())
}
