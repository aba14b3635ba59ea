// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outflo - lead management and outbound campaign platform.
//!
//! This is the binary entry point for the Outflo service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod doctor;
mod import;
mod serve;

/// Outflo - lead management and outbound campaign platform.
#[derive(Parser, Debug)]
#[command(name = "outflo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Outflo gateway server.
    Serve,
    /// Import leads from a CSV file.
    Import {
        /// Owner the leads belong to.
        #[arg(long)]
        owner: String,
        /// Path to the CSV file.
        #[arg(long)]
        file: PathBuf,
        /// Source label recorded on every inserted lead.
        #[arg(long)]
        source: Option<String>,
    },
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match outflo_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            outflo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Import {
            owner,
            file,
            source,
        }) => import::run_import(&config, &owner, &file, source.as_deref()).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("outflo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("outflo: {e}");
        std::process::exit(1);
    }
}
