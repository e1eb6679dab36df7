// src/cli/mod.rs — CLI definition (clap derive)

pub mod prompt;
pub mod review;
pub mod snaps;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mirrors", about = "Mirror-selfie outfit reviewer", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review the outfit in a photo (consumes one snap on success)
    Review {
        /// Image file (JPEG, PNG or WebP)
        image: String,
        /// Print the review as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the snap balance and recent transactions
    Snaps {
        /// Number of transactions to list
        #[arg(long, default_value = "10")]
        history: usize,
    },
    /// Print the prompt that would be sent right now
    Prompt,
}
