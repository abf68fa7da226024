//! CLI module for the community coordinator
//!
//! `serve` runs the HTTP API and is the default when no subcommand is given.

pub mod serve;

use clap::{Parser, Subcommand};

/// Community Coordinator - registration, team formation and moderation API
#[derive(Parser)]
#[command(name = "community-coordinator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve(serve::ServeArgs),
}

impl Cli {
    pub fn command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Serve(serve::ServeArgs::default()))
    }
}
