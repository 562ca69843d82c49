//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "quotes-admin", version, about = "Quotes catalog admin back-office")]
pub struct Cli {
    /// Folder holding quotes.db (created if missing)
    #[arg(long, env = "QUOTES_ROOT")]
    pub root_folder: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5730
    #[arg(long, env = "QUOTES_BIND")]
    pub bind: Option<String>,
}
