use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wikkid",
    about = "Wikkid wiki: inspect and edit a version-controlled wiki store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root of the wiki working tree
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// File store configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty wiki store
    Init,
    /// Print the content of a file, or list a directory
    Cat(CatArgs),
    /// Add or update a file as one revision
    Put(PutArgs),
    /// Show how an entry is classified and which view renders it
    Info(InfoArgs),
    /// Show revision history, newest first
    Log(LogArgs),
}

#[derive(Args)]
pub struct CatArgs {
    pub path: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    /// Read content from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(short, long)]
    pub message: Option<String>,
    /// Commit author, as "Name <email>"
    #[arg(long, default_value = "Anonymous <anonymous@localhost>")]
    pub author: String,
    /// Revision the edit is based on; required to overwrite an existing file
    #[arg(long, conflicts_with = "force")]
    pub parent: Option<String>,
    /// Overwrite an existing file without checking which revision it is at
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    pub path: String,
    /// View name to resolve instead of the default
    #[arg(long)]
    pub view: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}
