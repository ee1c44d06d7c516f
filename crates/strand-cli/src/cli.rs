use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "strand", about = "Strand resource document tools", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session settings in TOML
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that a file holds exactly one well-formed JSON value
    Check(CheckArgs),
    /// Re-emit a document, compact or indented
    Fmt(FmtArgs),
    /// List the references in a document that resolve against the given types
    Refs(RefsArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Input file, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Args)]
pub struct FmtArgs {
    /// Input file, or `-` for stdin
    pub file: PathBuf,
    #[arg(long)]
    pub pretty: bool,
    #[arg(long, default_value = "2")]
    pub indent: usize,
}

#[derive(Args)]
pub struct RefsArgs {
    /// Input file, or `-` for stdin
    pub file: PathBuf,
    /// Registered resource types
    #[arg(long = "type", short = 't', required = true)]
    pub types: Vec<String>,
}
