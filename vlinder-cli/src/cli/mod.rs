//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vlinder::case::Format;

#[derive(Parser, Debug)]
#[command(name = "vlinder-cli")]
#[command(version, about = "Import and convert vlinder business cases")]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a case and compile its input mapping
    Import(ImportArgs),
    /// Import a case and write its tables in another format
    Convert(ConvertArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Directory holding the cases
    pub root: PathBuf,

    /// Name of the case
    pub name: String,

    /// Storage format of the case (csv, json or xlsx)
    #[arg(long, short)]
    pub format: Option<Format>,

    /// Template workbook or TOML file
    #[arg(long, short)]
    pub template: Option<PathBuf>,

    /// Write the compiled mapping as JSON to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Directory holding the cases
    pub root: PathBuf,

    /// Name of the case
    pub name: String,

    /// Format to read
    #[arg(long)]
    pub from: Option<Format>,

    /// Format to write
    #[arg(long)]
    pub to: Option<Format>,

    /// Output directory; defaults to the case directory
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Template workbook or TOML file
    #[arg(long, short)]
    pub template: Option<PathBuf>,
}
