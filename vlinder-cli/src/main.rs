mod cli;

use anyhow::Result;
use clap::Parser;
use colored::*;
use vlinder::Config;

use cli::commands::convert::handle_convert_command;
use cli::commands::import::handle_import_command;
use cli::{Cli, Commands};

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match cli.command {
        Commands::Import(args) => handle_import_command(args, &config),
        Commands::Convert(args) => handle_convert_command(args, &config),
    }
}
