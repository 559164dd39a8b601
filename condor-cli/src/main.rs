mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::process;

use clap::{CommandFactory, Parser};
use tracing::error;

use crate::cli::{Args, Commands};
use crate::commands::CommandExecutor;
use crate::config::FileConfig;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let directives = if quiet {
        "condor=error,condor_cli=error,probe=error"
    } else {
        match verbose {
            0 => condor::logging::DEFAULT_LOG_FILTER,
            1 => "condor=debug,condor_cli=debug,probe=debug",
            _ => "trace",
        }
    };
    condor::logging::init(Some(directives));
}

async fn run(args: Args) -> Result<()> {
    if let Commands::Completions { shell } = &args.command {
        let mut cmd = Args::command();
        clap_complete::generate(*shell, &mut cmd, "condor", &mut std::io::stdout());
        return Ok(());
    }

    let path = match args.config {
        Some(path) => path,
        None => FileConfig::default_path()?,
    };
    let executor = CommandExecutor::new(FileConfig::new(path));

    match args.command {
        Commands::Watch { interval } => executor.watch(interval).await?,
        Commands::Check { url, json } => executor.check(&url, json).await?,
        Commands::Play { stream, alternate } => executor.play(&stream, alternate)?,
        Commands::Command { stream, alternate } => executor.command(&stream, alternate)?,
        Commands::List { json } => executor.list(json)?,
        Commands::Init => executor.init()?,
        Commands::ConfigPath => executor.config_path()?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
    Ok(())
}
