//! staysift - Natural-language hotel search from the terminal
//!
//! Reads a scraped hotel listing (from the listing server or a local JSON
//! file) and answers free-text queries such as "piscina barato" or
//! "no sé, sorpréndeme".

mod api;
mod cache;
mod catalog;
mod cli;
mod commands;
mod config;
mod fuzzy;
mod hotel;
mod intent;
mod output;
mod recommend;
mod search;
mod text;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::RuntimeContext;

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(io::stderr(), "Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = RuntimeContext::new(&cli.global)?;
    ctx.init_logging()?;

    log::debug!("Config loaded from: {:?}", ctx.config_path());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_command(&ctx, cli.command))
}

async fn run_command(ctx: &RuntimeContext, command: Command) -> Result<()> {
    match command {
        Command::Search(args) => commands::search::run(ctx, args).await,
        Command::Intent { query } => commands::intent::run(ctx, &query),
        Command::Suggest { query } => commands::suggest::run(ctx, &query).await,
        Command::List => commands::hotels::list(ctx).await,
        Command::Show { hotel } => commands::hotels::show(ctx, &hotel).await,
        Command::Recommend(args) => commands::recommend::run(ctx, args).await,
        Command::Cache { command } => commands::cache::execute(ctx, command).await,
        Command::Config { command } => commands::config::run(ctx, command),
        Command::Completions { shell } => commands::completions::run(shell),
    }
}
