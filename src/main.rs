mod api;
mod auth;
mod chat;
mod cli;
mod community;
mod config;
mod logging;
mod search;
mod tui;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.overrides())?;

    let command = cli.command.unwrap_or(Command::Tui);
    if command == Command::Tui {
        logging::init_file_logging(&cfg.log_level, &cfg.log_file)?;
    } else {
        logging::init_stderr_logging(&cfg.log_level)?;
    }
    info!(base_url = %cfg.base_url, authenticated = cfg.token.is_some(), "app config");

    match command {
        Command::Tui => tui::run(&cfg).await,
        Command::Search { query } => cli::run_search(&cfg, &query.join(" ")).await,
        Command::Suggest { query } => cli::run_suggest(&cfg, &query.join(" ")).await,
        Command::Popular { limit } => cli::run_popular(&cfg, limit).await,
        Command::Trending { limit } => cli::run_trending(&cfg, limit).await,
        Command::Chat => cli::run_chat(&cfg).await,
    }
}
