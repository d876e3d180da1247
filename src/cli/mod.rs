use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, SearchRecord};
use crate::auth::StaticSession;
use crate::chat::ChatSession;
use crate::community::{PopularUsers, TrendingTags};
use crate::config::{AppConfig, CliOverrides};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "waydown",
    version,
    about = "Search hidden spots, browse the community and chat from the terminal"
)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token for community endpoints (env WAYDOWN_TOKEN recommended)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Log level (error,warn,info,debug,trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log file used by the interactive mode
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive search box with live suggestions (default)
    Tui,
    /// Run one full search and print the results
    Search { query: Vec<String> },
    /// Print autocomplete suggestions for a prefix
    Suggest { query: Vec<String> },
    /// List popular explorers (needs a token)
    Popular {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List trending tags
    Trending {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Talk to the assistant, one line per message
    Chat,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

pub fn build_client(cfg: &AppConfig) -> Result<ApiClient> {
    let client = ApiClient::new(cfg.base_url.clone())
        .context("build http client")?
        .with_http_config(cfg.http.clone())
        .with_search_config(cfg.search.clone());
    Ok(client)
}

/// One line per record: its `name` or `title` when present, compact JSON otherwise.
pub fn record_label(record: &SearchRecord) -> String {
    ["name", "title"]
        .iter()
        .find_map(|k| record.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| record.to_string())
}

pub async fn run_search(cfg: &AppConfig, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        eprintln!("usage: waydown search <query>");
        return Ok(());
    }
    let client = build_client(cfg)?;
    let results = client.search_spots(query).await.context("search")?;
    if results.is_empty() {
        println!("No spots found.");
    }
    for r in &results {
        println!("{}", record_label(r));
    }
    Ok(())
}

pub async fn run_suggest(cfg: &AppConfig, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Ok(());
    }
    let client = build_client(cfg)?;
    for s in client.fetch_suggestions(query).await.context("suggestions")? {
        println!("{s}");
    }
    Ok(())
}

pub async fn run_popular(cfg: &AppConfig, limit: Option<usize>) -> Result<()> {
    let session = Arc::new(StaticSession::new(cfg.token.clone()));
    let limit = limit.unwrap_or(cfg.community.popular_users_limit);
    let mut panel = PopularUsers::new(build_client(cfg)?, session, limit);
    panel.refresh().await;
    if let Some(err) = panel.state().error() {
        anyhow::bail!("{err}");
    }
    println!("Popular Explorers");
    for line in panel.render_lines() {
        println!("  {line}");
    }
    Ok(())
}

pub async fn run_trending(cfg: &AppConfig, limit: Option<usize>) -> Result<()> {
    let session = Arc::new(StaticSession::new(cfg.token.clone()));
    let limit = limit.unwrap_or(cfg.community.trending_tags_limit);
    let mut panel = TrendingTags::new(build_client(cfg)?, session, limit);
    panel.refresh().await;
    if let Some(err) = panel.state().error() {
        anyhow::bail!("{err}");
    }
    println!("Trending Tags");
    for line in panel.render_lines() {
        println!("  {line}");
    }
    Ok(())
}

pub async fn run_chat(cfg: &AppConfig) -> Result<()> {
    let mut chat = ChatSession::new(build_client(cfg)?, cfg.chat_webhook_url.clone());
    for m in chat.messages() {
        println!("{}", m.render());
    }
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }
        if let Some(reply) = chat.send(&line).await {
            println!("{}", reply.render());
        }
        if let Some(err) = chat.error() {
            eprintln!("{err}");
        }
    }
    Ok(())
}
