//! `agora`: command-line client for the Agora discussion board.
//!
//! # Usage
//!
//! ```
//! agora --url http://localhost:8080 --user ada@example.com --password secret posts list
//! agora --config ~/.config/agora/config.toml posts create --title Hi --body "First post"
//! ```

use agora_client::{ApiClient, ApiConfig};
use agora_core::{
  filter::ListRequest,
  model::{
    notification::NotificationChannelFilter,
    post::{CreatePost, PostFilter},
    report::{ReportFilter, ReportStatus},
  },
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agora", about = "Command-line client for the Agora discussion board")]
struct Cli {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the agora server (default: http://localhost:8080).
  #[arg(long, env = "AGORA_URL")]
  url: Option<String>,

  /// Member email.
  #[arg(long, env = "AGORA_USER")]
  user: Option<String>,

  /// Member password (plaintext).
  #[arg(long, env = "AGORA_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Read and write posts.
  #[command(subcommand)]
  Posts(PostsCommand),
  /// Read reports (members see their own).
  #[command(subcommand)]
  Reports(ReportsCommand),
  /// Read your notification channels.
  #[command(subcommand)]
  Channels(ChannelsCommand),
}

#[derive(Subcommand, Debug)]
enum PostsCommand {
  List {
    /// Case-insensitive substring of the title.
    #[arg(long)]
    title: Option<String>,
    #[command(flatten)]
    page: PageArgs,
  },
  Create {
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: String,
  },
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
  List {
    #[arg(long)]
    status: Option<ReportStatus>,
    #[command(flatten)]
    page: PageArgs,
  },
}

#[derive(Subcommand, Debug)]
enum ChannelsCommand {
  List {
    #[command(flatten)]
    page: PageArgs,
  },
}

#[derive(Args, Debug)]
struct PageArgs {
  #[arg(long, default_value_t = 1)]
  page:  i64,
  #[arg(long, default_value_t = 20)]
  limit: i64,
  /// Sort field, `-` prefixed for descending.
  #[arg(long)]
  sort:  Option<String>,
}

impl PageArgs {
  fn request<F>(self, filter: F) -> ListRequest<F> {
    let request = ListRequest::new(filter).page(self.page, self.limit);
    match self.sort {
      Some(sort) => request.sort(sort),
      None => request,
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let file_cfg: ConfigFile = if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: cli
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: cli
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: cli
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config).context("failed to build HTTP client")?;

  match cli.command {
    Command::Posts(PostsCommand::List { title, page }) => {
      let filter = PostFilter { title, ..Default::default() };
      print(&client.list_posts(&page.request(filter)).await?)
    }
    Command::Posts(PostsCommand::Create { title, body }) => {
      print(&client.create_post(&CreatePost { title, body }).await?)
    }
    Command::Reports(ReportsCommand::List { status, page }) => {
      let filter = ReportFilter { status, ..Default::default() };
      print(&client.list_reports(&page.request(filter)).await?)
    }
    Command::Channels(ChannelsCommand::List { page }) => {
      let filter = NotificationChannelFilter::default();
      print(&client.list_channels(&page.request(filter)).await?)
    }
  }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  let json = serde_json::to_string_pretty(value).context("serialising response")?;
  println!("{json}");
  Ok(())
}
