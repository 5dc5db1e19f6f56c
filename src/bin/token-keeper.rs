use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use token_keeper::cache::{build_keeper, open_token_store};
use token_keeper::cache::token::TokenRecord;
use token_keeper::config::proc_loader::{self, ConfigScope};
use token_keeper::helpers::time::now_i64;
use token_keeper::server;
use token_keeper::store::TokenStore;
use token_keeper::utils::logging::{self, LogLevel};
use token_keeper::ServiceConfig;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config; without it everything comes from the environment
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
    /// Print a valid access token, refreshing it first if needed
    #[default]
    Token,
    /// Show the persisted token expiry without refreshing
    Status,
    /// Serve /token, /health and metrics over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let command = args.command.unwrap_or_default();
    // status only reads the store, credentials are not needed
    let scope = match command {
        Command::Status => ConfigScope::StoreOnly,
        Command::Token | Command::Serve => ConfigScope::Refresh,
    };
    let service_config = load_config(args.config.as_deref(), scope).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Open token store, build refresher, run command
    // -------------------------------

    match command {
        Command::Token => {
            let keeper = build_keeper(&service_config).await?;
            let access_token = keeper.get_valid_access_token().await?;
            println!("{}", access_token);
        }
        Command::Status => {
            let store = open_token_store(&service_config.settings).await?;
            print_status(store.load().await?, service_config.settings.safety_margin_seconds);
        }
        Command::Serve => {
            let keeper = Arc::new(build_keeper(&service_config).await?);
            info!("Service starting...");
            server::server::start(&service_config.settings, keeper).await?;
        }
    }

    Ok(())
}

async fn load_config(path: Option<&str>, scope: ConfigScope) -> Result<ServiceConfig> {
    match path {
        Some(path) => proc_loader::file_to_scoped_config(Path::new(path), scope).await,
        None => proc_loader::env_to_scoped_config(scope).await,
    }
}

fn print_status(record: Option<TokenRecord>, safety_margin_seconds: u64) {
    match record {
        None => println!("state: absent (next request bootstraps from INITIAL_REFRESH_TOKEN)"),
        Some(record) => {
            let expires = DateTime::from_timestamp(record.expires_at, 0)
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| record.expires_at.to_string());
            let now = now_i64();
            let state = if record.is_fresh(now, safety_margin_seconds as i64) {
                "valid"
            } else {
                "expiring"
            };
            println!("state: {}", state);
            println!("expires_at: {} ({}s left)", expires, record.expires_at.saturating_sub(now));
        }
    }
}
