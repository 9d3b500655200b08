//! # Pechenka terminal host
//!
//! Plays the fortune cookie in a terminal.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- --catalog data/pechenka.json --user-id 42
//! ```
//!
//! Then at the prompt:
//! - `ask`            - check eligibility and show the categories
//! - `<number>`       - request a prediction from a listed category
//! - `luck`           - request a prediction from a random category
//! - `quit`           - exit

use anyhow::Context;
use clap::Parser;
use pechenka::catalog::{CatalogSource, FileCatalogSource, HttpCatalogSource};
use pechenka::config::{Config, LoggingConfig};
use pechenka::messages;
use pechenka::remote::{
    DebugAuthority, HttpDebugAuthority, HttpLogSink, LogSink, StaticIdentity, UserInfo,
};
use pechenka::storage::FileStore;
use pechenka::{PredictionSession, SessionConfig, SessionDeps, SystemClock};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

static TRACE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Debug, Parser)]
#[command(name = "pechenka", about = "Fortune-cookie predictions, twice a day")]
struct Args {
    /// Configuration file (defaults to config.toml + config.local.toml)
    #[arg(long)]
    config: Option<String>,

    /// Catalog file path or URL
    #[arg(long)]
    catalog: Option<String>,

    /// Key-value store file
    #[arg(long)]
    store: Option<PathBuf>,

    /// User id reported to remote services
    #[arg(long)]
    user_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {path}"))?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Using default configuration ({e})");
            Config::default()
        }),
    };
    if let Some(catalog) = args.catalog {
        config.catalog.source = catalog;
    }
    if let Some(store) = args.store {
        config.storage.path = store;
    }
    if let Some(user_id) = args.user_id {
        config.identity.user_id = Some(user_id);
    }

    init_tracing(&config.logging);

    println!("{}", messages::LOADING);
    let mut session = PredictionSession::initialize(build_deps(&config), SessionConfig::from(&config)).await;
    match session.list_categories() {
        Ok(_) => println!("Type `{}` to ask, `quit` to exit.", messages::ASK),
        Err(e) => println!("{}", e.user_message()),
    }
    if session.is_debug() {
        println!("[debug mode]");
    }

    run_repl(&mut session).await?;
    session.flush_logs().await;
    Ok(())
}

fn build_deps(config: &Config) -> SessionDeps {
    let timeout = config.remote.timeout();

    let catalog_source: Arc<dyn CatalogSource> = if config.catalog.is_remote() {
        Arc::new(HttpCatalogSource::new(config.catalog.source.clone(), timeout))
    } else {
        Arc::new(FileCatalogSource::new(&config.catalog.source))
    };

    let identity = match &config.identity.user_id {
        Some(id) => StaticIdentity(Some(UserInfo {
            id: id.clone(),
            first_name: config.identity.first_name.clone(),
            last_name: config.identity.last_name.clone(),
        })),
        None => StaticIdentity::anonymous(),
    };

    SessionDeps {
        catalog_source,
        store: Arc::new(FileStore::new(config.storage.path.clone())),
        identity: Arc::new(identity),
        debug_authority: config
            .remote
            .debug_status_url
            .as_deref()
            .map(|url| Arc::new(HttpDebugAuthority::new(url, timeout)) as Arc<dyn DebugAuthority>),
        log_sink: config
            .remote
            .log_url
            .as_deref()
            .map(|url| Arc::new(HttpLogSink::new(url, timeout)) as Arc<dyn LogSink>),
        clock: Arc::new(SystemClock),
    }
}

async fn run_repl(session: &mut PredictionSession) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    // Categories offered by the last successful `ask`
    let mut menu: Vec<String> = Vec::new();

    loop {
        let line = match editor.readline("pechenka> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "quit" | "exit" => break,
            "ask" | messages::ASK => {
                menu = ask(session).await;
            }
            "luck" => {
                if take_menu(&mut menu) {
                    predict(session, None).await;
                }
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=menu.len()).contains(&n) => {
                    let category = menu[n - 1].clone();
                    menu.clear();
                    predict(session, Some(&category)).await;
                }
                // the entry after the last category is the lucky pick
                Ok(n) if !menu.is_empty() && n == menu.len() + 1 => {
                    menu.clear();
                    predict(session, None).await;
                }
                _ => println!("Unknown command: {other}"),
            },
        }
    }
    Ok(())
}

/// Menu must be open to pick from it; picking closes it
fn take_menu(menu: &mut Vec<String>) -> bool {
    if menu.is_empty() {
        println!("Type `ask` first.");
        return false;
    }
    menu.clear();
    true
}

async fn ask(session: &mut PredictionSession) -> Vec<String> {
    let eligibility = match session.check_eligibility().await {
        Ok(eligibility) => eligibility,
        Err(e) => {
            println!("{}", e.user_message());
            return Vec::new();
        }
    };

    println!("{}", messages::message_for(&eligibility));
    if !eligibility.eligible {
        return Vec::new();
    }

    match session.list_categories() {
        Ok(categories) => {
            for (i, category) in categories.iter().enumerate() {
                println!("  {}. {category}", i + 1);
            }
            println!("  {}. {}", categories.len() + 1, messages::LUCKY);
            categories
        }
        Err(e) => {
            println!("{}", e.user_message());
            Vec::new()
        }
    }
}

async fn predict(session: &mut PredictionSession, category: Option<&str>) {
    match session.request_prediction(category).await {
        Ok(outcome) => {
            println!();
            println!("  {}", outcome.text);
            println!();
        }
        Err(e) => {
            tracing::debug!(error = %e, "prediction refused");
            println!("{}", e.user_message());
        }
    }
}

fn init_tracing(logging_config: &LoggingConfig) {
    // Environment variables take precedence over config file values
    let json = env::var("PECHENKA_LOG_JSON")
        .ok()
        .map_or_else(|| logging_config.format == "json", |v| v != "0");
    let level = env::var("PECHENKA_LOG_LEVEL")
        .ok()
        .unwrap_or_else(|| logging_config.level.clone());

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let _ = TRACE_GUARD.set(guard);

    let filter = || {
        tracing_subscriber::EnvFilter::try_new(&level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let base = || {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(non_blocking.clone())
            .with_target(false)
    };

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if json {
        Box::new(base().json().finish())
    } else {
        Box::new(base().compact().finish())
    };

    let _ = tracing::subscriber::set_global_default(subscriber);
}
