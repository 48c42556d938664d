//! `swiftdesk` command-line entry point.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use swiftdesk::app::{
    Record, build_state, build_store, build_usage_tracker, fetch_record, load_config,
};
use swiftdesk::core::{NotesService, UsageObserver, parse_day};
use swiftdesk::protocol::UsageStats;
use tokio::net::TcpListener;

/// Command-line options for the SwiftDesk backend.
#[derive(Parser)]
#[command(name = "swiftdesk", version)]
struct Cli {
    /// Optional path to a swiftdesk.json5 applied over the discovered layers
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP relay server
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect or change the local token usage record
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
    /// Append or list notes in the remote store
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Print a profile, guest or store record
    Show {
        #[command(subcommand)]
        record: ShowRecord,
    },
}

#[derive(Subcommand)]
enum ShowRecord {
    /// users/{uid}/profile
    Profile { uid: String },
    /// guestinfo/{id}
    Guest { id: String },
    /// stores/{id}
    Store { id: String },
}

#[derive(Subcommand)]
enum UsageAction {
    /// Print the current stats
    Show,
    /// Add tokens to the running total
    Add { tokens: u64 },
    /// Price the total with another model
    Model { name: String },
    /// Delete the record
    Clear,
}

#[derive(Subcommand)]
enum NoteAction {
    /// Append a note to today's bucket
    Add { uid: String, content: String },
    /// List the notes of one day
    List {
        uid: String,
        /// Day as YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        date: Option<String>,
    },
}

/// Prints stats to stdout after every change.
struct PrintObserver;

impl UsageObserver for PrintObserver {
    fn on_update(&self, stats: &UsageStats) {
        print_stats(stats);
    }
}

fn print_stats(stats: &UsageStats) {
    println!(
        "model={} total={} cost=${:.4}",
        stats.model, stats.total, stats.cost
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    swiftdesk::init_logging();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let store = build_store(&config.store, &cwd)?;
            let usage = Arc::new(build_usage_tracker(&config.usage, &cwd, None)?);
            let state = Arc::new(build_state(&config, store, usage)?);
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            swiftdesk::server::serve(listener, state)
                .await
                .context("server error")?;
        }
        Command::Usage { action } => {
            let tracker =
                build_usage_tracker(&config.usage, &cwd, Some(Arc::new(PrintObserver)))?;
            match action {
                UsageAction::Show => print_stats(&tracker.get_stats()),
                UsageAction::Add { tokens } => {
                    tracker.add_tokens(tokens).context("failed to add tokens")?;
                }
                UsageAction::Model { name } => {
                    tracker.set_model(&name).context("failed to set model")?;
                }
                UsageAction::Clear => {
                    tracker.clear().context("failed to clear usage")?;
                }
            }
        }
        Command::Note { action } => {
            let notes = NotesService::new(build_store(&config.store, &cwd)?);
            match action {
                NoteAction::Add { uid, content } => {
                    let created = notes
                        .add_note(&uid, &content)
                        .await
                        .context("failed to add note")?;
                    info!("note stored (date={}, id={})", created.date, created.id);
                    println!("{}", serde_json::to_string_pretty(&created)?);
                }
                NoteAction::List { uid, date } => {
                    let date = match date {
                        Some(raw) => parse_day(&raw)?,
                        None => Utc::now().date_naive(),
                    };
                    let list = notes
                        .notes_for_day(&uid, date)
                        .await
                        .context("failed to list notes")?;
                    println!("{}", serde_json::to_string_pretty(&list)?);
                }
            }
        }
        Command::Show { record } => {
            let store = build_store(&config.store, &cwd)?;
            let record = match &record {
                ShowRecord::Profile { uid } => Record::Profile(uid),
                ShowRecord::Guest { id } => Record::Guest(id),
                ShowRecord::Store { id } => Record::Store(id),
            };
            let value = fetch_record(store.as_ref(), record).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
