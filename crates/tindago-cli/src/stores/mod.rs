//! Store review command handlers for the CLI.
//!
//! `import` loads a realtime-database export into Postgres; `transition`
//! drives the lifecycle engine; `list` and `show` are read-only.

mod import;
mod query;
mod transition;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use tindago_core::{LifecycleAction, StoreStatus};

pub(crate) use import::run_stores_import;
pub(crate) use query::{run_stores_list, run_stores_show};
pub(crate) use transition::{run_stores_transition, TransitionArgs};

/// Sub-commands available under `stores`.
#[derive(Debug, Subcommand)]
pub enum StoresCommands {
    /// List registrations and stores, newest first
    List {
        /// Filter by status (pending, approved, rejected, active, suspended)
        #[arg(long)]
        status: Option<StoreStatus>,
        /// Maximum number of records to show
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show one record with its documents and available actions
    Show {
        /// Store or registration id
        id: String,
    },
    /// Import stores and transactions from a JSON export
    Import {
        /// Path to the exported JSON file
        #[arg(long)]
        file: PathBuf,
        /// Parse and report without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply a lifecycle action (approve, reject, re-review, suspend, reactivate, delete)
    Transition {
        /// Store or registration id
        id: String,
        /// Action to apply
        action: LifecycleAction,
        /// Reason recorded with reject and suspend
        #[arg(long)]
        reason: Option<String>,
        /// Refuse the write unless the record is still at this version
        #[arg(long)]
        expected_version: Option<i64>,
        /// Confirm an irreversible action
        #[arg(long)]
        yes: bool,
    },
}

fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// Truncate to `max` characters, appending `...` when shortened.
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
