//! `iconsync status`: pending changes per direction, without applying any.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use iconsync_core::{config, ChangeSet, Direction, PairConfig};
use iconsync_sync::pipeline;

/// Arguments for `iconsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Pair to inspect (omit for every registered pair).
    pub pair: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let pairs = match &self.pair {
            Some(name) => vec![config::load_at(&home, name)
                .with_context(|| format!("unknown pair '{name}'; run `iconsync init` first"))?],
            None => config::list_at(&home).context("failed to load pair configs")?,
        };

        let rows = build_report(&home, &pairs)?;
        if self.json {
            print_json(rows)?;
            return Ok(());
        }

        print_table(rows);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PairStatus {
    pair: String,
    last_sync_at: Option<DateTime<Utc>>,
    by_designers: ChangeSet,
    by_dev: ChangeSet,
    conflicts: BTreeSet<String>,
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    pairs: Vec<PairStatusJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    pairs: usize,
    pending: usize,
    conflicts: usize,
}

#[derive(Serialize)]
struct PairStatusJson {
    pair: String,
    last_sync_at: Option<String>,
    last_sync_age: String,
    by_designers: ChangeSet,
    by_dev: ChangeSet,
    conflicts: BTreeSet<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "direction")]
    direction: String,
    #[tabled(rename = "added")]
    added: usize,
    #[tabled(rename = "modified")]
    modified: usize,
    #[tabled(rename = "removed")]
    removed: usize,
}

fn build_report(home: &Path, pairs: &[PairConfig]) -> Result<Vec<PairStatus>> {
    let mut rows = Vec::new();
    for pair in pairs {
        let plan = pipeline::plan(home, pair)
            .with_context(|| format!("status check failed for '{}'", pair.name))?;
        rows.push(PairStatus {
            pair: pair.name.clone(),
            last_sync_at: plan.baseline_synced_at,
            by_designers: plan.context.by_designers,
            by_dev: plan.context.by_dev,
            conflicts: plan.conflicts,
        });
    }
    Ok(rows)
}

fn print_json(rows: Vec<PairStatus>) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            pairs: rows.len(),
            pending: rows
                .iter()
                .map(|r| r.by_designers.len() + r.by_dev.len())
                .sum(),
            conflicts: rows.iter().map(|r| r.conflicts.len()).sum(),
        },
        pairs: rows
            .into_iter()
            .map(|row| PairStatusJson {
                pair: row.pair,
                last_sync_at: row.last_sync_at.map(|t| t.to_rfc3339()),
                last_sync_age: last_sync_age(row.last_sync_at),
                by_designers: row.by_designers,
                by_dev: row.by_dev,
                conflicts: row.conflicts,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(rows: Vec<PairStatus>) {
    if rows.is_empty() {
        println!("No pairs registered.");
        return;
    }

    let separator = "■".repeat(48).bright_black().to_string();
    let mut needs_sync = false;
    println!("{separator}");
    for row in rows {
        println!(
            "{}  last sync: {}",
            row.pair.to_uppercase().bold(),
            last_sync_age(row.last_sync_at)
        );
        let table_rows = vec![
            table_row(Direction::DesignToDev, &row.by_designers),
            table_row(Direction::DevToDesign, &row.by_dev),
        ];
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");

        for path in &row.conflicts {
            println!("  {} {path}", "conflict".red().bold());
        }
        if row.by_designers.is_empty() && row.by_dev.is_empty() && row.conflicts.is_empty() {
            println!("  {}", "in sync".green());
        } else {
            needs_sync = true;
        }
        println!("{separator}");
    }

    if needs_sync {
        println!("Run 'iconsync sync <pair> --dev' or '--design' to apply pending changes.");
    }
}

fn table_row(direction: Direction, changes: &ChangeSet) -> StatusTableRow {
    StatusTableRow {
        direction: direction.to_string(),
        added: changes.added.len(),
        modified: changes.modified.len(),
        removed: changes.removed.len(),
    }
}

fn last_sync_age(at: Option<DateTime<Utc>>) -> String {
    let Some(at) = at else {
        return "never".to_string();
    };
    let seconds = Utc::now().signed_duration_since(at).num_seconds().max(0);
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    if seconds < 60 * 60 {
        return format!("{}m ago", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h ago", seconds / (60 * 60));
    }
    format!("{}d ago", seconds / (60 * 60 * 24))
}
