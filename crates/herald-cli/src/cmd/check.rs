use crate::output::{print_json, print_table};
use anyhow::Context;
use herald_core::history::HistoryStore;
use herald_core::ledger::DispatchLedger;
use herald_core::PoolKind;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PoolReport {
    kind: PoolKind,
    file: String,
    entries: usize,
    remaining: usize,
}

#[derive(Serialize)]
struct CheckReport {
    window: String,
    data_dir: String,
    pools: Vec<PoolReport>,
    last_dispatch: Option<chrono::NaiveDate>,
}

/// Validate config, pools and persisted state without touching anything.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, pools) = super::load_project(root)?;
    let data_dir = config.data_dir(root);

    let history = HistoryStore::in_dir(&data_dir)
        .load()
        .context("failed to read selection history")?;
    let last_dispatch = DispatchLedger::in_dir(&data_dir)
        .last_completed_date()
        .context("failed to read dispatch ledger")?;

    let report = CheckReport {
        window: config.window.to_string(),
        data_dir: data_dir.display().to_string(),
        pools: PoolKind::all()
            .iter()
            .copied()
            .map(|kind| {
                let pool = pools.get(kind);
                let file = match kind {
                    PoolKind::Location => config.locations_path(root),
                    PoolKind::Subject => config.subjects_path(root),
                };
                PoolReport {
                    kind,
                    file: file.display().to_string(),
                    entries: pool.len(),
                    remaining: history.available(kind, pool.entries()).len(),
                }
            })
            .collect(),
        last_dispatch,
    };

    if json {
        return print_json(&report);
    }

    let rows = report
        .pools
        .iter()
        .map(|p| {
            vec![
                p.kind.to_string(),
                p.file.clone(),
                p.entries.to_string(),
                p.remaining.to_string(),
            ]
        })
        .collect();
    print_table(&["POOL", "FILE", "ENTRIES", "REMAINING"], rows);
    println!();
    println!("window:   {}", report.window);
    println!("data dir: {}", report.data_dir);
    match report.last_dispatch {
        Some(d) => println!("last dispatch: {d}"),
        None => println!("last dispatch: never"),
    }
    println!("ok");
    Ok(())
}
