use crate::output::print_json;
use anyhow::Context;
use herald_core::config::Config;
use herald_core::history::HistoryStore;
use herald_core::ledger::DispatchLedger;
use herald_core::stats::Stats;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load herald.yaml")?;
    let data_dir = config.data_dir(root);
    let today = chrono::Local::now().date_naive();

    let stats = Stats::collect(
        &HistoryStore::in_dir(&data_dir),
        &DispatchLedger::in_dir(&data_dir),
        today,
    )
    .context("failed to read dispatch state")?;

    if json {
        print_json(&stats)
    } else {
        println!("{stats}");
        Ok(())
    }
}
