use crate::output::print_json;
use anyhow::Context;
use herald_core::config::Config;
use herald_core::ledger::DispatchLedger;
use herald_core::random::RandomChooser;
use herald_core::schedule::{plan_next, PlanReason};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PlanReport {
    now: chrono::NaiveDateTime,
    target: chrono::NaiveDateTime,
    reason: PlanReason,
    wait_secs: u64,
}

/// Dry-run the scheduler's next fire time. Nothing is persisted; each
/// invocation draws a fresh time.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load herald.yaml")?;
    let ledger = DispatchLedger::in_dir(&config.data_dir(root));

    let now = chrono::Local::now().naive_local();
    let completed_today = ledger
        .was_completed_on(now.date())
        .context("failed to read dispatch ledger")?;
    let plan = plan_next(
        now,
        completed_today,
        &config.window,
        &mut RandomChooser::new(),
    );

    let report = PlanReport {
        now,
        target: plan.target,
        reason: plan.reason,
        wait_secs: plan.wait_from(now).as_secs(),
    };

    if json {
        return print_json(&report);
    }

    let reason = match report.reason {
        PlanReason::Today => "later today",
        PlanReason::AlreadySent => "already sent today",
        PlanReason::WindowPassed => "today's window has passed",
    };
    println!(
        "next dispatch: {} ({reason}, in {:.2} h)",
        report.target.format("%Y-%m-%d %H:%M"),
        report.wait_secs as f64 / 3600.0
    );
    Ok(())
}
