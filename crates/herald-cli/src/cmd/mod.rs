pub mod check;
pub mod plan;
pub mod serve;
pub mod stats;

use anyhow::Context;
use herald_core::config::Config;
use herald_core::pool::PoolSet;
use std::path::Path;

/// Load `herald.yaml` (or defaults) and both pools.
pub(crate) fn load_project(root: &Path) -> anyhow::Result<(Config, PoolSet)> {
    let config = Config::load(root).context("failed to load herald.yaml")?;
    let pools = PoolSet::load(&config, root).context("failed to load pools")?;
    Ok((config, pools))
}
