pub mod config;
pub mod error;
pub mod history;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod pool;
pub mod random;
pub mod schedule;
pub mod selector;
pub mod stats;
pub mod types;

pub use error::{HeraldError, Result};
pub use types::PoolKind;
