use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PoolKind
// ---------------------------------------------------------------------------

/// The two independent selection dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Location,
    Subject,
}

impl PoolKind {
    pub fn all() -> &'static [PoolKind] {
        &[PoolKind::Location, PoolKind::Subject]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PoolKind::Location => "location",
            PoolKind::Subject => "subject",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PoolKind {
    type Err = crate::error::HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" | "city" | "cities" => Ok(PoolKind::Location),
            "subject" | "item" | "items" => Ok(PoolKind::Subject),
            other => Err(crate::error::HeraldError::InvalidConfig(format!(
                "unknown pool kind '{other}'"
            ))),
        }
    }
}
