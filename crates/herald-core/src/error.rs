use crate::types::PoolKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("{kind} pool not found: {}", path.display())]
    PoolNotFound { kind: PoolKind, path: PathBuf },

    #[error("malformed {kind} pool in {}: {reason}", path.display())]
    MalformedPool {
        kind: PoolKind,
        path: PathBuf,
        reason: String,
    },

    #[error("{0} pool is empty")]
    EmptyPool(PoolKind),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("corrupt state file {}: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HeraldError {
    /// Persisted state could not be read or written.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            HeraldError::CorruptState { .. }
                | HeraldError::Persist { .. }
                | HeraldError::LockPoisoned(_)
                | HeraldError::Io(_)
                | HeraldError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HeraldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_storage() {
        assert!(!HeraldError::EmptyPool(PoolKind::Subject).is_storage());
        assert!(!HeraldError::InvalidConfig("window".into()).is_storage());

        let corrupt = HeraldError::CorruptState {
            path: PathBuf::from("bot_data/history.json"),
            reason: "expected value".into(),
        };
        assert!(corrupt.is_storage());
    }

    #[test]
    fn messages_name_the_pool() {
        let err = HeraldError::PoolNotFound {
            kind: PoolKind::Location,
            path: PathBuf::from("cities.json"),
        };
        assert_eq!(err.to_string(), "location pool not found: cities.json");
    }
}
