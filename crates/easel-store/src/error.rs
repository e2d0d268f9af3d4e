//! Error types for the store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reported by preset and project operations.
///
/// "Not found" is never an error: lookups return `Ok(None)` or `Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Default presets ship with the tool and cannot be changed or removed.
    #[error("Default preset cannot be modified: {0}")]
    DefaultPresetProtected(String),

    /// A file or stored record belongs to a different tool.
    #[error("Data belongs to tool '{found}', expected '{expected}'")]
    ToolMismatch { expected: String, found: String },

    /// An import blob could not be parsed.
    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    /// The durable store refused a write because it is full.
    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    /// A stored blob exists but cannot be decoded.
    #[error("Corrupt record at '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// A value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn corrupt(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_import(reason: impl std::fmt::Display) -> Self {
        Self::InvalidImport(reason.to_string())
    }

    /// Whether the failure was a rejected request rather than a storage fault.
    ///
    /// Validation failures never change any state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DefaultPresetProtected(_) | Self::ToolMismatch { .. } | Self::InvalidImport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(StoreError::DefaultPresetProtected("x".into()).is_validation());
        assert!(StoreError::ToolMismatch {
            expected: "a".into(),
            found: "b".into()
        }
        .is_validation());
        assert!(StoreError::invalid_import("bad").is_validation());
        assert!(!StoreError::QuotaExceeded { needed: 2, limit: 1 }.is_validation());
        assert!(!StoreError::corrupt("k", "eof").is_validation());
        assert!(!StoreError::Backend(anyhow::anyhow!("disk gone")).is_validation());
    }

    #[test]
    fn test_messages() {
        let err = StoreError::ToolMismatch {
            expected: "cell-mosaic".into(),
            found: "particle-swarm".into(),
        };
        assert_eq!(
            err.to_string(),
            "Data belongs to tool 'particle-swarm', expected 'cell-mosaic'"
        );
        let err = StoreError::QuotaExceeded {
            needed: 120,
            limit: 100,
        };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded: 120 bytes needed, limit is 100"
        );
    }
}
