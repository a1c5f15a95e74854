use thiserror::Error;

/// Errors that can arise while interacting with the coin ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, snapshot files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unwritable JSON snapshot.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Player identifiers must be non-empty and free of control characters.
    #[error("invalid player id: {0:?}")]
    InvalidPlayerId(String),
}
