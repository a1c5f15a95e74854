//! Coin ledger: per-player account records, leveling arithmetic and the
//! sled-backed store that persists them.

pub mod errors;
pub mod leveling;
pub mod snapshot;
pub mod storage;
pub mod types;

pub use errors::LedgerError;
pub use leveling::{add_experience, LevelUp, LEVEL_UP_BONUS};
pub use snapshot::{export_json, import_json, read_json, Snapshot, SnapshotAccount};
pub use storage::{LedgerStore, LedgerStoreBuilder};
pub use types::{AccountRecord, ACCOUNT_SCHEMA_VERSION, STARTING_COINS};
