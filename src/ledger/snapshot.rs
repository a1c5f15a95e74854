//! JSON snapshot import/export.
//!
//! The snapshot is a single pretty-printed UTF-8 JSON object keyed by player
//! ID, matching the flat `data.json` file older deployments of the bot wrote:
//!
//! ```json
//! {
//!   "807465587633553409": { "coins": 10000, "level": 1, "xp": 0, "lastDaily": 0 }
//! }
//! ```
//!
//! Reads take a shared `fs2` lock and writes an exclusive one so an export
//! never interleaves with another process reading the same file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use fs2::FileExt;
use log::info;
use serde::{Deserialize, Serialize};

use crate::ledger::errors::LedgerError;
use crate::ledger::storage::LedgerStore;
use crate::ledger::types::AccountRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotAccount {
    pub coins: u64,
    pub level: u32,
    pub xp: u64,
    #[serde(rename = "lastDaily")]
    pub last_daily: i64,
}

impl From<&AccountRecord> for SnapshotAccount {
    fn from(record: &AccountRecord) -> Self {
        Self {
            coins: record.coins,
            level: record.level,
            xp: record.xp,
            last_daily: record.last_daily,
        }
    }
}

impl From<SnapshotAccount> for AccountRecord {
    fn from(entry: SnapshotAccount) -> Self {
        AccountRecord {
            coins: entry.coins,
            level: entry.level.max(1),
            xp: entry.xp,
            last_daily: entry.last_daily,
            ..AccountRecord::new()
        }
    }
}

pub type Snapshot = BTreeMap<String, SnapshotAccount>;

/// Build an in-memory snapshot of every account in the ledger.
pub fn snapshot(store: &LedgerStore) -> Result<Snapshot, LedgerError> {
    Ok(store
        .accounts()?
        .iter()
        .map(|(id, record)| (id.clone(), SnapshotAccount::from(record)))
        .collect())
}

/// Write the whole ledger to `path`, replacing any previous contents.
pub fn export_json<P: AsRef<Path>>(store: &LedgerStore, path: P) -> Result<usize, LedgerError> {
    let path = path.as_ref();
    let accounts = snapshot(store)?;
    let data = serde_json::to_string_pretty(&accounts)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut f = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.lock_exclusive()?;
    f.write_all(data.as_bytes())?;
    f.flush()?;
    f.sync_all()?;
    f.unlock()?;
    info!("exported {} accounts to {}", accounts.len(), path.display());
    Ok(accounts.len())
}

/// Read a snapshot file. A missing file is an empty snapshot; malformed JSON is an error.
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Snapshot, LedgerError> {
    let path = path.as_ref();
    let mut f = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Snapshot::new()),
        Err(e) => return Err(e.into()),
    };
    f.lock_shared()?;
    let mut s = String::new();
    let read = f.read_to_string(&mut s);
    let _ = f.unlock();
    read?;
    if s.trim().is_empty() {
        return Ok(Snapshot::new());
    }
    Ok(serde_json::from_str(&s)?)
}

/// Merge every account in the snapshot at `path` into the ledger, overwriting
/// existing records with the same player ID. Returns the number imported.
pub fn import_json<P: AsRef<Path>>(store: &LedgerStore, path: P) -> Result<usize, LedgerError> {
    let path = path.as_ref();
    let accounts = read_json(path)?;
    for (player_id, entry) in &accounts {
        store.put(player_id, &AccountRecord::from(entry.clone()))?;
    }
    store.persist()?;
    info!("imported {} accounts from {}", accounts.len(), path.display());
    Ok(accounts.len())
}
