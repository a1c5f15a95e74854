use std::path::{Path, PathBuf};

use log::{debug, info};
use sled::IVec;

use crate::ledger::errors::LedgerError;
use crate::ledger::types::{AccountRecord, ACCOUNT_SCHEMA_VERSION};
use crate::validation::validate_player_id;

const TREE_ACCOUNTS: &str = "ledger_accounts";
const ACCOUNT_PREFIX: &str = "accounts:";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct LedgerStoreBuilder {
    path: PathBuf,
    temporary: bool,
}

impl LedgerStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    /// Delete the database when the last handle is dropped.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn open(self) -> Result<LedgerStore, LedgerError> {
        LedgerStore::open_with_options(self.path, self.temporary)
    }
}

/// Sled-backed coin ledger keyed by player identity.
///
/// Every mutation is an atomic read-modify-write of a single account, so two
/// handlers touching different (or the same) players never overwrite each
/// other's changes.
#[derive(Clone)]
pub struct LedgerStore {
    db: sled::Db,
    accounts: sled::Tree,
}

impl LedgerStore {
    /// Open (or create) the ledger rooted at `path`. A missing directory yields an empty ledger.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        Self::open_with_options(path, false)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, temporary: bool) -> Result<Self, LedgerError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::Config::new()
            .path(path_ref)
            .temporary(temporary)
            .open()?;
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        info!(
            "ledger opened at {} ({} accounts)",
            path_ref.display(),
            accounts.len()
        );
        Ok(Self { db, accounts })
    }

    fn account_key(player_id: &str) -> Vec<u8> {
        format!("{}{}", ACCOUNT_PREFIX, player_id).into_bytes()
    }

    fn check_id(player_id: &str) -> Result<(), LedgerError> {
        validate_player_id(player_id)
            .map_err(|_| LedgerError::InvalidPlayerId(player_id.to_string()))
    }

    fn encode(record: &AccountRecord) -> Result<Vec<u8>, LedgerError> {
        let mut record = record.clone();
        record.schema_version = ACCOUNT_SCHEMA_VERSION;
        Ok(bincode::serialize(&record)?)
    }

    fn decode(bytes: &[u8]) -> Result<AccountRecord, LedgerError> {
        let record: AccountRecord = bincode::deserialize(bytes)?;
        if record.schema_version != ACCOUNT_SCHEMA_VERSION {
            return Err(LedgerError::SchemaMismatch {
                entity: "account",
                expected: ACCOUNT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch an account without creating it.
    pub fn get(&self, player_id: &str) -> Result<Option<AccountRecord>, LedgerError> {
        Self::check_id(player_id)?;
        match self.accounts.get(Self::account_key(player_id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Return the player's account, inserting a default record on first reference.
    ///
    /// The insert is not flushed; call [`LedgerStore::persist`] after the command completes.
    pub fn get_or_create(&self, player_id: &str) -> Result<AccountRecord, LedgerError> {
        if let Some(record) = self.get(player_id)? {
            return Ok(record);
        }
        let record = AccountRecord::new();
        let bytes = Self::encode(&record)?;
        let key = Self::account_key(player_id);
        match self
            .accounts
            .compare_and_swap(key, None::<&[u8]>, Some(bytes))?
        {
            Ok(()) => {
                debug!("ledger: created account for {}", player_id);
                Ok(record)
            }
            // Lost the race to another writer; theirs is the account now.
            Err(conflict) => match conflict.current {
                Some(bytes) => Self::decode(&bytes),
                None => Ok(record),
            },
        }
    }

    /// Atomically mutate one account, creating it with defaults if absent.
    ///
    /// `mutate` may run more than once when another writer races on the same key,
    /// so it must only depend on the record it is handed.
    pub fn update<F>(&self, player_id: &str, mut mutate: F) -> Result<AccountRecord, LedgerError>
    where
        F: FnMut(&mut AccountRecord),
    {
        Self::check_id(player_id)?;
        let key = Self::account_key(player_id);
        let mut failure: Option<LedgerError> = None;
        let updated = self.accounts.update_and_fetch(&key, |current| {
            failure = None;
            let mut record = match current {
                Some(bytes) => match Self::decode(bytes) {
                    Ok(record) => record,
                    Err(e) => {
                        failure = Some(e);
                        return current.map(IVec::from);
                    }
                },
                None => AccountRecord::new(),
            };
            mutate(&mut record);
            match Self::encode(&record) {
                Ok(bytes) => Some(IVec::from(bytes)),
                Err(e) => {
                    failure = Some(e);
                    current.map(IVec::from)
                }
            }
        })?;
        if let Some(e) = failure {
            return Err(e);
        }
        match updated {
            Some(bytes) => Self::decode(&bytes),
            None => Ok(AccountRecord::new()),
        }
    }

    /// Insert or replace an account wholesale (snapshot import).
    pub fn put(&self, player_id: &str, record: &AccountRecord) -> Result<(), LedgerError> {
        Self::check_id(player_id)?;
        self.accounts
            .insert(Self::account_key(player_id), Self::encode(record)?)?;
        Ok(())
    }

    /// Flush all pending writes to durable storage.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let bytes = self.db.flush()?;
        debug!("ledger: flushed {} bytes", bytes);
        Ok(())
    }

    /// All accounts in key order.
    pub fn accounts(&self) -> Result<Vec<(String, AccountRecord)>, LedgerError> {
        let mut out = Vec::new();
        for entry in self.accounts.scan_prefix(ACCOUNT_PREFIX.as_bytes()) {
            let (key, value) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(player_id) = text.strip_prefix(ACCOUNT_PREFIX) {
                out.push((player_id.to_string(), Self::decode(&value)?));
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn get_or_create_inserts_defaults_once() {
        let tmp = tempdir().unwrap();
        let store = LedgerStore::open(tmp.path()).unwrap();
        assert!(store.is_empty());

        let created = store.get_or_create("alice").unwrap();
        assert_eq!(created, AccountRecord::new());
        assert_eq!(store.len(), 1);

        store.update("alice", |r| r.coins += 1).unwrap();
        let again = store.get_or_create("alice").unwrap();
        assert_eq!(again.coins, 10_001);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_creates_missing_accounts() {
        let tmp = tempdir().unwrap();
        let store = LedgerStore::open(tmp.path()).unwrap();
        let record = store.update("bob", |r| r.xp = 42).unwrap();
        assert_eq!(record.xp, 42);
        assert_eq!(record.coins, 10_000);
        assert_eq!(store.get("bob").unwrap(), Some(record));
    }

    #[test]
    fn rejects_invalid_player_ids() {
        let tmp = tempdir().unwrap();
        let store = LedgerStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.get_or_create(""),
            Err(LedgerError::InvalidPlayerId(_))
        ));
    }
}
