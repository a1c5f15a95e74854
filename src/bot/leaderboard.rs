//! Ranked view over the ledger.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};

use crate::ledger::{AccountRecord, LedgerError, LedgerStore};

/// Resolves a player ID to the name shown on the leaderboard.
///
/// Chat adapters back this with the platform's user lookup; the console uses
/// the ID itself.
pub trait IdentityLookup: Send + Sync {
    fn display_name(&self, player_id: &str) -> Result<String>;
}

/// Shows player IDs verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawIdLookup;

impl IdentityLookup for RawIdLookup {
    fn display_name(&self, player_id: &str) -> Result<String> {
        Ok(player_id.to_string())
    }
}

/// Fixed ID → name table; unknown IDs fail the lookup.
#[derive(Debug, Default, Clone)]
pub struct DirectoryLookup {
    names: HashMap<String, String>,
}

impl DirectoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, player_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(player_id.into(), name.into());
        self
    }
}

impl IdentityLookup for DirectoryLookup {
    fn display_name(&self, player_id: &str) -> Result<String> {
        self.names
            .get(player_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown player {}", player_id))
    }
}

/// Top `n` accounts by coins, richest first. Equal balances are ordered by player ID.
pub fn top_n(store: &LedgerStore, n: usize) -> Result<Vec<(String, AccountRecord)>, LedgerError> {
    let mut accounts = store.accounts()?;
    accounts.sort_by(|(a_id, a), (b_id, b)| b.coins.cmp(&a.coins).then_with(|| a_id.cmp(b_id)));
    accounts.truncate(n);
    Ok(accounts)
}

/// Render the ranked entries. A single failed name lookup fails the whole board.
pub fn render(entries: &[(String, AccountRecord)], lookup: &dyn IdentityLookup) -> Result<String> {
    let mut text = String::from("🏆 Leaderboard\n\n");
    if entries.is_empty() {
        text.push_str("No players yet.\n");
        return Ok(text);
    }
    for (rank, (player_id, record)) in entries.iter().enumerate() {
        let name = lookup
            .display_name(player_id)
            .with_context(|| format!("resolving leaderboard entry {}", rank + 1))?;
        text.push_str(&format!("{}. {} — {} coins\n", rank + 1, name, record.coins));
    }
    Ok(text)
}
