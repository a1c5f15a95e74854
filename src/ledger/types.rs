use serde::{Deserialize, Serialize};

pub const ACCOUNT_SCHEMA_VERSION: u8 = 1;

/// Coin balance granted the first time a player is referenced.
pub const STARTING_COINS: u64 = 10_000;

/// Per-player currency, level, experience and daily-claim state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub coins: u64,
    pub level: u32,
    pub xp: u64,
    /// Milliseconds since the Unix epoch of the last successful daily claim; 0 = never.
    pub last_daily: i64,
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
}

fn default_schema_version() -> u8 {
    ACCOUNT_SCHEMA_VERSION
}

impl AccountRecord {
    pub fn new() -> Self {
        Self {
            coins: STARTING_COINS,
            level: 1,
            xp: 0,
            last_daily: 0,
            schema_version: ACCOUNT_SCHEMA_VERSION,
        }
    }

    /// Experience required to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        u64::from(self.level) * 100
    }

    pub fn has_claimed_daily(&self) -> bool {
        self.last_daily != 0
    }
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self::new()
    }
}
