//! Daily reward claim.

use crate::ledger::AccountRecord;

/// Minimum gap between two successful claims: 24 hours in milliseconds.
pub const DAILY_COOLDOWN_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyOutcome {
    Granted { reward: u64, balance: u64 },
    AlreadyClaimed { remaining_ms: i64 },
}

/// Grant `reward` coins if the cooldown since the last claim has elapsed.
///
/// A rejected claim leaves the record untouched.
pub fn claim_daily(record: &mut AccountRecord, now_ms: i64, reward: u64) -> DailyOutcome {
    let elapsed = now_ms.saturating_sub(record.last_daily);
    if elapsed < DAILY_COOLDOWN_MS {
        return DailyOutcome::AlreadyClaimed {
            remaining_ms: DAILY_COOLDOWN_MS - elapsed,
        };
    }
    record.last_daily = now_ms;
    record.coins = record.coins.saturating_add(reward);
    DailyOutcome::Granted {
        reward,
        balance: record.coins,
    }
}

/// Render a remaining cooldown as `~Hh Mm`.
pub fn format_remaining(remaining_ms: i64) -> String {
    let minutes = remaining_ms.max(0) / 60_000;
    format!("~{}h {}m", minutes / 60, minutes % 60)
}
