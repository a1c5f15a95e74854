//! Experience and level-up arithmetic.
//!
//! A record levels up when its experience reaches `level * 100`. Only one
//! level-up is evaluated per call: overshooting several thresholds still
//! advances a single level, and the surplus experience is discarded.

use super::types::AccountRecord;

/// Flat coin bonus paid on every level-up, independent of the new level.
pub const LEVEL_UP_BONUS: u64 = 5_000;

/// Outcome of a single [`add_experience`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUp {
    None,
    Reached { level: u32, bonus: u64 },
}

impl LevelUp {
    pub fn happened(&self) -> bool {
        matches!(self, LevelUp::Reached { .. })
    }
}

/// Add `amount` experience to `record`, applying at most one level-up.
pub fn add_experience(record: &mut AccountRecord, amount: u64) -> LevelUp {
    record.xp = record.xp.saturating_add(amount);
    if record.xp < record.xp_to_next_level() {
        return LevelUp::None;
    }
    record.level = record.level.saturating_add(1);
    record.xp = 0;
    record.coins = record.coins.saturating_add(LEVEL_UP_BONUS);
    LevelUp::Reached {
        level: record.level,
        bonus: LEVEL_UP_BONUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_only_accumulates() {
        let mut record = AccountRecord::new();
        assert_eq!(add_experience(&mut record, 50), LevelUp::None);
        assert_eq!(record.xp, 50);
        assert_eq!(record.level, 1);
        assert_eq!(record.coins, 10_000);
    }

    #[test]
    fn reaching_threshold_levels_up_and_pays_bonus() {
        let mut record = AccountRecord::new();
        record.xp = 50;
        let outcome = add_experience(&mut record, 50);
        assert_eq!(outcome, LevelUp::Reached { level: 2, bonus: 5_000 });
        assert_eq!(record.xp, 0);
        assert_eq!(record.coins, 15_000);
    }

    #[test]
    fn overshoot_yields_one_level_and_drops_remainder() {
        let mut record = AccountRecord::new();
        let outcome = add_experience(&mut record, 1_000);
        assert!(outcome.happened());
        assert_eq!(record.level, 2);
        assert_eq!(record.xp, 0);
        assert_eq!(record.coins, 15_000);
    }
}
