//! Carving rules.
//!
//! Two rule sets have been played on live servers and neither is treated as
//! canonical:
//!
//! | intensity | progress | classic integrity | timed integrity |
//! |-----------|----------|-------------------|-----------------|
//! | light     | +1       | −2                | −2              |
//! | medium    | +2       | −5                | −7              |
//! | heavy     | +4       | −10               | halved          |
//!
//! The timed set additionally bounds the carving phase by the shape's time limit.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::shapes::Shape;

pub const MAX_PROGRESS: u8 = 10;
pub const MAX_INTEGRITY: u8 = 100;

const LIGHT_PROGRESS: u8 = 1;
const LIGHT_INTEGRITY_LOSS: u8 = 2;
const MEDIUM_PROGRESS: u8 = 2;
const HEAVY_PROGRESS: u8 = 4;
const HEAVY_FIXED_LOSS: u8 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Medium,
    Heavy,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Light, Intensity::Medium, Intensity::Heavy];

    /// Button identifier used in interactive replies.
    pub fn button_id(&self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Medium => "medium",
            Intensity::Heavy => "heavy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intensity::Light => "🟢 Light",
            Intensity::Medium => "🔵 Medium",
            Intensity::Heavy => "🔴 Heavy",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.button_id())
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Intensity::Light),
            "medium" => Ok(Intensity::Medium),
            "heavy" => Ok(Intensity::Heavy),
            other => Err(format!("unknown intensity: {}", other)),
        }
    }
}

/// How a heavy carve damages the cookie.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeavyMode {
    /// Subtract a flat 10 integrity.
    Fixed,
    /// Halve the current integrity (rounding down).
    Halve,
}

/// Named rule presets selectable from config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    #[default]
    Classic,
    Timed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveRules {
    pub medium_integrity_loss: u8,
    pub heavy: HeavyMode,
    pub timed: bool,
}

impl CarveRules {
    pub fn classic() -> Self {
        Self {
            medium_integrity_loss: 5,
            heavy: HeavyMode::Fixed,
            timed: false,
        }
    }

    pub fn timed() -> Self {
        Self {
            medium_integrity_loss: 7,
            heavy: HeavyMode::Halve,
            timed: true,
        }
    }

    pub fn preset(set: RuleSet) -> Self {
        match set {
            RuleSet::Classic => Self::classic(),
            RuleSet::Timed => Self::timed(),
        }
    }

    /// Carving window for `shape`, if these rules are time limited.
    pub fn time_limit(&self, shape: Shape) -> Option<Duration> {
        self.timed.then(|| shape.time_limit())
    }

    /// Apply one carve: returns the new `(progress, integrity)`, clamped to their bounds.
    pub fn apply(&self, intensity: Intensity, progress: u8, integrity: u8) -> (u8, u8) {
        let (gain, integrity) = match intensity {
            Intensity::Light => (LIGHT_PROGRESS, integrity.saturating_sub(LIGHT_INTEGRITY_LOSS)),
            Intensity::Medium => (
                MEDIUM_PROGRESS,
                integrity.saturating_sub(self.medium_integrity_loss),
            ),
            Intensity::Heavy => match self.heavy {
                HeavyMode::Fixed => (HEAVY_PROGRESS, integrity.saturating_sub(HEAVY_FIXED_LOSS)),
                HeavyMode::Halve => (HEAVY_PROGRESS, integrity / 2),
            },
        };
        (progress.saturating_add(gain).min(MAX_PROGRESS), integrity)
    }
}

impl Default for CarveRules {
    fn default() -> Self {
        Self::classic()
    }
}
