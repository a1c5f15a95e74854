//! The fixed cookie catalog.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Shape {
    Triangle,
    Circle,
    Star,
    Umbrella,
}

/// Catalog order doubles as the campaign order (level 1 carves a triangle).
pub const CATALOG: [Shape; 4] = [Shape::Triangle, Shape::Circle, Shape::Star, Shape::Umbrella];

impl Shape {
    /// Position in [`CATALOG`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Triangle => "Triangle",
            Shape::Circle => "Circle",
            Shape::Star => "Star",
            Shape::Umbrella => "Umbrella",
        }
    }

    /// Coins paid for a completed carve.
    pub fn reward(&self) -> u64 {
        match self {
            Shape::Triangle => 10_000,
            Shape::Circle => 25_000,
            Shape::Star => 40_000,
            Shape::Umbrella => 75_000,
        }
    }

    /// Carving window under time-limited rules. Harder shapes get less time.
    pub fn time_limit(&self) -> Duration {
        let secs = match self {
            Shape::Triangle => 10,
            Shape::Circle => 7,
            Shape::Star => 5,
            Shape::Umbrella => 3,
        };
        Duration::from_secs(secs)
    }

    /// Shape for a campaign level (1-based). `None` once every cookie has been carved.
    pub fn for_level(level: u32) -> Option<Shape> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        CATALOG.get(index).copied()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .copied()
            .find(|shape| shape.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown shape: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_levels_map_onto_catalog() {
        assert_eq!(Shape::for_level(0), None);
        assert_eq!(Shape::for_level(1), Some(Shape::Triangle));
        assert_eq!(Shape::for_level(4), Some(Shape::Umbrella));
        assert_eq!(Shape::for_level(5), None);
    }

    #[test]
    fn index_matches_catalog_position() {
        for (i, shape) in CATALOG.iter().enumerate() {
            assert_eq!(shape.index(), i);
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("star".parse::<Shape>(), Ok(Shape::Star));
        assert_eq!("UMBRELLA".parse::<Shape>(), Ok(Shape::Umbrella));
        assert!("hexagon".parse::<Shape>().is_err());
    }

    #[test]
    fn time_limits_stay_within_three_to_ten_seconds() {
        for shape in CATALOG {
            let secs = shape.time_limit().as_secs();
            assert!((3..=10).contains(&secs), "{} has {}s", shape, secs);
        }
    }
}
