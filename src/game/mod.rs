//! The Dalgona minigame: shape catalog, carving rules and the per-player
//! session state machine. Nothing here touches storage; the bot commits
//! rewards once a session completes.

pub mod rules;
pub mod session;
pub mod shapes;

pub use rules::{CarveRules, HeavyMode, Intensity, RuleSet, MAX_INTEGRITY, MAX_PROGRESS};
pub use session::{DalgonaSession, SessionState, Transition};
pub use shapes::{Shape, CATALOG};

/// Experience granted for every completed cookie.
pub const COMPLETION_XP: u64 = 50;
