use tokio::time::Instant;
use uuid::Uuid;

use super::rules::{CarveRules, Intensity, MAX_INTEGRITY, MAX_PROGRESS};
use super::shapes::Shape;

/// # Dalgona Session
///
/// One playthrough of the minigame, owned by the player who started it.
///
/// ## States
///
/// 1. **ShapeSelection** - waiting for the owner to pick a cookie
/// 2. **Carving** - accepting intensity presses until progress fills or integrity runs out
/// 3. **Completed** / **Broken** / **TimedOut** - terminal, every further input is ignored
///
/// Sessions are never persisted; the bot drops them once they reach a terminal state.
///
/// ## Usage
///
/// ```rust
/// use dalgona::game::{CarveRules, DalgonaSession, Intensity, Shape, Transition};
/// use tokio::time::Instant;
///
/// let now = Instant::now();
/// let mut session = DalgonaSession::new("alice", CarveRules::classic());
/// session.select_shape("alice", Shape::Triangle, now);
/// session.carve("alice", Intensity::Heavy, now);
/// session.carve("alice", Intensity::Heavy, now);
/// let last = session.carve("alice", Intensity::Heavy, now);
/// assert_eq!(last, Transition::Completed { shape: Shape::Triangle });
/// ```
#[derive(Debug, Clone)]
pub struct DalgonaSession {
    id: Uuid,
    owner: String,
    rules: CarveRules,
    state: SessionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    ShapeSelection,
    Carving {
        shape: Shape,
        integrity: u8,
        progress: u8,
        deadline: Option<Instant>,
    },
    Completed {
        shape: Shape,
    },
    Broken {
        shape: Shape,
        progress: u8,
    },
    TimedOut {
        shape: Shape,
        progress: u8,
        integrity: u8,
    },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed { .. }
                | SessionState::Broken { .. }
                | SessionState::TimedOut { .. }
        )
    }
}

/// Result of feeding one input into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Input from another player, out of phase, or after a terminal state.
    Ignored,
    Started {
        shape: Shape,
        deadline: Option<Instant>,
    },
    Carved {
        progress: u8,
        integrity: u8,
    },
    Completed {
        shape: Shape,
    },
    Broken {
        shape: Shape,
    },
    TimedOut {
        shape: Shape,
    },
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Transition::Completed { .. } | Transition::Broken { .. } | Transition::TimedOut { .. }
        )
    }
}

impl DalgonaSession {
    /// Start a session that lets the owner choose a shape.
    pub fn new(owner: impl Into<String>, rules: CarveRules) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            rules,
            state: SessionState::ShapeSelection,
        }
    }

    /// Start a campaign session whose shape follows the player's level.
    ///
    /// Returns `None` when the level is past the end of the catalog.
    pub fn for_level(
        owner: impl Into<String>,
        level: u32,
        rules: CarveRules,
        now: Instant,
    ) -> Option<Self> {
        let shape = Shape::for_level(level)?;
        let mut session = Self::new(owner, rules);
        session.enter_carving(shape, now);
        Some(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn rules(&self) -> &CarveRules {
        &self.rules
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn shape(&self) -> Option<Shape> {
        match self.state {
            SessionState::ShapeSelection => None,
            SessionState::Carving { shape, .. }
            | SessionState::Completed { shape }
            | SessionState::Broken { shape, .. }
            | SessionState::TimedOut { shape, .. } => Some(shape),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SessionState::Carving { deadline, .. } => deadline,
            _ => None,
        }
    }

    fn enter_carving(&mut self, shape: Shape, now: Instant) -> Option<Instant> {
        let deadline = self.rules.time_limit(shape).map(|limit| now + limit);
        self.state = SessionState::Carving {
            shape,
            integrity: MAX_INTEGRITY,
            progress: 0,
            deadline,
        };
        deadline
    }

    /// Pick the cookie. Only the owner may choose, and only once.
    pub fn select_shape(&mut self, player: &str, shape: Shape, now: Instant) -> Transition {
        if player != self.owner || self.state != SessionState::ShapeSelection {
            return Transition::Ignored;
        }
        let deadline = self.enter_carving(shape, now);
        Transition::Started { shape, deadline }
    }

    /// Apply one carve. Completion is checked before breakage, so a press that
    /// fills progress and empties integrity at once still completes the cookie.
    pub fn carve(&mut self, player: &str, intensity: Intensity, now: Instant) -> Transition {
        if player != self.owner {
            return Transition::Ignored;
        }
        let SessionState::Carving {
            shape,
            integrity,
            progress,
            deadline,
        } = self.state
        else {
            return Transition::Ignored;
        };
        if deadline.is_some_and(|d| now >= d) {
            self.state = SessionState::TimedOut {
                shape,
                progress,
                integrity,
            };
            return Transition::TimedOut { shape };
        }

        let (progress, integrity) = self.rules.apply(intensity, progress, integrity);
        if progress >= MAX_PROGRESS {
            self.state = SessionState::Completed { shape };
            Transition::Completed { shape }
        } else if integrity == 0 {
            self.state = SessionState::Broken { shape, progress };
            Transition::Broken { shape }
        } else {
            self.state = SessionState::Carving {
                shape,
                integrity,
                progress,
                deadline,
            };
            Transition::Carved {
                progress,
                integrity,
            }
        }
    }

    /// Time out a carving session whose deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Transition {
        match self.state {
            SessionState::Carving {
                shape,
                integrity,
                progress,
                deadline: Some(deadline),
            } if now >= deadline => {
                self.state = SessionState::TimedOut {
                    shape,
                    progress,
                    integrity,
                };
                Transition::TimedOut { shape }
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn carving(rules: CarveRules, shape: Shape) -> (DalgonaSession, Instant) {
        let now = Instant::now();
        let mut session = DalgonaSession::new("p1", rules);
        session.select_shape("p1", shape, now);
        (session, now)
    }

    #[test]
    fn starts_in_shape_selection() {
        let session = DalgonaSession::new("p1", CarveRules::classic());
        assert_eq!(session.state(), &SessionState::ShapeSelection);
        assert_eq!(session.shape(), None);
        assert!(!session.is_terminal());
    }

    #[test]
    fn carving_before_selection_is_ignored() {
        let mut session = DalgonaSession::new("p1", CarveRules::classic());
        let t = session.carve("p1", Intensity::Light, Instant::now());
        assert_eq!(t, Transition::Ignored);
        assert_eq!(session.state(), &SessionState::ShapeSelection);
    }

    #[test]
    fn other_players_cannot_drive_the_session() {
        let (mut session, now) = carving(CarveRules::classic(), Shape::Circle);
        assert_eq!(session.carve("p2", Intensity::Heavy, now), Transition::Ignored);
        assert_eq!(
            session.select_shape("p2", Shape::Star, now),
            Transition::Ignored
        );
        assert_eq!(session.shape(), Some(Shape::Circle));
    }

    #[test]
    fn selection_happens_once() {
        let (mut session, now) = carving(CarveRules::classic(), Shape::Circle);
        assert_eq!(
            session.select_shape("p1", Shape::Umbrella, now),
            Transition::Ignored
        );
        assert_eq!(session.shape(), Some(Shape::Circle));
    }

    #[test]
    fn ten_light_carves_complete_the_cookie() {
        let (mut session, now) = carving(CarveRules::classic(), Shape::Star);
        for _ in 0..9 {
            assert!(matches!(
                session.carve("p1", Intensity::Light, now),
                Transition::Carved { .. }
            ));
        }
        assert_eq!(
            session.carve("p1", Intensity::Light, now),
            Transition::Completed { shape: Shape::Star }
        );
    }

    #[test]
    fn heavy_halving_rounds_down() {
        let (mut session, now) = carving(CarveRules::timed(), Shape::Umbrella);
        assert_eq!(
            session.carve("p1", Intensity::Heavy, now),
            Transition::Carved {
                progress: 4,
                integrity: 50
            }
        );
        assert_eq!(
            session.carve("p1", Intensity::Heavy, now),
            Transition::Carved {
                progress: 8,
                integrity: 25
            }
        );
        assert_eq!(
            session.carve("p1", Intensity::Light, now),
            Transition::Carved {
                progress: 9,
                integrity: 23
            }
        );
        assert_eq!(
            session.carve("p1", Intensity::Heavy, now),
            Transition::Completed {
                shape: Shape::Umbrella
            }
        );
    }

    #[test]
    fn broken_when_integrity_hits_zero_first() {
        let rules = CarveRules {
            medium_integrity_loss: 60,
            ..CarveRules::classic()
        };
        let (mut session, now) = carving(rules, Shape::Triangle);
        assert!(matches!(
            session.carve("p1", Intensity::Medium, now),
            Transition::Carved { .. }
        ));
        assert_eq!(
            session.carve("p1", Intensity::Medium, now),
            Transition::Broken { shape: Shape::Triangle }
        );
        assert_eq!(session.carve("p1", Intensity::Light, now), Transition::Ignored);
    }

    #[test]
    fn completion_wins_over_breakage_on_the_same_press() {
        let rules = CarveRules {
            medium_integrity_loss: 100,
            ..CarveRules::classic()
        };
        let (mut session, now) = carving(rules, Shape::Triangle);
        for _ in 0..8 {
            session.carve("p1", Intensity::Light, now);
        }
        // Progress 8, integrity 84: the medium press reaches 10 and 0 together.
        assert_eq!(
            session.carve("p1", Intensity::Medium, now),
            Transition::Completed {
                shape: Shape::Triangle
            }
        );
    }

    #[test]
    fn carve_after_deadline_times_out() {
        let (mut session, now) = carving(CarveRules::timed(), Shape::Star);
        let deadline = session.deadline().expect("timed rules set a deadline");
        assert_eq!(deadline, now + Duration::from_secs(5));
        assert_eq!(
            session.carve("p1", Intensity::Light, deadline),
            Transition::TimedOut { shape: Shape::Star }
        );
        assert!(session.is_terminal());
    }

    #[test]
    fn expire_respects_the_deadline() {
        let (mut session, now) = carving(CarveRules::timed(), Shape::Umbrella);
        assert_eq!(
            session.expire(now + Duration::from_secs(2)),
            Transition::Ignored
        );
        assert_eq!(
            session.expire(now + Duration::from_secs(3)),
            Transition::TimedOut {
                shape: Shape::Umbrella
            }
        );
        assert_eq!(
            session.expire(now + Duration::from_secs(4)),
            Transition::Ignored
        );
    }

    #[test]
    fn untimed_sessions_never_expire() {
        let (mut session, now) = carving(CarveRules::classic(), Shape::Umbrella);
        assert_eq!(session.deadline(), None);
        assert_eq!(
            session.expire(now + Duration::from_secs(3600)),
            Transition::Ignored
        );
    }

    #[test]
    fn campaign_sessions_skip_selection() {
        let now = Instant::now();
        let session = DalgonaSession::for_level("p1", 3, CarveRules::classic(), now).unwrap();
        assert_eq!(session.shape(), Some(Shape::Star));
        assert!(DalgonaSession::for_level("p1", 5, CarveRules::classic(), now).is_none());
    }
}
