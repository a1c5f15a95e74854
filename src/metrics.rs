//! Minimal in-process counters for game sessions and daily claims.
//! Logged when the bot loop stops; there is no exposition endpoint.
use std::sync::atomic::{AtomicU64, Ordering};

use crate::game::{Shape, Transition, CATALOG};

static SESSIONS_STARTED: AtomicU64 = AtomicU64::new(0);
static SESSIONS_ABANDONED: AtomicU64 = AtomicU64::new(0);
static DAILY_GRANTED: AtomicU64 = AtomicU64::new(0);
static DAILY_REJECTED: AtomicU64 = AtomicU64::new(0);

/// Carving counts for one shape. Totals across shapes are derived from these.
struct ShapeTally {
    carving: AtomicU64,
    completed: AtomicU64,
    broken: AtomicU64,
    timed_out: AtomicU64,
}

impl ShapeTally {
    const fn new() -> Self {
        Self {
            carving: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            broken: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
        }
    }

    fn load(&self) -> ShapeStats {
        ShapeStats {
            carving: self.carving.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            broken: self.broken.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

// Indexed by `Shape::index`.
static SHAPES: [ShapeTally; CATALOG.len()] = [
    ShapeTally::new(),
    ShapeTally::new(),
    ShapeTally::new(),
    ShapeTally::new(),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShapeStats {
    /// Games that reached the carving phase with this shape.
    pub carving: u64,
    pub completed: u64,
    pub broken: u64,
    pub timed_out: u64,
}

pub fn inc_sessions_started() {
    SESSIONS_STARTED.fetch_add(1, Ordering::Relaxed);
}

/// A player replaced an unfinished game with a new one.
pub fn inc_sessions_abandoned() {
    SESSIONS_ABANDONED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_daily_granted() {
    DAILY_GRANTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_daily_rejected() {
    DAILY_REJECTED.fetch_add(1, Ordering::Relaxed);
}

/// A game entered the carving phase with `shape`.
pub fn record_carving_started(shape: Shape) {
    SHAPES[shape.index()].carving.fetch_add(1, Ordering::Relaxed);
}

/// Count a terminal transition against its shape. Non-terminal transitions are ignored.
pub fn record_outcome(transition: &Transition) {
    let counter = match *transition {
        Transition::Completed { shape } => &SHAPES[shape.index()].completed,
        Transition::Broken { shape } => &SHAPES[shape.index()].broken,
        Transition::TimedOut { shape } => &SHAPES[shape.index()].timed_out,
        _ => return,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

pub fn shape_stats(shape: Shape) -> ShapeStats {
    SHAPES[shape.index()].load()
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub sessions_started: u64,
    pub sessions_abandoned: u64,
    pub sessions_completed: u64,
    pub sessions_broken: u64,
    pub sessions_timed_out: u64,
    pub daily_granted: u64,
    pub daily_rejected: u64,
}

pub fn snapshot() -> Snapshot {
    let mut snap = Snapshot {
        sessions_started: SESSIONS_STARTED.load(Ordering::Relaxed),
        sessions_abandoned: SESSIONS_ABANDONED.load(Ordering::Relaxed),
        daily_granted: DAILY_GRANTED.load(Ordering::Relaxed),
        daily_rejected: DAILY_REJECTED.load(Ordering::Relaxed),
        ..Snapshot::default()
    };
    for tally in &SHAPES {
        let stats = tally.load();
        snap.sessions_completed += stats.completed;
        snap.sessions_broken += stats.broken;
        snap.sessions_timed_out += stats.timed_out;
    }
    snap
}
