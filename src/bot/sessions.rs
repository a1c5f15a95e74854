//! Live game sessions and their deadline timers.
//!
//! Each timed session owns a [`DeadlineTimer`]: a tokio task that sleeps until
//! the session's deadline and then posts [`InboundEvent::Deadline`] back into
//! the bot's event loop. The timer is aborted when its session is removed, so
//! a session that finished early never receives a stale timeout.

use std::collections::HashMap;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::server::InboundEvent;
use crate::game::DalgonaSession;
use crate::metrics;

pub struct DeadlineTimer(JoinHandle<()>);

impl DeadlineTimer {
    fn arm(session: Uuid, deadline: Instant, tx: mpsc::UnboundedSender<InboundEvent>) -> Self {
        DeadlineTimer(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(InboundEvent::Deadline { session });
        }))
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct ActiveSession {
    session: DalgonaSession,
    timer: Option<DeadlineTimer>,
}

#[derive(Default)]
pub struct SessionTable {
    active: HashMap<Uuid, ActiveSession>,
    by_player: HashMap<String, Uuid>,
    deadline_tx: Option<mpsc::UnboundedSender<InboundEvent>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route deadline events into `tx`. Without a sink, deadlines are only
    /// enforced when the owner next presses a button.
    pub fn set_deadline_sink(&mut self, tx: mpsc::UnboundedSender<InboundEvent>) {
        self.deadline_tx = Some(tx);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn live_session_for(&self, player: &str) -> Option<Uuid> {
        self.by_player.get(player).copied()
    }

    pub fn get(&self, id: &Uuid) -> Option<&DalgonaSession> {
        self.active.get(id).map(|a| &a.session)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut DalgonaSession> {
        self.active.get_mut(id).map(|a| &mut a.session)
    }

    /// Track a new session, arming its timer if it is already carving against a deadline.
    pub fn insert(&mut self, session: DalgonaSession) -> Uuid {
        let id = session.id();
        self.by_player.insert(session.owner().to_string(), id);
        let deadline = session.deadline();
        if let Some(shape) = session.shape() {
            metrics::record_carving_started(shape);
        }
        self.active.insert(
            id,
            ActiveSession {
                session,
                timer: None,
            },
        );
        if let Some(deadline) = deadline {
            self.arm(id, deadline);
        }
        id
    }

    /// Called once a chosen shape puts the session into carving.
    pub fn on_carving_started(&mut self, id: &Uuid) {
        let Some(active) = self.active.get(id) else {
            return;
        };
        if let Some(shape) = active.session.shape() {
            metrics::record_carving_started(shape);
        }
        if let Some(deadline) = active.session.deadline() {
            self.arm(*id, deadline);
        }
    }

    fn arm(&mut self, id: Uuid, deadline: Instant) {
        let Some(tx) = self.deadline_tx.clone() else {
            return;
        };
        if let Some(active) = self.active.get_mut(&id) {
            debug!("arming deadline for session {}", id);
            active.timer = Some(DeadlineTimer::arm(id, deadline, tx));
        }
    }

    /// Drop a session and cancel its timer.
    pub fn remove(&mut self, id: &Uuid) -> Option<DalgonaSession> {
        let active = self.active.remove(id)?;
        let owner = active.session.owner();
        if self.by_player.get(owner) == Some(id) {
            self.by_player.remove(owner);
        }
        // Dropping `active.timer` aborts the pending deadline task.
        Some(active.session)
    }
}
