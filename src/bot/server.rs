//! Bot event loop: commands, button presses and deadline expiries all flow
//! through one sequential loop, so no two events ever mutate game state at
//! the same time.

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::commands::{BotSettings, CommandContext, CommandRegistry, Response};
use super::leaderboard::IdentityLookup;
use super::reply::{
    broken_panel, carving_panel, completed_panel, timed_out_panel, OutgoingReply, Reply,
    CHOOSE_PREFIX,
};
use super::sessions::SessionTable;
use crate::config::Config;
use crate::game::{
    DalgonaSession, Intensity, SessionState, Shape, Transition, CATALOG, COMPLETION_XP,
};
use crate::ledger::{add_experience, LedgerStore, LevelUp};
use crate::metrics;

#[derive(Debug)]
pub enum InboundEvent {
    /// A slash command typed by `player`.
    Command { player: String, name: String },
    /// A button pressed by `player` on the message belonging to `session`.
    Button {
        player: String,
        session: Uuid,
        custom_id: String,
    },
    /// A session's carving deadline elapsed.
    Deadline { session: Uuid },
    /// Flush the ledger, then report the flush result and stop the loop.
    Shutdown(oneshot::Sender<Result<(), String>>),
}

/// Parsed button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Choose(Shape),
    Carve(Intensity),
}

impl ButtonAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(name) = custom_id.strip_prefix(CHOOSE_PREFIX) {
            return name.parse().ok().map(ButtonAction::Choose);
        }
        custom_id.parse().ok().map(ButtonAction::Carve)
    }
}

pub struct DalgonaBot {
    ledger: LedgerStore,
    registry: CommandRegistry,
    sessions: SessionTable,
    settings: BotSettings,
    lookup: Box<dyn IdentityLookup>,
}

impl DalgonaBot {
    pub fn new(ledger: LedgerStore, settings: BotSettings, lookup: Box<dyn IdentityLookup>) -> Self {
        Self {
            ledger,
            registry: CommandRegistry::standard(),
            sessions: SessionTable::new(),
            settings,
            lookup,
        }
    }

    pub fn from_config(config: &Config, ledger: LedgerStore, lookup: Box<dyn IdentityLookup>) -> Self {
        let settings = BotSettings {
            daily_reward: config.bot.daily_reward,
            leaderboard_size: config.bot.leaderboard_size,
            selection: config.bot.selection,
            rules: config.game.carve_rules(),
        };
        Self::new(ledger, settings, lookup)
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn session(&self, id: &Uuid) -> Option<&DalgonaSession> {
        self.sessions.get(id)
    }

    pub fn live_session_for(&self, player: &str) -> Option<Uuid> {
        self.sessions.live_session_for(player)
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn handle_event(&mut self, event: InboundEvent) -> Option<OutgoingReply> {
        match event {
            InboundEvent::Command { player, name } => Some(self.handle_command(&player, &name)),
            InboundEvent::Button {
                player,
                session,
                custom_id,
            } => self.handle_button(&player, session, &custom_id),
            InboundEvent::Deadline { session } => self.handle_deadline(session, Instant::now()),
            InboundEvent::Shutdown(done) => {
                let flushed = self.ledger.persist().map_err(|e| e.to_string());
                if let Err(e) = &flushed {
                    error!("final ledger flush failed: {}", e);
                }
                let _ = done.send(flushed);
                None
            }
        }
    }

    pub fn handle_command(&mut self, player: &str, name: &str) -> OutgoingReply {
        self.handle_command_at(player, name, Utc::now().timestamp_millis(), Instant::now())
    }

    /// Execute a command with explicit clocks.
    pub fn handle_command_at(
        &mut self,
        player: &str,
        name: &str,
        now_ms: i64,
        now: Instant,
    ) -> OutgoingReply {
        debug!("command '{}' from {}", name, player);
        let Some(handler) = self.registry.get(name) else {
            return OutgoingReply {
                player: player.to_string(),
                session: None,
                reply: Reply::Text(format!(
                    "Unknown command: {}. Try /dalgona, /balance, /daily or /leaderboard.",
                    name.trim()
                )),
            };
        };
        let mut ctx = CommandContext {
            player,
            ledger: &self.ledger,
            sessions: &mut self.sessions,
            settings: &self.settings,
            lookup: self.lookup.as_ref(),
            now_ms,
            now,
        };
        let response = match handler.execute(&mut ctx) {
            Ok(response) => response,
            Err(e) => {
                error!("command '{}' from {} failed: {:#}", handler.name(), player, e);
                Response::from(Reply::Error(format!(
                    "Something went wrong running /{}. Please try again later.",
                    handler.name()
                )))
            }
        };
        OutgoingReply {
            player: player.to_string(),
            session: response.session,
            reply: response.reply,
        }
    }

    pub fn handle_button(
        &mut self,
        player: &str,
        session: Uuid,
        custom_id: &str,
    ) -> Option<OutgoingReply> {
        self.handle_button_at(player, session, custom_id, Instant::now())
    }

    /// Apply a button press. Presses on unknown or finished sessions, presses from
    /// anyone but the owner, and unrecognized buttons produce no reply.
    pub fn handle_button_at(
        &mut self,
        player: &str,
        id: Uuid,
        custom_id: &str,
        now: Instant,
    ) -> Option<OutgoingReply> {
        let Some(action) = ButtonAction::parse(custom_id) else {
            debug!("ignoring unknown button '{}' from {}", custom_id, player);
            return None;
        };
        let session = self.sessions.get_mut(&id)?;
        let transition = match action {
            ButtonAction::Choose(shape) => session.select_shape(player, shape, now),
            ButtonAction::Carve(intensity) => session.carve(player, intensity, now),
        };
        if transition == Transition::Ignored {
            return None;
        }
        self.apply_transition(id, transition)
    }

    /// Time out `id` if it is still carving past its deadline.
    pub fn handle_deadline(&mut self, id: Uuid, now: Instant) -> Option<OutgoingReply> {
        let session = self.sessions.get_mut(&id)?;
        match session.expire(now) {
            Transition::Ignored => None,
            transition => self.apply_transition(id, transition),
        }
    }

    fn apply_transition(&mut self, id: Uuid, transition: Transition) -> Option<OutgoingReply> {
        let session = self.sessions.get(&id)?;
        let owner = session.owner().to_string();
        let reply = match transition {
            Transition::Ignored => return None,
            Transition::Started { .. } | Transition::Carved { .. } => {
                let SessionState::Carving {
                    shape,
                    integrity,
                    progress,
                    ..
                } = *session.state()
                else {
                    return None;
                };
                let limit = session.rules().time_limit(shape).map(|d| d.as_secs());
                let panel = carving_panel(&owner, shape, progress, integrity, limit);
                if matches!(transition, Transition::Started { .. }) {
                    self.sessions.on_carving_started(&id);
                }
                Reply::Panel(panel)
            }
            Transition::Completed { shape } => {
                self.finish(id, &transition);
                self.commit_reward(&owner, shape)
            }
            Transition::Broken { shape } => {
                self.finish(id, &transition);
                Reply::Panel(broken_panel(shape))
            }
            Transition::TimedOut { shape } => {
                self.finish(id, &transition);
                Reply::Panel(timed_out_panel(shape))
            }
        };
        Some(OutgoingReply {
            player: owner,
            session: Some(id),
            reply,
        })
    }

    fn finish(&mut self, id: Uuid, transition: &Transition) {
        metrics::record_outcome(transition);
        if let Some(session) = self.sessions.remove(&id) {
            info!(
                "session {} for {} ended: {:?}",
                id,
                session.owner(),
                session.state()
            );
        }
    }

    fn commit_reward(&mut self, owner: &str, shape: Shape) -> Reply {
        let mut level_up = LevelUp::None;
        let committed = self
            .ledger
            .update(owner, |record| {
                record.coins = record.coins.saturating_add(shape.reward());
                level_up = add_experience(record, COMPLETION_XP);
            })
            .and_then(|_| self.ledger.persist());
        match committed {
            Ok(()) => {
                let level = match level_up {
                    LevelUp::Reached { level, bonus } => Some((level, bonus)),
                    LevelUp::None => None,
                };
                Reply::Panel(completed_panel(shape, COMPLETION_XP, level))
            }
            Err(e) => {
                error!("failed to commit {} reward for {}: {}", shape, owner, e);
                Reply::Error("Your cookie was carved but the reward could not be saved.".to_string())
            }
        }
    }
}

/// Handle to a running bot loop.
#[derive(Clone)]
pub struct BotHandle {
    tx: mpsc::UnboundedSender<InboundEvent>,
}

impl BotHandle {
    pub fn send(&self, event: InboundEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn command(&self, player: &str, name: &str) -> bool {
        self.send(InboundEvent::Command {
            player: player.to_string(),
            name: name.to_string(),
        })
    }

    pub fn button(&self, player: &str, session: Uuid, custom_id: &str) -> bool {
        self.send(InboundEvent::Button {
            player: player.to_string(),
            session,
            custom_id: custom_id.to_string(),
        })
    }

    /// Stop the loop. Returns once the ledger has been flushed; a loop that
    /// already exited has nothing left to flush.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(InboundEvent::Shutdown(tx)).is_err() {
            return Ok(());
        }
        match rx.await {
            Ok(Ok(())) | Err(_) => Ok(()),
            Ok(Err(e)) => Err(anyhow!("final ledger flush failed: {}", e)),
        }
    }
}

/// Spawn the bot's event loop. Replies are pushed to `outgoing` in event order.
pub fn start_bot(
    mut bot: DalgonaBot,
    outgoing: mpsc::UnboundedSender<OutgoingReply>,
) -> (BotHandle, JoinHandle<Result<()>>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<InboundEvent>();
    bot.sessions.set_deadline_sink(tx.clone());
    let handle = BotHandle { tx };

    let task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let shutting_down = matches!(event, InboundEvent::Shutdown(_));
            if let Some(reply) = bot.handle_event(event) {
                if outgoing.send(reply).is_err() {
                    warn!("outgoing channel closed; stopping bot loop");
                    break;
                }
            }
            if shutting_down {
                break;
            }
        }
        // Also reached when the outgoing channel closes.
        bot.ledger.persist()?;
        let m = metrics::snapshot();
        info!(
            "bot loop terminated (sessions started={} abandoned={} completed={} broken={} timed_out={})",
            m.sessions_started,
            m.sessions_abandoned,
            m.sessions_completed,
            m.sessions_broken,
            m.sessions_timed_out
        );
        for shape in CATALOG {
            let s = metrics::shape_stats(shape);
            debug!(
                "{}: carving={} completed={} broken={} timed_out={}",
                shape, s.carving, s.completed, s.broken, s.timed_out
            );
        }
        Ok(())
    });

    (handle, task)
}
