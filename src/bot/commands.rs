//! Slash-command handlers and the registry that routes command names to them.
//!
//! Each command is a [`CommandHandler`] registered under its name; adding a
//! command means registering another handler, not growing a match statement.

use std::collections::HashMap;

use anyhow::Result;
use log::{debug, info};
use tokio::time::Instant;
use uuid::Uuid;

use super::daily::{claim_daily, format_remaining, DailyOutcome};
use super::leaderboard::{self, IdentityLookup};
use super::reply::{carving_panel, shape_choice_panel, Reply};
use super::sessions::SessionTable;
use crate::config::SelectionMode;
use crate::game::{CarveRules, DalgonaSession, SessionState};
use crate::ledger::LedgerStore;
use crate::metrics;

/// Game-wide settings the handlers read.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub daily_reward: u64,
    pub leaderboard_size: usize,
    pub selection: SelectionMode,
    pub rules: CarveRules,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            daily_reward: crate::config::DEFAULT_DAILY_REWARD,
            leaderboard_size: crate::config::DEFAULT_LEADERBOARD_SIZE,
            selection: SelectionMode::Choice,
            rules: CarveRules::classic(),
        }
    }
}

/// Everything a handler may touch while executing one command.
pub struct CommandContext<'a> {
    pub player: &'a str,
    pub ledger: &'a LedgerStore,
    pub sessions: &'a mut SessionTable,
    pub settings: &'a BotSettings,
    pub lookup: &'a dyn IdentityLookup,
    /// Wall clock, milliseconds since the Unix epoch.
    pub now_ms: i64,
    /// Monotonic clock for session deadlines.
    pub now: Instant,
}

/// Handler output: the reply plus the session it belongs to, if it opened one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub reply: Reply,
    pub session: Option<Uuid>,
}

impl From<Reply> for Response {
    fn from(reply: Reply) -> Self {
        Self {
            reply,
            session: None,
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<Response>;
}

/// Map from command name to handler.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in commands.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(BalanceCommand));
        registry.register(Box::new(DailyCommand));
        registry.register(Box::new(DalgonaCommand));
        registry.register(Box::new(LeaderboardCommand));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn CommandHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Normalize user input: trim, drop a leading `/`, lowercase.
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        trimmed
            .strip_prefix('/')
            .unwrap_or(trimmed)
            .to_ascii_lowercase()
    }

    pub fn get(&self, raw: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(&Self::normalize(raw)).map(|h| h.as_ref())
    }

    /// Registered `(name, description)` pairs sorted by name, for command registration.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        let mut out: Vec<_> = self
            .handlers
            .values()
            .map(|h| (h.name(), h.description()))
            .collect();
        out.sort();
        out
    }
}

pub struct BalanceCommand;

impl CommandHandler for BalanceCommand {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn description(&self) -> &'static str {
        "Check coins"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<Response> {
        let record = ctx.ledger.get_or_create(ctx.player)?;
        Ok(Reply::Text(format!(
            "💰 Coins: {}\n⭐ Level: {}\n✨ XP: {}/{}",
            record.coins,
            record.level,
            record.xp,
            record.xp_to_next_level()
        ))
        .into())
    }
}

pub struct DailyCommand;

impl CommandHandler for DailyCommand {
    fn name(&self) -> &'static str {
        "daily"
    }

    fn description(&self) -> &'static str {
        "Claim daily reward"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<Response> {
        let reward = ctx.settings.daily_reward;
        let now_ms = ctx.now_ms;
        let mut outcome = None;
        ctx.ledger.update(ctx.player, |record| {
            outcome = Some(claim_daily(record, now_ms, reward));
        })?;
        let reply = match outcome {
            Some(DailyOutcome::Granted { reward, balance }) => {
                ctx.ledger.persist()?;
                metrics::inc_daily_granted();
                info!("daily: {} claimed {} coins (balance {})", ctx.player, reward, balance);
                Reply::Text(format!("🎁 You received {} coins!", reward))
            }
            Some(DailyOutcome::AlreadyClaimed { remaining_ms }) => {
                metrics::inc_daily_rejected();
                Reply::Text(format!(
                    "⏰ Daily already claimed! Next claim in {}",
                    format_remaining(remaining_ms)
                ))
            }
            None => Reply::Error("Daily claim could not be processed.".to_string()),
        };
        Ok(reply.into())
    }
}

pub struct DalgonaCommand;

impl CommandHandler for DalgonaCommand {
    fn name(&self) -> &'static str {
        "dalgona"
    }

    fn description(&self) -> &'static str {
        "Play Dalgona Game"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<Response> {
        // A new game replaces whatever the player left unfinished.
        if let Some(previous) = ctx.sessions.live_session_for(ctx.player) {
            ctx.sessions.remove(&previous);
            metrics::inc_sessions_abandoned();
            debug!("dalgona: {} abandoned session {}", ctx.player, previous);
        }
        let record = ctx.ledger.get_or_create(ctx.player)?;
        let rules = ctx.settings.rules;

        let (session, reply) = match ctx.settings.selection {
            SelectionMode::Choice => (
                DalgonaSession::new(ctx.player, rules),
                Reply::Panel(shape_choice_panel()),
            ),
            SelectionMode::Campaign => {
                let Some(session) =
                    DalgonaSession::for_level(ctx.player, record.level, rules, ctx.now)
                else {
                    return Ok(Reply::Text(
                        "🏆 You have carved every cookie! Nothing left to play.".to_string(),
                    )
                    .into());
                };
                let SessionState::Carving {
                    shape,
                    integrity,
                    progress,
                    ..
                } = *session.state()
                else {
                    return Ok(Reply::Error("Could not start the game.".to_string()).into());
                };
                let limit = rules.time_limit(shape).map(|d| d.as_secs());
                let panel = carving_panel(ctx.player, shape, progress, integrity, limit);
                (session, Reply::Panel(panel))
            }
        };

        let id = ctx.sessions.insert(session);
        metrics::inc_sessions_started();
        debug!("dalgona: {} started session {}", ctx.player, id);
        Ok(Response {
            reply,
            session: Some(id),
        })
    }
}

pub struct LeaderboardCommand;

impl CommandHandler for LeaderboardCommand {
    fn name(&self) -> &'static str {
        "leaderboard"
    }

    fn description(&self) -> &'static str {
        "Top players"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<Response> {
        let entries = leaderboard::top_n(ctx.ledger, ctx.settings.leaderboard_size)?;
        let text = leaderboard::render(&entries, ctx.lookup)?;
        Ok(Reply::Text(text).into())
    }
}
