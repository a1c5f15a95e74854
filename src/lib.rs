//! # Dalgona - honeycomb candy carving game bot
//!
//! Players start a game with `/dalgona`, pick a cookie shape and carve it with
//! light, medium or heavy presses. Each press advances carving progress and
//! chips away at the cookie's integrity; a fully carved cookie pays out its
//! prize and experience, a cracked or timed-out one pays nothing.
//!
//! ## Features
//!
//! - **Coin Ledger**: Per-player coins, level, XP and daily-claim timestamp in an embedded sled database, with JSON import/export.
//! - **Game Sessions**: One explicit state machine per game, owned by the player who started it, with optional carving deadlines.
//! - **Commands**: `/dalgona`, `/balance`, `/daily` and `/leaderboard`, each a registered handler.
//! - **Keep-Alive**: A tiny HTTP endpoint answering `Bot is running!` for hosting platforms.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dalgona::bot::{start_bot, DalgonaBot, RawIdLookup};
//! use dalgona::config::Config;
//! use dalgona::ledger::LedgerStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let ledger = LedgerStore::open(config.ledger_path())?;
//!     let bot = DalgonaBot::from_config(&config, ledger, Box::new(RawIdLookup));
//!
//!     let (out_tx, mut out_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let (handle, task) = start_bot(bot, out_tx);
//!     handle.command("alice", "/dalgona");
//!     if let Some(reply) = out_rx.recv().await {
//!         println!("{:?}", reply.reply);
//!     }
//!     handle.shutdown().await?;
//!     task.await??;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - Command handlers, live sessions, replies and the event loop
//! - [`game`] - Shapes, carving rules and the session state machine
//! - [`ledger`] - Persistent player accounts and leveling
//! - [`keepalive`] - Liveness HTTP endpoint
//! - [`config`] - Configuration loading and environment overrides
//! - [`metrics`] - In-process counters
//! - [`validation`] - Player ID checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Front end      │ ← console (or a chat adapter) producing events
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Bot loop       │ ← commands, buttons, deadlines, one at a time
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Ledger         │ ← sled-backed accounts
//! └─────────────────┘
//! ```

pub mod bot;
pub mod config;
pub mod game;
pub mod keepalive;
pub mod ledger;
pub mod metrics;
pub mod validation;
