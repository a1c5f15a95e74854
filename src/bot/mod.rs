//! Chat-facing side of the game: command handlers, live sessions, replies and
//! the event loop that ties them to the ledger.

pub mod commands;
pub mod console;
pub mod daily;
pub mod leaderboard;
pub mod reply;
pub mod server;
pub mod sessions;

pub use commands::{BotSettings, CommandContext, CommandHandler, CommandRegistry, Response};
pub use daily::{claim_daily, DailyOutcome, DAILY_COOLDOWN_MS};
pub use leaderboard::{DirectoryLookup, IdentityLookup, RawIdLookup};
pub use reply::{OutgoingReply, Panel, Reply};
pub use server::{start_bot, BotHandle, ButtonAction, DalgonaBot, InboundEvent};
pub use sessions::SessionTable;
