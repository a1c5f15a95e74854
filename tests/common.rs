//! Test utilities shared by the integration tests.

use dalgona::bot::{BotSettings, DalgonaBot, OutgoingReply, RawIdLookup};
use dalgona::ledger::LedgerStore;
use tempfile::TempDir;
use tokio::time::Instant;

/// A ledger in a fresh temp dir. Keep the `TempDir` alive for the test's duration.
#[allow(dead_code)]
pub fn temp_ledger() -> (TempDir, LedgerStore) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = LedgerStore::open(tmp.path().join("ledger")).expect("open ledger");
    (tmp, store)
}

#[allow(dead_code)]
pub fn bot_with(settings: BotSettings) -> (TempDir, LedgerStore, DalgonaBot) {
    let (tmp, store) = temp_ledger();
    let bot = DalgonaBot::new(store.clone(), settings, Box::new(RawIdLookup));
    (tmp, store, bot)
}

/// Press `custom_id` on `player`'s game and return the reply, panicking if the press was ignored.
#[allow(dead_code)]
pub fn press(bot: &mut DalgonaBot, player: &str, reply: &OutgoingReply, custom_id: &str) -> OutgoingReply {
    let session = reply.session.expect("reply carries a session");
    bot.handle_button_at(player, session, custom_id, Instant::now())
        .unwrap_or_else(|| panic!("press '{}' by {} was ignored", custom_id, player))
}
