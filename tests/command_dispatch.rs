use dalgona::bot::{BotSettings, CommandContext, CommandHandler, CommandRegistry, Reply, Response};
use tokio::time::Instant;

mod common;
use common::bot_with;

const DAY_MS: i64 = 86_400_000;
const T0: i64 = 1_700_000_000_000;

#[test]
fn balance_reports_coins_level_and_xp() {
    let (_tmp, store, mut bot) = bot_with(BotSettings::default());
    let out = bot.handle_command("alice", "/balance");
    assert_eq!(out.player, "alice");
    assert_eq!(
        out.reply.text(),
        Some("💰 Coins: 10000\n⭐ Level: 1\n✨ XP: 0/100")
    );
    // Reading a balance creates the account.
    assert!(store.get("alice").unwrap().is_some());
}

#[test]
fn daily_once_per_day() {
    let (_tmp, store, mut bot) = bot_with(BotSettings::default());
    let now = Instant::now();

    let first = bot.handle_command_at("alice", "daily", T0, now);
    assert_eq!(first.reply.text(), Some("🎁 You received 1000 coins!"));
    assert_eq!(store.get("alice").unwrap().unwrap().coins, 11_000);

    let again = bot.handle_command_at("alice", "daily", T0 + 60_000, now);
    assert_eq!(
        again.reply.text(),
        Some("⏰ Daily already claimed! Next claim in ~23h 59m")
    );
    assert_eq!(store.get("alice").unwrap().unwrap().coins, 11_000);

    let next_day = bot.handle_command_at("alice", "daily", T0 + DAY_MS, now);
    assert_eq!(next_day.reply.text(), Some("🎁 You received 1000 coins!"));
    let alice = store.get("alice").unwrap().unwrap();
    assert_eq!(alice.coins, 12_000);
    assert_eq!(alice.last_daily, T0 + DAY_MS);
}

#[test]
fn daily_reward_is_configurable() {
    let settings = BotSettings {
        daily_reward: 20_000,
        ..BotSettings::default()
    };
    let (_tmp, store, mut bot) = bot_with(settings);
    bot.handle_command_at("alice", "daily", T0, Instant::now());
    assert_eq!(store.get("alice").unwrap().unwrap().coins, 30_000);
}

#[test]
fn unknown_command_gets_a_hint() {
    let (_tmp, store, mut bot) = bot_with(BotSettings::default());
    let out = bot.handle_command("alice", "/slots");
    assert_eq!(out.session, None);
    assert!(out.reply.text().unwrap().starts_with("Unknown command: /slots"));
    assert!(store.is_empty());
}

#[test]
fn command_names_are_case_insensitive() {
    let (_tmp, _store, mut bot) = bot_with(BotSettings::default());
    let out = bot.handle_command("alice", "  /BALANCE ");
    assert!(out.reply.text().unwrap().starts_with("💰 Coins:"));
}

#[test]
fn invalid_player_ids_become_error_replies() {
    let (_tmp, _store, mut bot) = bot_with(BotSettings::default());
    let out = bot.handle_command("bad id", "balance");
    assert!(out.reply.is_error());
}

struct PingCommand;

impl CommandHandler for PingCommand {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn description(&self) -> &'static str {
        "Reply with pong"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<Response> {
        Ok(Reply::Text(format!("pong {}", ctx.player)).into())
    }
}

#[test]
fn registry_accepts_extra_handlers() {
    let mut registry = CommandRegistry::standard();
    registry.register(Box::new(PingCommand));
    assert_eq!(registry.describe().len(), 5);
    assert_eq!(registry.get("/Ping").map(|h| h.name()), Some("ping"));
}
