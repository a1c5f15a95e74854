use dalgona::bot::leaderboard::{render, top_n};
use dalgona::bot::{BotSettings, DirectoryLookup, RawIdLookup};

mod common;

#[test]
fn ranks_richest_first_and_breaks_ties_by_id() {
    let (_tmp, store) = common::temp_ledger();
    for (id, coins) in [("dave", 5_000), ("carol", 40_000), ("bob", 40_000), ("alice", 90_000)] {
        store.update(id, |r| r.coins = coins).unwrap();
    }
    let top = top_n(&store, 3).unwrap();
    let ids: Vec<&str> = top.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "bob", "carol"]);

    let text = render(&top, &RawIdLookup).unwrap();
    assert_eq!(
        text,
        "🏆 Leaderboard\n\n1. alice — 90000 coins\n2. bob — 40000 coins\n3. carol — 40000 coins\n"
    );
}

#[test]
fn fewer_players_than_slots() {
    let (_tmp, store) = common::temp_ledger();
    store.get_or_create("solo").unwrap();
    assert_eq!(top_n(&store, 5).unwrap().len(), 1);
}

#[test]
fn empty_ledger_renders_placeholder() {
    let (_tmp, store) = common::temp_ledger();
    let text = render(&top_n(&store, 5).unwrap(), &RawIdLookup).unwrap();
    assert_eq!(text, "🏆 Leaderboard\n\nNo players yet.\n");
}

#[test]
fn leaderboard_command_uses_display_names() {
    let (_tmp, store) = common::temp_ledger();
    store.update("123", |r| r.coins = 50_000).unwrap();
    store.update("456", |r| r.coins = 20_000).unwrap();
    let lookup = DirectoryLookup::new().with("123", "Alice").with("456", "Bob");
    let mut bot = dalgona::bot::DalgonaBot::new(store, BotSettings::default(), Box::new(lookup));

    let out = bot.handle_command("123", "/leaderboard");
    let text = out.reply.text().unwrap();
    assert!(text.contains("1. Alice — 50000 coins"));
    assert!(text.contains("2. Bob — 20000 coins"));
}

#[test]
fn failed_name_lookup_fails_the_command() {
    let (_tmp, store) = common::temp_ledger();
    store.update("ghost", |r| r.coins = 1).unwrap();
    let mut bot = dalgona::bot::DalgonaBot::new(
        store,
        BotSettings::default(),
        Box::new(DirectoryLookup::new()),
    );
    assert!(bot.handle_command("ghost", "leaderboard").reply.is_error());
}
