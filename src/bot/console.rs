//! Console front end.
//!
//! Stands in for a chat platform when running locally: each stdin line is
//! `<player> <input>` where input is a slash command (`/dalgona`), a shape
//! name or `choose <shape>`, or an intensity (`light`, `medium`, `heavy`).
//! Button-style input is routed to the last game message shown to that player.

use std::collections::HashMap;
use std::fmt::Write;

use uuid::Uuid;

use super::reply::{choose_button_id, OutgoingReply, Panel, Reply};
use super::server::InboundEvent;
use crate::game::{Intensity, Shape};
use crate::validation::validate_player_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command { player: String, name: String },
    Button { player: String, custom_id: String },
    Help,
    Quit,
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Result<Self, String> {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            return Ok(ConsoleInput::Quit);
        }
        if trimmed.eq_ignore_ascii_case("help") || trimmed == "?" {
            return Ok(ConsoleInput::Help);
        }
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let player = parts.next().unwrap_or_default();
        let rest = parts.next().map(str::trim).unwrap_or_default();
        validate_player_id(player).map_err(|e| e.to_string())?;
        if rest.is_empty() {
            return Err("Usage: <player> </command | shape | light | medium | heavy>".into());
        }
        let player = player.to_string();

        if let Some(name) = rest.strip_prefix('/') {
            return Ok(ConsoleInput::Command {
                player,
                name: name.to_string(),
            });
        }
        let choice = rest
            .strip_prefix("choose ")
            .or_else(|| rest.strip_prefix("CHOOSE "))
            .unwrap_or(rest);
        if let Ok(shape) = choice.parse::<Shape>() {
            return Ok(ConsoleInput::Button {
                player,
                custom_id: choose_button_id(shape),
            });
        }
        if let Ok(intensity) = rest.parse::<Intensity>() {
            return Ok(ConsoleInput::Button {
                player,
                custom_id: intensity.button_id().to_string(),
            });
        }
        // Bare words are treated as commands (`alice balance`).
        Ok(ConsoleInput::Command {
            player,
            name: rest.to_string(),
        })
    }
}

/// Tracks which game message each player last saw so button input can be routed.
#[derive(Debug, Default)]
pub struct ConsoleRouter {
    last_session: HashMap<String, Uuid>,
}

impl ConsoleRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the session a reply belongs to.
    pub fn observe(&mut self, reply: &OutgoingReply) {
        if let Some(id) = reply.session {
            self.last_session.insert(reply.player.clone(), id);
        }
    }

    /// Turn parsed input into a bot event. Buttons without a known message are an error.
    pub fn route(&self, input: ConsoleInput) -> Result<Option<InboundEvent>, String> {
        match input {
            ConsoleInput::Command { player, name } => Ok(Some(InboundEvent::Command { player, name })),
            ConsoleInput::Button { player, custom_id } => match self.last_session.get(&player) {
                Some(session) => Ok(Some(InboundEvent::Button {
                    player,
                    session: *session,
                    custom_id,
                })),
                None => Err(format!("{} has no game on screen; try `{} /dalgona`", player, player)),
            },
            ConsoleInput::Help | ConsoleInput::Quit => Ok(None),
        }
    }
}

pub fn help_text() -> String {
    [
        "Each line is `<player> <input>`:",
        "  alice /dalgona      start a game",
        "  alice triangle      pick a cookie (or `choose triangle`)",
        "  alice heavy         carve: light | medium | heavy",
        "  alice /balance      coins and level",
        "  alice /daily        claim the daily reward",
        "  alice /leaderboard  top players",
        "`quit` exits.",
    ]
    .join("\n")
}

fn render_panel(panel: &Panel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", panel.title);
    if let Some(desc) = &panel.description {
        let _ = writeln!(out, "{}", desc);
    }
    for field in &panel.fields {
        let _ = writeln!(out, "{}: {}", field.name, field.value);
    }
    if !panel.buttons.is_empty() {
        let buttons: Vec<String> = panel
            .buttons
            .iter()
            .map(|b| format!("[{}] {}", b.id, b.label))
            .collect();
        let _ = writeln!(out, "{}", buttons.join("  "));
    }
    out
}

/// Plain-text rendering of a reply, prefixed with the addressed player.
pub fn render(reply: &OutgoingReply) -> String {
    let body = match &reply.reply {
        Reply::Text(text) => format!("{}\n", text),
        Reply::Error(text) => format!("⚠️ {}\n", text),
        Reply::Panel(panel) => render_panel(panel),
    };
    format!("@{}\n{}", reply.player, body)
}
