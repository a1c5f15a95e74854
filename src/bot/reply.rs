//! Outbound reply model and the panels the game renders.
//!
//! Replies are platform neutral: a chat adapter turns a [`Panel`] into an
//! embed with buttons, the console front end turns it into plain text.

use uuid::Uuid;

use crate::game::{Intensity, Shape, CATALOG, MAX_PROGRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelColor {
    Yellow,
    Green,
    Red,
    Grey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub description: Option<String>,
    pub color: PanelColor,
    pub fields: Vec<Field>,
    pub buttons: Vec<Button>,
}

impl Panel {
    pub fn new(title: impl Into<String>, color: PanelColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn button(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.buttons.push(Button {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Panel(Panel),
    /// A command failed; the text is safe to show the player.
    Error(String),
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(t) | Reply::Error(t) => Some(t),
            Reply::Panel(_) => None,
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        match self {
            Reply::Panel(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

/// A reply addressed to the player who triggered it.
///
/// `session` names the game whose message this reply creates or replaces, so
/// button presses on it can be routed back to the right session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    pub player: String,
    pub session: Option<Uuid>,
    pub reply: Reply,
}

pub const CHOOSE_PREFIX: &str = "choose_";

pub fn choose_button_id(shape: Shape) -> String {
    format!("{}{}", CHOOSE_PREFIX, shape.name())
}

pub fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(MAX_PROGRESS));
    let empty = usize::from(MAX_PROGRESS) - filled;
    format!("[{}{}]", "🟩".repeat(filled), "⬛".repeat(empty))
}

pub fn shape_choice_panel() -> Panel {
    CATALOG.iter().fold(
        Panel::new("🍪 Choose a cookie type to start!", PanelColor::Yellow),
        |panel, shape| {
            panel.button(
                choose_button_id(*shape),
                format!("{} (${})", shape.name(), shape.reward()),
            )
        },
    )
}

pub fn carving_panel(
    player: &str,
    shape: Shape,
    progress: u8,
    integrity: u8,
    time_limit_secs: Option<u64>,
) -> Panel {
    let mut panel = Panel::new(
        format!("🍪 DALGONA: 💀 {}", shape.name().to_uppercase()),
        PanelColor::Yellow,
    )
    .description("Start carving your cookie!")
    .field("Player", player, true)
    .field("Prize", format!("${}", shape.reward()), true)
    .field("Cookie Integrity", format!("{}%", integrity), false)
    .field("Carving Progress", progress_bar(progress), false);
    if let Some(secs) = time_limit_secs {
        panel = panel.field("Time Limit", format!("{}s", secs), true);
    }
    Intensity::ALL
        .iter()
        .fold(panel, |panel, i| panel.button(i.button_id(), i.label()))
}

pub fn completed_panel(shape: Shape, xp: u64, level_up: Option<(u32, u64)>) -> Panel {
    let mut text = format!(
        "You successfully carved the {}!\n💰 +{} coins\n⭐ +{} XP",
        shape.name(),
        shape.reward(),
        xp
    );
    if let Some((level, bonus)) = level_up {
        text.push_str(&format!(
            "\n🎉 Level up! You reached level {} (+{} coins)",
            level, bonus
        ));
    }
    Panel::new("✅ Cookie Completed!", PanelColor::Green).description(text)
}

pub fn broken_panel(shape: Shape) -> Panel {
    Panel::new("💀 Cookie Broke!", PanelColor::Red).description(format!(
        "Oh no! The {} broke before completion.",
        shape.name()
    ))
}

pub fn timed_out_panel(shape: Shape) -> Panel {
    Panel::new("⏰ Time's Up!", PanelColor::Grey).description(format!(
        "You ran out of time carving the {}.",
        shape.name()
    ))
}
