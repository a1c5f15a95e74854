//! # Configuration Management Module
//!
//! Centralized configuration for the Dalgona bot: a TOML file for the stable
//! settings plus two environment overrides for the values hosting platforms
//! inject at deploy time.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - Bot identity, token, daily reward and game start mode
//! - [`GameConfig`] - Carving rule preset and per-rule overrides
//! - [`KeepAliveConfig`] - Keep-alive HTTP listener
//! - [`StorageConfig`] - Data directory for the ledger
//! - [`LoggingConfig`] - Logging level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dalgona::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load("config.toml").await?;
//!     config.apply_env_overrides();
//!     println!("Keep-alive port: {}", config.keepalive.port);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Dalgona"
//! daily_reward = 1000
//! leaderboard_size = 5
//! selection = "choice"
//!
//! [game]
//! rules = "classic"
//!
//! [keepalive]
//! enabled = true
//! port = 3000
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## Environment Integration
//!
//! Precedence is: Environment > Config file > Defaults.
//! - `DISCORD_TOKEN` (or the older `TOKEN`) sets `bot.token`
//! - `PORT` sets `keepalive.port`

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::{CarveRules, HeavyMode, RuleSet};

pub const DEFAULT_KEEPALIVE_PORT: u16 = 3000;
pub const DEFAULT_DAILY_REWARD: u64 = 1_000;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// How a `dalgona` command picks its cookie.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// The player chooses from the full catalog.
    #[default]
    Choice,
    /// The shape follows the player's level; past the last shape the campaign is over.
    Campaign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Chat platform token. Usually injected through `DISCORD_TOKEN` rather than stored here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Coins granted by `daily`. Deployments have run with 1000 and 20000.
    #[serde(default = "default_daily_reward")]
    pub daily_reward: u64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default)]
    pub selection: SelectionMode,
}

fn default_daily_reward() -> u64 {
    DEFAULT_DAILY_REWARD
}

fn default_leaderboard_size() -> usize {
    DEFAULT_LEADERBOARD_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub rules: RuleSet,
    /// Override the preset's integrity loss for a medium carve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_integrity_loss: Option<u8>,
    /// Override the preset's heavy carve mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heavy: Option<HeavyMode>,
    /// Override whether carving is time limited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed: Option<bool>,
}

impl GameConfig {
    /// Resolve the preset plus overrides into concrete carving rules.
    pub fn carve_rules(&self) -> CarveRules {
        let mut rules = CarveRules::preset(self.rules);
        if let Some(loss) = self.medium_integrity_loss {
            rules.medium_integrity_loss = loss;
        }
        if let Some(heavy) = self.heavy {
            rules.heavy = heavy;
        }
        if let Some(timed) = self.timed {
            rules.timed = timed;
        }
        rules
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_KEEPALIVE_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the ledger database path; defaults to `<data_dir>/ledger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_db_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Apply `DISCORD_TOKEN`/`TOKEN` and `PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (lets tests avoid mutating the real environment).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN").or_else(|| lookup("TOKEN")) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                self.bot.token = Some(token);
            }
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.keepalive.port = p,
                Err(_) => log::warn!(
                    "Ignoring invalid PORT '{}', keeping {}",
                    port,
                    self.keepalive.port
                ),
            }
        }
    }

    /// Sled directory for the coin ledger.
    pub fn ledger_path(&self) -> PathBuf {
        match &self.storage.ledger_db_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.storage.data_dir).join("ledger"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "Dalgona".to_string(),
                token: None,
                daily_reward: DEFAULT_DAILY_REWARD,
                leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
                selection: SelectionMode::Choice,
            },
            game: GameConfig::default(),
            keepalive: KeepAliveConfig::default(),
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                ledger_db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("dalgona.log".to_string()),
            },
        }
    }
}
