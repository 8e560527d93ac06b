//! Application configuration loaded from environment variables.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat relay configuration
    pub transport: TransportConfig,

    /// Bot behaviour
    #[serde(default)]
    pub bot: BotConfig,

    /// Reminder scheduler
    #[serde(default)]
    pub reminders: ReminderConfig,

    /// Status server
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Relay REST endpoint
    #[serde(default = "default_transport_url")]
    pub base_url: String,

    /// Relay access token
    pub token: String,

    /// Poll interval for updates
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix character
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Upper bound on a single command's execution time
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format ("text" or "json")
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// How long a chat's queue may sit empty before its worker exits
    #[serde(default = "default_lane_idle", with = "humantime_serde")]
    pub lane_idle_timeout: Duration,

    /// User ids allowed to broadcast, comma separated. Empty allows everyone.
    #[serde(default)]
    pub broadcast_allowlist: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// How often pending reminders are scanned
    #[serde(default = "default_scan_interval", with = "humantime_serde")]
    pub scan_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            command_timeout: default_command_timeout(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            lane_idle_timeout: default_lane_idle(),
            broadcast_allowlist: Vec::new(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            scan_interval: default_scan_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl BotConfig {
    /// The prefix as a single character.
    pub fn prefix_char(&self) -> Result<char> {
        let mut chars = self.prefix.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(c),
            _ => bail!(
                "Command prefix must be a single non-whitespace character, got {:?}",
                self.prefix
            ),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

// Default value functions
fn default_transport_url() -> String {
    "http://chat-relay:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_prefix() -> String {
    ".".into()
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_lane_idle() -> Duration {
    crate::lanes::DEFAULT_LANE_IDLE
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_scan_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_env(config::Environment::default())
    }

    fn from_env(env: config::Environment) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(
                env.separator("__")
                    // Keep strings as strings; numbers are parsed by serde.
                    .try_parsing(false)
                    .list_separator(",")
                    .with_list_parse_key("bot.broadcast_allowlist"),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.bot.prefix_char()?;
        if self.reminders.scan_interval.is_zero() {
            bail!("Reminder scan interval must be greater than zero");
        }
        if self.bot.lane_idle_timeout.is_zero() {
            bail!("Lane idle timeout must be greater than zero");
        }
        if self.bot.command_timeout.is_zero() {
            bail!("Command timeout must be greater than zero");
        }
        Ok(())
    }
}
