//! Process configuration, read once from the environment at start-up.

use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

use crate::room::models::{Settings, ALLOWED_CHALLENGE_TIMEOUTS};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_PLAYERS: usize = 6;
pub const DEFAULT_JOKERS: usize = 2;
pub const DEFAULT_CHALLENGE_SECONDS: u64 = 5;

const MAX_JOKERS: usize = 2;
const MIN_SEATS: usize = 2;
const MAX_SEATS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value} is invalid: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

/// Rules every room in this process is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub max_players: usize,
    pub jokers: usize,
    pub default_challenge_seconds: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            jokers: DEFAULT_JOKERS,
            default_challenge_seconds: DEFAULT_CHALLENGE_SECONDS,
        }
    }
}

impl GameConfig {
    pub fn default_settings(&self) -> Settings {
        Settings::new(self.default_challenge_seconds).unwrap_or_default()
    }

    pub fn deck_size(&self) -> usize {
        52 + self.jokers
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source; unset variables
    /// fall back to their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let max_players = parse_or(&lookup, "MAX_PLAYERS", DEFAULT_MAX_PLAYERS)?;
        if !(MIN_SEATS..=MAX_SEATS).contains(&max_players) {
            return Err(invalid(
                "MAX_PLAYERS",
                max_players,
                format!("must be between {} and {}", MIN_SEATS, MAX_SEATS),
            ));
        }

        let use_jokers = match lookup("USE_JOKERS") {
            None => true,
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| invalid("USE_JOKERS", &raw, "expected true or false"))?,
        };
        let jokers = parse_or(&lookup, "NUM_JOKERS", DEFAULT_JOKERS)?;
        if jokers > MAX_JOKERS {
            return Err(invalid(
                "NUM_JOKERS",
                jokers,
                format!("at most {} jokers are supported", MAX_JOKERS),
            ));
        }

        let default_challenge_seconds = parse_or(
            &lookup,
            "DEFAULT_CHALLENGE_SECONDS",
            DEFAULT_CHALLENGE_SECONDS,
        )?;
        if !ALLOWED_CHALLENGE_TIMEOUTS.contains(&default_challenge_seconds) {
            return Err(invalid(
                "DEFAULT_CHALLENGE_SECONDS",
                default_challenge_seconds,
                format!("must be one of {:?}", ALLOWED_CHALLENGE_TIMEOUTS),
            ));
        }

        Ok(Self {
            port,
            game: GameConfig {
                max_players,
                jokers: if use_jokers { jokers } else { 0 },
                default_challenge_seconds,
            },
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(var, &raw, "not a number")),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &str, value: impl ToString, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}
