//! Service configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! | variable | default |
//! |---|---|
//! | `DATABASE_URL` | unset, polls are kept in memory |
//! | `BIND_ADDRESS` | `0.0.0.0` |
//! | `PORT` | `1337` |
//! | `DEFAULT_SELECTION_MODE` | `multi` |
//! | `PARTICIPANT_HEADER` | `X-Participant-Id` |

use anyhow::{anyhow, Context, Result};

use crate::models::SelectionMode;

pub const DEFAULT_PARTICIPANT_HEADER: &str = "X-Participant-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub bind_address: String,
    pub port: u16,
    pub default_selection_mode: SelectionMode,
    pub participant_header: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: "0.0.0.0".to_string(),
            port: 1337,
            default_selection_mode: SelectionMode::Multi,
            participant_header: DEFAULT_PARTICIPANT_HEADER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to load .env file");
            }
        }
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the config from any key lookup, so it can be fed without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match set("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("could not parse PORT '{}'", port))?,
            None => defaults.port,
        };
        let default_selection_mode = match set("DEFAULT_SELECTION_MODE") {
            Some(mode) => mode
                .parse::<SelectionMode>()
                .map_err(|e| anyhow!(e))
                .context("invalid DEFAULT_SELECTION_MODE")?,
            None => defaults.default_selection_mode,
        };

        Ok(Self {
            database_url: set("DATABASE_URL"),
            bind_address: set("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            default_selection_mode,
            participant_header: set("PARTICIPANT_HEADER").unwrap_or(defaults.participant_header),
        })
    }
}
