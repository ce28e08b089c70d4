//! Session configuration.
//!
//! Loaded from environment variables with sensible defaults:
//!
//! | Variable               | Default | Meaning                              |
//! |------------------------|---------|--------------------------------------|
//! | `FOODIES_MAX_STOPS`    | `3`     | Maximum number of delivery stops     |
//! | `FOODIES_HIGHLIGHT_MS` | `500`   | "Recently added" highlight duration  |

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default cap on the number of delivery stops
pub const DEFAULT_MAX_STOPS: usize = 3;

/// Default duration of the "recently added" highlight on the menu
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

const MAX_STOPS_VAR: &str = "FOODIES_MAX_STOPS";
const HIGHLIGHT_MS_VAR: &str = "FOODIES_HIGHLIGHT_MS";

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that doesn't parse
    #[error("invalid value {value:?} for {var}: expected a non-negative integer")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Tunables for an order session and its screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of delivery stops on a route
    pub max_stops: usize,
    /// How long the menu highlights a freshly added food
    pub highlight_duration: Duration,
}

impl SessionConfig {
    /// Set the stop cap
    #[must_use]
    pub const fn with_max_stops(mut self, max_stops: usize) -> Self {
        self.max_stops = max_stops;
        self
    }

    /// Set the highlight duration
    #[must_use]
    pub const fn with_highlight_duration(mut self, duration: Duration) -> Self {
        self.highlight_duration = duration;
        self
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(max_stops) = parse_var(&lookup, MAX_STOPS_VAR)? {
            config.max_stops = usize::try_from(max_stops).map_err(|_| ConfigError::Invalid {
                var: MAX_STOPS_VAR,
                value: max_stops.to_string(),
            })?;
        }
        if let Some(millis) = parse_var(&lookup, HIGHLIGHT_MS_VAR)? {
            config.highlight_duration = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_stops: DEFAULT_MAX_STOPS,
            highlight_duration: DEFAULT_HIGHLIGHT_DURATION,
        }
    }
}

fn parse_var<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var,
                value: value.clone(),
            })
        })
        .transpose()
}
