//! Engine configuration loaded from TOML.

use crate::games::tictactoe::GameMode;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for a game session.
///
/// Every key is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause before the computer answers a human move, in milliseconds.
    #[serde(default = "default_opponent_delay_ms")]
    opponent_delay_ms: u64,

    /// Mode a new session starts in.
    #[serde(default)]
    default_mode: GameMode,

    /// Seed for the opponent's tie-breaking. `None` seeds from entropy.
    #[serde(default)]
    rng_seed: Option<u64>,
}

#[instrument]
fn default_opponent_delay_ms() -> u64 {
    500
}

impl EngineConfig {
    /// Creates a configuration with explicit values.
    #[instrument]
    pub fn new(opponent_delay_ms: u64, default_mode: GameMode, rng_seed: Option<u64>) -> Self {
        Self {
            opponent_delay_ms,
            default_mode,
            rng_seed,
        }
    }

    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            opponent_delay_ms = config.opponent_delay_ms,
            mode = ?config.default_mode,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// The opponent delay as a [`Duration`].
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    /// Returns a copy with a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(default_opponent_delay_ms(), GameMode::default(), None)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.opponent_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_parses_all_keys() {
        let config = EngineConfig::from_toml(
            "opponent_delay_ms = 50\ndefault_mode = \"player_vs_player\"\nrng_seed = 9\n",
        )
        .unwrap();
        assert_eq!(*config.opponent_delay_ms(), 50);
        assert_eq!(*config.default_mode(), GameMode::PlayerVsPlayer);
        assert_eq!(*config.rng_seed(), Some(9));
    }

    #[test]
    fn test_bad_mode_is_error() {
        let err = EngineConfig::from_toml("default_mode = \"solitaire\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
