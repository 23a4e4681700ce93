//! File-based configuration of the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use knapsack_arena_lobby::LobbyConfig;
use knapsack_arena_system_authoring::AuthoringConfig;
use knapsack_arena_system_session::ScorePolicy;

const DEFAULT_LOG_FILTER: &str = "info";

/// Settings of every arena component, read from TOML.
///
/// Missing sections and keys take their defaults; unknown keys are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaConfig {
    /// Room defaults.
    pub(crate) lobby: LobbyConfig,
    /// Score bounds.
    pub(crate) scoring: ScorePolicy,
    /// Challenge authoring defaults.
    pub(crate) authoring: AuthoringConfig,
    /// Logging settings.
    pub(crate) log: LogConfig,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub(crate) filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl ArenaConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Parses and checks TOML contents.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        if config.authoring.default_max_duration_seconds == 0 {
            bail!("authoring.default_max_duration_seconds must be positive");
        }
        if config.log.filter.trim().is_empty() {
            bail!("log.filter must not be empty");
        }
        Ok(config)
    }
}
