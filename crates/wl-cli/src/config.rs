//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wl_core::{AnalysisConfig, MatchConfig};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Idle minutes that split two sessions.
    pub max_gap_minutes: i64,

    /// Sessions shorter than this many seconds are dropped.
    pub min_session_duration_secs: i64,

    /// Best match score must be strictly above this.
    pub min_confidence: f64,

    /// Ticket statuses considered open. Empty keeps every ticket.
    pub ticket_statuses: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_gap_minutes", &self.max_gap_minutes)
            .field("min_session_duration_secs", &self.min_session_duration_secs)
            .field("min_confidence", &self.min_confidence)
            .field("ticket_statuses", &self.ticket_statuses)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let analysis = AnalysisConfig::default();
        Self {
            max_gap_minutes: analysis.max_gap_minutes,
            min_session_duration_secs: analysis.min_session_duration_secs,
            min_confidence: MatchConfig::default().min_confidence,
            ticket_statuses: ["In Progress", "To Do", "In Review"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    pub const fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_gap_minutes: self.max_gap_minutes,
            min_session_duration_secs: self.min_session_duration_secs,
        }
    }

    pub const fn matching(&self) -> MatchConfig {
        MatchConfig {
            min_confidence: self.min_confidence,
        }
    }
}

/// Returns the platform-specific config directory for wl.
///
/// On Linux: `~/.config/wl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wl"))
}
