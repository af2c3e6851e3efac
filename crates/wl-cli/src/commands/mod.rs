//! CLI subcommand implementations.

pub mod analyze;
pub mod sessions;
pub mod util;

use anyhow::{Context, Result};
use wl_core::AnalysisConfig;

use crate::Config;
use crate::cli::RecordArgs;

/// Segmentation settings from config, with command-line overrides applied.
fn analysis_config(args: &RecordArgs, config: &Config) -> Result<AnalysisConfig> {
    let mut analysis = config.analysis();
    if let Some(max_gap) = args.max_gap {
        analysis.max_gap_minutes = max_gap;
    }
    if let Some(min_duration) = args.min_duration {
        analysis.min_session_duration_secs = min_duration;
    }
    analysis.validate().context("invalid session settings")?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args(max_gap: Option<i64>, min_duration: Option<i64>) -> RecordArgs {
        RecordArgs {
            records: PathBuf::from("records.json"),
            since: None,
            json: false,
            max_gap,
            min_duration,
        }
    }

    #[test]
    fn flags_override_config() {
        let analysis = analysis_config(&args(Some(30), Some(60)), &Config::default()).unwrap();
        assert_eq!(analysis.max_gap_minutes, 30);
        assert_eq!(analysis.min_session_duration_secs, 60);
    }

    #[test]
    fn huge_gap_is_accepted() {
        let analysis =
            analysis_config(&args(Some(999_999_999_999_999_999), None), &Config::default())
                .unwrap();
        assert_eq!(analysis.max_gap_minutes, 999_999_999_999_999_999);
    }

    #[test]
    fn negative_settings_are_rejected() {
        let err = analysis_config(&args(Some(-5), None), &Config::default()).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "invalid session settings: max_gap_minutes cannot be negative, got -5"
        );

        let mut config = Config::default();
        config.min_session_duration_secs = -1;
        assert!(analysis_config(&args(None, None), &config).is_err());
    }
}
