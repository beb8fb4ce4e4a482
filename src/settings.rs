//! # Settings Module
//!
//! ## Purpose
//! Run configuration of the normalization pipeline, stored as JSON (plumb_config.json by
//! default). Missing files and missing keys fall back to defaults, so an empty `{}` is a
//! valid configuration.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "filter_role": "organic",
//!   "filter_count": 1,
//!   "molarity_match": { "Decimals": 6 },
//!   "acid_threshold": 10.0,
//!   "mixing_tolerance": 1e-6,
//!   "check_ceiling": true,
//!   "ignore_absent_outcome": false,
//!   "parallel": true,
//!   "output_dir": "output",
//!   "log_file": null,
//!   "log_level": "info"
//! }
//! ```
use crate::Chemistry::role::Role;
use crate::Reactions::assembly::AssemblyOptions;
use crate::Reactions::reagent_groups::{GroupingOptions, MolarityMatch};
use crate::error::PipelineError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "plumb_config.json";

/// Everything a run can be tuned with.
///
/// # Fields
/// * `filter_role`, `filter_count` - the filtered reaction export keeps reactions with exactly
///   `filter_count` distinct chemicals of `filter_role`
/// * `molarity_match` - molarity equality used when collapsing reagents
/// * `acid_threshold` - alpha-vial acid molarity (mol/L) above which a reaction is reported
/// * `mixing_tolerance` - relative tolerance of the vial mixing check
/// * `check_ceiling` - report molarities above the pure-form ceiling
/// * `ignore_absent_outcome` - keep reactions that have no crystal score
/// * `parallel` - summarize reactions on the rayon pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumbConfig {
    pub filter_role: Role,
    pub filter_count: usize,
    pub molarity_match: MolarityMatch,
    pub acid_threshold: f64,
    pub mixing_tolerance: f64,
    pub check_ceiling: bool,
    pub ignore_absent_outcome: bool,
    pub parallel: bool,
    pub output_dir: String,
    pub log_file: Option<String>,
    pub log_level: String,
}

impl Default for PlumbConfig {
    fn default() -> Self {
        Self {
            filter_role: Role::Organic,
            filter_count: 1,
            molarity_match: MolarityMatch::default(),
            acid_threshold: 10.0,
            mixing_tolerance: 1e-6,
            check_ceiling: true,
            ignore_absent_outcome: false,
            parallel: true,
            output_dir: "output".to_string(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl PlumbConfig {
    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            ignore_absent_outcome: self.ignore_absent_outcome,
        }
    }

    pub fn grouping_options(&self) -> GroupingOptions {
        GroupingOptions {
            molarity_match: self.molarity_match,
            parallel: self.parallel,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

/// Loads and persists a `PlumbConfig`.
#[derive(Debug, Clone)]
pub struct Settings {
    config: PlumbConfig,
    config_file: PathBuf,
}

impl Settings {
    /// settings from plumb_config.json in the current directory, defaults if it is absent
    pub fn new() -> Result<Self, PipelineError> {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    /// Settings backed by a custom file.
    ///
    /// # Returns
    /// * `Ok(Settings)` - with the loaded configuration, or defaults if the file does not exist
    /// * `Err(PipelineError)` - the file exists but cannot be read or parsed
    pub fn with_config_file<P: AsRef<Path>>(config_file: P) -> Result<Self, PipelineError> {
        let config = Self::load_config(config_file.as_ref())?;
        Ok(Self {
            config,
            config_file: config_file.as_ref().to_path_buf(),
        })
    }

    fn load_config(config_file: &Path) -> Result<PlumbConfig, PipelineError> {
        if config_file.exists() {
            let content = fs::read_to_string(config_file)?;
            let config: PlumbConfig = serde_json::from_str(&content)?;
            info!("configuration loaded from '{}'", config_file.display());
            Ok(config)
        } else {
            info!(
                "no configuration file '{}', defaults are used",
                config_file.display()
            );
            Ok(PlumbConfig::default())
        }
    }

    /// writes the current configuration as pretty JSON
    pub fn save_config(&self) -> Result<(), PipelineError> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    pub fn config(&self) -> &PlumbConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlumbConfig {
        &mut self.config
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), PipelineError> {
        self.config = PlumbConfig::default();
        self.save_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_config_file(dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.config(), &PlumbConfig::default());
        assert_eq!(settings.config().molarity_match, MolarityMatch::Decimals(6));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"filter_role": "inorganic", "molarity_match": "Exact", "parallel": false}}"#
        )
        .unwrap();
        let settings = Settings::with_config_file(file.path()).unwrap();
        let config = settings.config();
        assert_eq!(config.filter_role, Role::Inorganic);
        assert_eq!(config.molarity_match, MolarityMatch::Exact);
        assert!(!config.parallel);
        assert!(!config.grouping_options().parallel);
        assert_eq!(config.filter_count, 1);
        assert_eq!(config.acid_threshold, 10.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plumb.json");
        let mut settings = Settings::with_config_file(&path).unwrap();
        settings.config_mut().molarity_match = MolarityMatch::Decimals(3);
        settings.config_mut().log_file = Some("run.log".to_string());
        settings.save_config().unwrap();

        let reloaded = Settings::with_config_file(&path).unwrap();
        assert_eq!(reloaded.config(), settings.config());
        assert_eq!(
            reloaded.config().grouping_options().molarity_match,
            MolarityMatch::Decimals(3)
        );
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            Settings::with_config_file(file.path()),
            Err(PipelineError::Json(_))
        ));
    }
}
