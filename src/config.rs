//! Engine settings and project documents loaded from TOML.
//!
//! ```toml
//! batch_threads = 4
//!
//! [risk]
//! iterations = 2000
//! seed = 7
//!
//! [lead_times]
//! "transformer/345kv" = { min = 120, typical = 150, max = 220 }
//! hv_breakers = { min = 104, typical = 130, max = 182 }
//! ```
//!
//! Every key is optional. Lead times given here are layered over the
//! standard defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::info;

use crate::catalog::standard_lead_times;
use crate::error::{Error, Result};
use crate::models::{LeadTimeTable, ProjectConfiguration};
use crate::risk::RiskSettings;

/// Process-wide engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Worker threads for batch scenario evaluation; `None` uses the global pool.
    pub batch_threads: Option<usize>,
    pub risk: RiskSettings,
    /// Default lead times layered over the standard table.
    pub lead_times: LeadTimeTable,
}

impl Settings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
        settings.check()?;
        Ok(settings)
    }

    /// Reads and parses a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&source)?;
        info!(path = %path.display(), overrides = settings.lead_times.len(), "settings loaded");
        Ok(settings)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Standard lead times with this file's entries applied on top.
    pub fn default_lead_times(&self) -> Result<LeadTimeTable> {
        let mut table = standard_lead_times();
        table.merge(&self.lead_times);
        table.check()?;
        Ok(table)
    }

    /// Checks numeric settings and lead-time ordering.
    pub fn check(&self) -> Result<()> {
        if self.batch_threads == Some(0) {
            return Err(Error::configuration("batch_threads", "must be at least 1"));
        }
        if self.risk.iterations == 0 {
            return Err(Error::configuration("risk.iterations", "must be at least 1"));
        }
        self.lead_times.check()
    }
}

impl ProjectConfiguration {
    /// Parses a project configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Reads a project configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        GridOperator, LeadTime, LeadTimeCategory, LeadTimeKey, VoltageClass, Workstream,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_empty_document_is_default() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.risk.iterations, 1000);
        assert_eq!(settings.risk.seed, 42);
    }

    #[test]
    fn test_lead_times_layered_over_standard() {
        let settings = Settings::from_toml_str(
            r#"
            batch_threads = 2

            [risk]
            seed = 9

            [lead_times]
            "transformer/345kv" = { min = 1, typical = 2, max = 3 }
            "#,
        )
        .unwrap();
        assert_eq!(settings.batch_threads, Some(2));
        assert_eq!(settings.risk.seed, 9);
        assert_eq!(settings.risk.iterations, 1000);

        let key = LeadTimeKey::voltage(LeadTimeCategory::Transformer, VoltageClass::Kv345);
        let table = settings.default_lead_times().unwrap();
        assert_eq!(table.get(&key), Some(&LeadTime::new(1, 2, 3)));

        let untouched = LeadTimeKey::category(LeadTimeCategory::HvBreakers);
        assert_eq!(table.get(&untouched), standard_lead_times().get(&untouched));
    }

    #[test]
    fn test_rejects_unordered_lead_time() {
        let err = Settings::from_toml_str(
            r#"
            [lead_times]
            switchgear = { min = 9, typical = 2, max = 3 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = Settings::from_toml_str(
            r#"
            [lead_times]
            "switchgear/345kv" = { min = 1, typical = 2, max = 3 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_rejects_zero_threads() {
        assert!(Settings::from_toml_str("batch_threads = 0").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/nonexistent/u-critpath.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_project_from_toml() {
        let config = ProjectConfiguration::from_toml_str(
            r#"
            project_id = "tx-campus"
            target_capacity_mw = 300
            voltage_class = "345kv"
            grid_operator = "ercot"
            on_site_generation = true
            disabled_workstreams = ["financing"]
            skipped_milestones = ["PS-ENV-02"]
            start_date = "2025-01-06"
            target_energization = "2030-12-29"

            [milestone_overrides]
            POST-EQ-02 = { min = 100, typical = 120, max = 140 }
            "#,
        )
        .unwrap();
        assert_eq!(config.project_id, "tx-campus");
        assert_eq!(config.voltage_class, VoltageClass::Kv345);
        assert_eq!(config.grid_operator, GridOperator::Ercot);
        assert!(config.on_site_generation);
        assert!(config.buyer_supplies_equipment);
        assert!(!config.is_workstream_enabled(Workstream::Financing));
        assert!(config.skipped_milestones.contains("PS-ENV-02"));
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(config.target_week(), Some(311));
        assert_eq!(
            config.milestone_overrides.get("POST-EQ-02"),
            Some(&LeadTime::new(100, 120, 140))
        );
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            batch_threads: Some(3),
            risk: RiskSettings { iterations: 10, seed: 1 },
            lead_times: LeadTimeTable::new().with_entry(
                LeadTimeKey::category(LeadTimeCategory::GasTurbine),
                LeadTime::new(100, 120, 150),
            ),
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(Settings::from_toml_str(&text).unwrap(), settings);
    }
}
