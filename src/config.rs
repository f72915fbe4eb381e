//! Startup configuration read from the environment (and `.env`, if present).

use crate::data::loader::DataSource;
use crate::error::ConfigError;
use crate::report::{ReportKind, Selection, YEAR_RANGE};

pub const SOURCE_VAR: &str = "AUTO_SALES_SOURCE";
pub const REPORT_VAR: &str = "AUTO_SALES_REPORT";
pub const YEAR_VAR: &str = "AUTO_SALES_YEAR";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardConfig {
    /// Dataset location, fetched once at startup.
    pub source: DataSource,
    /// Selection shown when the window first opens.
    pub initial_selection: Selection,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DashboardConfig::default();

        if let Some(source) = lookup(SOURCE_VAR) {
            if source.trim().is_empty() {
                return Err(ConfigError::EmptySource { var: SOURCE_VAR });
            }
            config.source = DataSource::parse(&source);
        }

        if let Some(report) = lookup(REPORT_VAR) {
            let kind = report
                .parse::<ReportKind>()
                .map_err(|source| ConfigError::InvalidReport { var: REPORT_VAR, source })?;
            config.initial_selection.report_kind = Some(kind);
        }

        if let Some(year) = lookup(YEAR_VAR) {
            let parsed = year
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|y| YEAR_RANGE.contains(y))
                .ok_or_else(|| ConfigError::InvalidYear {
                    var: YEAR_VAR,
                    value: year.clone(),
                })?;
            config.initial_selection.selected_year = Some(parsed);
        }

        Ok(config)
    }
}
