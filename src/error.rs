use thiserror::Error;

/// Failure to interpret a textual value as one of the dashboard's enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown month label '{0}'")]
    UnknownMonth(String),

    #[error("unknown report type '{0}' (expected 'Yearly Statistics' or 'Recession Period Statistics')")]
    UnknownReportKind(String),
}

/// Invalid startup configuration read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a year between 1980 and 2023")]
    InvalidYear { var: &'static str, value: String },

    #[error("{var}: {source}")]
    InvalidReport {
        var: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("{var}: source must not be empty")]
    EmptySource { var: &'static str },
}
