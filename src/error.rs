use std::net::AddrParseError;
use thiserror::Error;

/// Shape problems in a configuration received from outside.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("workingDays and periodsPerDay must both be at least 1")]
    EmptyWeek,
    #[error("availability of {owner} `{id}` must be {days} days of {periods} periods")]
    Availability {
        owner: &'static str,
        id: String,
        days: usize,
        periods: usize,
    },
    #[error("timetable grid of class `{0}` does not match the configured week")]
    GridShape(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid bind address `{addr}`: {source}")]
    BindAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    #[error("server i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
