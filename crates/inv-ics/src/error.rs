//! Error types for calendar loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::rule::RuleError;

/// Fatal calendar loading errors.
#[derive(Debug, Error)]
pub enum IcsError {
    #[error("failed to read calendar {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid calendar data: {0}")]
    Parse(String),
}

/// Problems with a single VEVENT. The event is skipped, the load continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("missing {0}")]
    MissingProperty(&'static str),

    #[error("invalid {property}: {value}")]
    InvalidValue { property: &'static str, value: String },

    #[error("invalid RRULE: {0}")]
    Rule(#[from] RuleError),
}

pub type Result<T> = std::result::Result<T, IcsError>;
