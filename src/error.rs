//! Crate-level error types.

use std::fmt;

use crate::engine::EngineError;
use crate::preference::PreferenceError;

/// Errors produced by the folio crate.
#[derive(Debug)]
pub enum FolioError {
    /// The animation engine or viewport observer failed.
    Engine(EngineError),
    /// The motion preference could not be read or watched.
    Preference(PreferenceError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for FolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "animation engine error: {e}"),
            Self::Preference(e) => write!(f, "motion preference error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for FolioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Preference(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<EngineError> for FolioError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<PreferenceError> for FolioError {
    fn from(e: PreferenceError) -> Self {
        Self::Preference(e)
    }
}

impl From<std::io::Error> for FolioError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
