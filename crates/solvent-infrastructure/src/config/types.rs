//! Configuration types

use crate::constants::{DEFAULT_LOG_LEVEL, LOG_MAX_FILES};
use serde::{Deserialize, Serialize};
use solvent_domain::constants::{DEFAULT_CAST, DEFAULT_INJECT_CAST_RESULT, DEFAULT_MAX_BLOCKING_WORKERS};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resolver defaults applied to injected functions
    pub resolver: ResolverConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Synchronous bodies allowed to run at once during async calls
    pub max_blocking_workers: usize,

    /// Validate arguments with the JSON caster
    pub cast: bool,

    /// Cast root results against their return hint
    pub cast_result: bool,

    /// Reject values of the wrong JSON type instead of coercing them
    pub strict: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_blocking_workers: DEFAULT_MAX_BLOCKING_WORKERS,
            cast: DEFAULT_CAST,
            cast_result: DEFAULT_INJECT_CAST_RESULT,
            strict: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,

    /// Maximum number of rolled files to keep
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
            max_files: LOG_MAX_FILES,
        }
    }
}
