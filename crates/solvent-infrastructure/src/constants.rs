//! Infrastructure layer constants
//!
//! Resolver defaults live in `solvent_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "solvent.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "solvent";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "SOLVENT";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "SOLVENT_LOG";

/// File name prefix of rolled log files
pub const LOG_FILE_PREFIX: &str = "solvent";

/// Maximum number of rolled log files to keep
pub const LOG_MAX_FILES: usize = 7;
