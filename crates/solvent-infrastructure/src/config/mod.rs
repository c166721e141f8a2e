//! Configuration
//!
//! Sources are merged with Figment, later ones winning:
//!
//! ```text
//!   AppConfig::default()  ◀──  solvent.toml  ◀──  SOLVENT_* environment
//! ```
//!
//! Nested keys in environment variables are separated by `__`, e.g.
//! `SOLVENT_RESOLVER__MAX_BLOCKING_WORKERS=4`.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, LoggingConfig, ResolverConfig};
