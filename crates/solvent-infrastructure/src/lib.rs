//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns around the resolver.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment configuration: defaults, TOML file, environment |
//! | [`logging`] | Structured logging with tracing |
//! | [`bootstrap`] | Configured [`Injector`](solvent_application::Injector) construction |
//! | [`error_ext`] | Context helpers mapping foreign errors into the domain error |
//! | [`constants`] | Centralized infrastructure constants |
//!
//! ## Example
//!
//! ```no_run
//! use solvent_infrastructure::bootstrap::build_injector;
//! use solvent_infrastructure::config::ConfigLoader;
//! use solvent_application::Provider;
//! use std::sync::Arc;
//!
//! # fn main() -> solvent_domain::Result<()> {
//! let config = ConfigLoader::new().load()?;
//! let injector = build_injector(&config, Arc::new(Provider::new()));
//! # let _ = injector;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use bootstrap::{build_injector, inject_options};
pub use config::{AppConfig, ConfigBuilder, ConfigLoader, LoggingConfig, ResolverConfig};
pub use error_ext::ErrorContext;
