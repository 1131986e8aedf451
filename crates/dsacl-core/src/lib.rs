//! dsacl Core - Foundation crate for the data source permission form.
//!
//! This crate provides shared types, error handling, configuration management,
//! and logging setup that the form crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Identifier newtypes, picker records, target kinds and permission levels
//! - [`logging`] - tracing subscriber initialisation
//!
//! # Example
//!
//! ```rust
//! use dsacl_core::{AppConfig, PermissionLevel, TargetKind};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.form.default_target, TargetKind::Team);
//! assert_eq!(config.form.default_permission, PermissionLevel::Query);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, FormConfig, LoggingConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use logging::init_tracing;
pub use types::{PermissionLevel, TargetKind, Team, TeamId, User, UserId};
