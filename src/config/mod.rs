//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, INTAKE_* env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to the server at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the rate-limit policy in place
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the gateway runs with no file at all
//! - Only the rate-limit window and quota are reloadable; the rest needs a restart
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    DeliveryConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, SecurityConfig, SinkConfig, SmtpConfig, SmtpTls, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
