//! Intake gateway for untrusted form submissions.
//!
//! Accepts JSON form posts, throttles each client with a fixed-window
//! limiter, validates fields, drops honeypot-flagged spam without telling the
//! caller, and hands everything else to a delivery sink.

pub mod config;
pub mod delivery;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod submission;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
