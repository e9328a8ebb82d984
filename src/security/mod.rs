//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming submission:
//!     → client_key.rs (derive the caller's key from forwarding headers)
//!     → rate_limit.rs (fixed-window admit/deny per key)
//!     → [body parsed and validated by submission::schema]
//!     → honeypot.rs (flag automated form filling)
//! ```
//!
//! # Design Decisions
//! - Throttle before parsing: rejected callers cost one map lookup
//! - Spam is never reported back to the caller
//! - Rate-limit state is process-local and lives behind `RateLimitStore`

pub mod client_key;
pub mod honeypot;
pub mod rate_limit;

pub use client_key::{resolve_client_key, ClientKey};
pub use honeypot::is_spam;
pub use rate_limit::{FixedWindowLimiter, RateLimitEntry, RateLimitStore, Reaper, WindowPolicy};
