//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Logging → Config → Metrics → Sink → Limiter + reaper → Listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Reaper and reload loop exit → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
