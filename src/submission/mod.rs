//! Submission handling subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP body + headers
//!     → pipeline.rs (orders the checks, times delivery)
//!     → schema.rs (SubmissionInput → ValidatedSubmission | field errors)
//!     → error.rs (terminal failure states)
//!     → http::response maps the result onto the wire contract
//! ```

pub mod error;
pub mod pipeline;
pub mod schema;

pub use error::SubmissionError;
pub use pipeline::{Acceptance, SubmissionPipeline};
pub use schema::{validate, FieldError, SubmissionInput, ValidatedSubmission};
