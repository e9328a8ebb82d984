//! Honeypot check for automated form filling.
//!
//! The `website` field is rendered hidden and out of tab order, so people never
//! fill it in. Form-filling bots usually do.

use crate::submission::ValidatedSubmission;

/// True when the honeypot carries anything besides whitespace.
pub fn is_spam(submission: &ValidatedSubmission) -> bool {
    submission
        .website
        .as_deref()
        .is_some_and(|website| !website.trim().is_empty())
}
