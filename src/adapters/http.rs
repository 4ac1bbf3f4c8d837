//! Shared HTTP plumbing for the outbound adapters.

use std::time::Duration;

use crate::error::ServiceError;

/// Blocking agent with a whole-request timeout, so a stalled server
/// cannot wedge the scheduler runner.
pub fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("airwatch/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub fn map_error(e: ureq::Error) -> ServiceError {
    match e {
        ureq::Error::Status(code, _) => ServiceError::Status(code),
        ureq::Error::Transport(_) => ServiceError::Transport,
    }
}
