#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Advisory Service integration for Sentinel.
//!
//! Flavour text and tactical advice are produced by an [`Advisor`], either a
//! remote text-generation service or a local-only stand-in. Every failure is
//! recovered by substituting a canned line for the requesting call site, so
//! callers always receive displayable text. Requests are dispatched through
//! an [`AdvisoryClient`] which never blocks the simulation.

mod client;
mod fallback;
pub mod prompts;
mod remote;

use thiserror::Error;

pub use client::{AdvisoryClient, AdvisoryOrigin, AdvisoryResponse, AdvisoryTicket};
pub use fallback::fallback_lines;
pub use remote::{RemoteAdvisor, RemoteConfig};

/// Call sites that request text from the Advisory Service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvisoryTopic {
    /// Opening flavour text requested when a session begins.
    OpeningLore,
    /// Flavour text requested whenever a wave is cleared.
    WaveLore,
    /// Tactical tip requested by the player.
    TacticalAdvice,
    /// Message shown once the core has fallen.
    EndTaunt,
}

/// Errors raised while requesting text from the Advisory Service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisoryError {
    /// The advisor runs local-only and never contacts a service.
    #[error("advisory service is unavailable in local-only mode")]
    Unavailable,
    /// The service rejected the request because of rate limiting.
    #[error("advisory service rate limit reached")]
    RateLimited,
    /// The service answered with a non-success status code.
    #[error("advisory service responded with status {0}")]
    Status(u16),
    /// The request could not be delivered.
    #[error("advisory transport failure: {0}")]
    Transport(String),
    /// The response body could not be interpreted.
    #[error("malformed advisory response: {0}")]
    Malformed(String),
    /// The response carried no text.
    #[error("advisory response contained no text")]
    Empty,
}

/// Text source injected into the advisory client.
#[derive(Debug)]
pub enum Advisor {
    /// Contacts a remote text-generation service.
    Remote(RemoteAdvisor),
    /// Never contacts a service; every request falls back to canned text.
    LocalOnly,
}

impl Advisor {
    /// Requests text for the provided prompt.
    pub fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        match self {
            Self::Remote(remote) => remote.generate(prompt),
            Self::LocalOnly => Err(AdvisoryError::Unavailable),
        }
    }

    /// Requests text, substituting a canned line for the topic on failure.
    #[must_use]
    pub fn resolve(&self, topic: AdvisoryTopic, prompt: &str) -> (String, AdvisoryOrigin) {
        match self.generate(prompt) {
            Ok(text) => (text, AdvisoryOrigin::Service),
            Err(AdvisoryError::Unavailable) => {
                (fallback::pick(topic).to_owned(), AdvisoryOrigin::Fallback)
            }
            Err(error) => {
                tracing::warn!(?topic, %error, "advisory request failed, using canned text");
                (fallback::pick(topic).to_owned(), AdvisoryOrigin::Fallback)
            }
        }
    }
}
