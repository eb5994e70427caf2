//! Per-process session identity.
//!
//! The session id is generated once when the subsystem starts and
//! stamped onto every emitted event, so the admin surface can group a
//! tab's events together. It carries no secrets and grants nothing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Identity stamped onto every security event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    id: String,
    client_context: String,
}

impl SessionContext {
    /// Generates a fresh session identity.
    ///
    /// Called exactly once by the composition root; everything else
    /// borrows the cached value.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        let token: u64 = rng.gen();
        Self {
            id: format!("sess-{token:016x}"),
            client_context: format!(
                "tyche/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
        }
    }

    /// Builds a context from fixed parts. Tests use this for stable ids.
    #[must_use]
    pub fn from_parts(id: &str, client_context: &str) -> Self {
        Self {
            id: id.to_owned(),
            client_context: client_context.to_owned(),
        }
    }

    /// The session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The user-agent equivalent string.
    #[must_use]
    pub fn client_context(&self) -> &str {
        &self.client_context
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
