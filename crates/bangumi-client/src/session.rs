//! Request identity for collection fetches.
//!
//! A fetch may still be in flight when the user switches to someone else or
//! asks for a refresh. Each request gets a token; only the result for the
//! most recent token is accepted, so a slow response can never overwrite a
//! newer one.

use tracing::debug;

/// Identity of one fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    user_id: String,
    generation: u64,
}

impl RequestToken {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the latest request and the result currently on display
#[derive(Debug)]
pub struct FetchSession<T> {
    generation: u64,
    pending: Option<RequestToken>,
    current: Option<(String, T)>,
}

impl<T> Default for FetchSession<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
            current: None,
        }
    }
}

impl<T> FetchSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any request still pending.
    ///
    /// Starting a request for a different user drops the result on display.
    pub fn begin(&mut self, user_id: &str) -> RequestToken {
        self.generation += 1;

        if self.current_user().is_some_and(|current| current != user_id) {
            self.current = None;
        }

        let token = RequestToken {
            user_id: user_id.to_string(),
            generation: self.generation,
        };
        self.pending = Some(token.clone());
        token
    }

    /// Whether `token` is still the latest request
    pub fn is_latest(&self, token: &RequestToken) -> bool {
        self.pending.as_ref() == Some(token)
    }

    /// Accept a result if its request is still the latest.
    ///
    /// Returns false when the result is stale and was discarded.
    pub fn complete(&mut self, token: &RequestToken, value: T) -> bool {
        if !self.is_latest(token) {
            debug!(
                user_id = %token.user_id,
                generation = token.generation,
                latest = self.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        self.pending = None;
        self.current = Some((token.user_id.clone(), value));
        true
    }

    /// Record that a request failed; returns false if it was already stale
    pub fn fail(&mut self, token: &RequestToken) -> bool {
        if !self.is_latest(token) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Forget the pending request and the displayed result
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.current = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref().map(|(_, value)| value)
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current.as_ref().map(|(user, _)| user.as_str())
    }
}
