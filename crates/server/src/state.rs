//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;

use crate::services::{Dispatcher, PreviewService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    signing_secret: SecretString,
    previews: PreviewService,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("signing_secret", &"[REDACTED]")
            .field("previews", &self.inner.previews)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the shared state.
    #[must_use]
    pub fn new(signing_secret: SecretString, previews: PreviewService, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                signing_secret,
                previews,
                dispatcher,
            }),
        }
    }

    /// Slack signing secret used to verify inbound requests.
    #[must_use]
    pub fn signing_secret(&self) -> &SecretString {
        &self.inner.signing_secret
    }

    #[must_use]
    pub fn previews(&self) -> &PreviewService {
        &self.inner.previews
    }

    /// Background task dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}
