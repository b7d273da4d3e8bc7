use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::debug;

use stockdeck_core::{Endpoints, FetchChain, HttpClient, InstrumentSnapshot, Symbol};

use crate::error::ClientError;

/// Tri-state (plus idle) result of the current instrument lookup.
///
/// Exactly one variant holds at a time; only [`SelectionPipeline`] writes
/// it. A successful lookup replaces the snapshot atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RetrievalState {
    #[default]
    Idle,
    Loading,
    Success(InstrumentSnapshot),
    Error(String),
}

impl RetrievalState {
    pub fn snapshot(&self) -> Option<&InstrumentSnapshot> {
        match self {
            Self::Success(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Shared sink for instrument selection.
///
/// Receives a symbol from the search controller, a direct submit, or the
/// query dispatcher, performs the canonical data fetch through the fallback
/// chain, and publishes the outcome.
///
/// Overlapping selections are resolved by generation token: each `select`
/// bumps the generation, and an outcome is applied only if its token is
/// still current when the fetch resolves. Responses arriving out of
/// initiation order are silently discarded, so the final observed state
/// always reflects the most recently initiated selection.
pub struct SelectionPipeline {
    chain: FetchChain,
    endpoints: Arc<Endpoints>,
    generation: Mutex<u64>,
    state: watch::Sender<RetrievalState>,
}

impl SelectionPipeline {
    pub fn new(http: Arc<dyn HttpClient>, endpoints: Arc<Endpoints>) -> Self {
        let (state, _) = watch::channel(RetrievalState::default());
        Self {
            chain: FetchChain::new(http),
            endpoints,
            generation: Mutex::new(0),
            state,
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<RetrievalState> {
        self.state.subscribe()
    }

    /// Current state, cloned.
    pub fn state(&self) -> RetrievalState {
        self.state.borrow().clone()
    }

    /// Start a lookup for `input` (trimmed and upper-cased first).
    ///
    /// Publishes `Loading` immediately, then `Success` or `Error` when this
    /// selection resolves, unless a newer selection superseded it in the
    /// meantime. Completion of the returned future does not imply the
    /// outcome was applied.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] for blank input; no state changes
    /// and no network calls happen in that case.
    pub async fn select(&self, input: &str) -> Result<(), ClientError> {
        let symbol = Symbol::parse(input)?;

        let token = {
            let mut generation = self.generation.lock().unwrap();
            *generation += 1;
            // Publish under the lock so Loading transitions keep initiation order.
            self.state.send_replace(RetrievalState::Loading);
            *generation
        };

        let outcome = self
            .chain
            .fetch::<InstrumentSnapshot>(self.endpoints.data_chain(), symbol.as_str())
            .await;

        let generation = self.generation.lock().unwrap();
        if *generation != token {
            debug!(symbol = %symbol, token, "discarding superseded lookup result");
            return Ok(());
        }

        match outcome {
            Ok(snapshot) => {
                self.state.send_replace(RetrievalState::Success(snapshot));
            }
            Err(error) => {
                self.state
                    .send_replace(RetrievalState::Error(error.to_string()));
            }
        }

        Ok(())
    }
}
