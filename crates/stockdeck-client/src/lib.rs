//! Data-retrieval orchestration for stockdeck.
//!
//! This crate decides which upstream source to query, in what order, with
//! what timing, and how to degrade when a source is unavailable or slow:
//!
//! - [`SearchController`] debounces keystrokes and fetches candidates
//! - [`QueryDispatcher`] relays natural-language queries
//! - [`SelectionPipeline`] performs the canonical data fetch and owns the
//!   tri-state retrieval result
//!
//! Rendering is a pure external consumer: each component publishes its
//! state over a `tokio::sync::watch` channel and nothing here draws
//! anything.

pub mod error;
pub mod pipeline;
pub mod query;
pub mod search;

pub use error::ClientError;
pub use pipeline::{RetrievalState, SelectionPipeline};
pub use query::{QueryAnswer, QueryDispatcher, QueryExchange};
pub use search::{SearchController, SearchPanel, DEBOUNCE};

use std::sync::Arc;

use stockdeck_core::{Endpoints, HttpClient};

/// One user-facing session wiring the three entry points to the shared
/// selection pipeline. No state survives across sessions.
pub struct Session {
    pipeline: Arc<SelectionPipeline>,
    search: SearchController,
    query: QueryDispatcher,
}

impl Session {
    pub fn new(http: Arc<dyn HttpClient>, endpoints: Endpoints) -> Self {
        let endpoints = Arc::new(endpoints);
        let pipeline = Arc::new(SelectionPipeline::new(http.clone(), endpoints.clone()));
        let search = SearchController::new(http.clone(), endpoints.clone(), pipeline.clone());
        let query = QueryDispatcher::new(http, endpoints, pipeline.clone());
        Self {
            pipeline,
            search,
            query,
        }
    }

    pub fn pipeline(&self) -> &Arc<SelectionPipeline> {
        &self.pipeline
    }

    pub fn search(&mut self) -> &mut SearchController {
        &mut self.search
    }

    pub fn query(&self) -> &QueryDispatcher {
        &self.query
    }
}
