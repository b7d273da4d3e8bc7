use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use stockdeck_core::{Candidate, Endpoints, FetchChain, HttpClient};

use crate::error::ClientError;
use crate::pipeline::SelectionPipeline;

/// Quiet interval after the last keystroke before a search fires.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Queries shorter than this never reach the network.
const MIN_QUERY_CHARS: usize = 2;

/// Observable state of the search results panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPanel {
    pub candidates: Vec<Candidate>,
    pub visible: bool,
    /// A search fetch is currently in flight.
    pub searching: bool,
}

struct SearchShared {
    chain: FetchChain,
    endpoints: Arc<Endpoints>,
    seq: Mutex<u64>,
    panel: watch::Sender<SearchPanel>,
}

impl SearchShared {
    /// Run one settled search. Each search takes a fresh sequence number;
    /// the outcome is applied only if that number is still the latest when
    /// the fetch resolves, so a slow response for an earlier keystroke can
    /// never clobber a newer result.
    async fn run_search(&self, query: String) {
        let token = {
            let mut seq = self.seq.lock().unwrap();
            *seq += 1;
            *seq
        };

        self.panel.send_modify(|panel| panel.searching = true);

        let result = self
            .chain
            .fetch::<Vec<Candidate>>(self.endpoints.search_chain(), &query)
            .await;

        let seq = self.seq.lock().unwrap();
        if *seq != token {
            debug!(query = %query, token, "discarding superseded search result");
            return;
        }

        match result {
            Ok(candidates) => {
                self.panel.send_replace(SearchPanel {
                    candidates,
                    visible: true,
                    searching: false,
                });
            }
            Err(error) => {
                // Search failures are non-fatal: the user can still submit
                // the raw text, so log and clear instead of surfacing.
                warn!(query = %query, error = %error, "search failed, clearing results");
                self.panel.send_replace(SearchPanel::default());
            }
        }
    }

    /// Invalidate any in-flight search without issuing a new one.
    fn supersede(&self) {
        let mut seq = self.seq.lock().unwrap();
        *seq += 1;
    }
}

/// Debounced search controller.
///
/// Watches keystrokes and invokes the fallback fetch chain (search chain)
/// only after input has settled for [`DEBOUNCE`]. Short input clears the
/// panel immediately. Selecting a candidate or submitting the raw text
/// hands a normalized symbol to the [`SelectionPipeline`] and closes the
/// panel.
pub struct SearchController {
    shared: Arc<SearchShared>,
    pipeline: Arc<SelectionPipeline>,
    timer: Option<JoinHandle<()>>,
    query: String,
}

impl SearchController {
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoints: Arc<Endpoints>,
        pipeline: Arc<SelectionPipeline>,
    ) -> Self {
        let (panel, _) = watch::channel(SearchPanel::default());
        Self {
            shared: Arc::new(SearchShared {
                chain: FetchChain::new(http),
                endpoints,
                seq: Mutex::new(0),
                panel,
            }),
            pipeline,
            timer: None,
            query: String::new(),
        }
    }

    /// Observe panel changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchPanel> {
        self.shared.panel.subscribe()
    }

    pub fn panel(&self) -> SearchPanel {
        self.shared.panel.borrow().clone()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Record a keystroke.
    ///
    /// Cancels any armed debounce timer and re-arms it for the new text;
    /// only the most recent keystroke's timer can ever fire. Input of one
    /// character or less clears the panel and issues no fetch.
    pub fn input(&mut self, text: &str) {
        self.cancel_timer();
        self.query = text.to_owned();

        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            self.shared.supersede();
            self.shared.panel.send_replace(SearchPanel::default());
            return;
        }

        let shared = Arc::clone(&self.shared);
        let query = trimmed.to_owned();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            shared.run_search(query).await;
        }));
    }

    /// Select a candidate from the panel: close it and hand the symbol to
    /// the pipeline.
    pub async fn choose(&mut self, symbol: &str) -> Result<(), ClientError> {
        self.query = symbol.to_owned();
        self.close_panel();
        self.pipeline.select(symbol).await
    }

    /// Submit the raw query text directly, bypassing the debounce.
    ///
    /// # Errors
    ///
    /// Blank text is rejected as [`ClientError::Invalid`]; the retrieval
    /// state is left untouched in that case.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let query = self.query.clone();
        self.close_panel();
        self.pipeline.select(&query).await
    }

    fn close_panel(&mut self) {
        self.cancel_timer();
        self.shared.supersede();
        // Superseding may have aborted a search mid-flight, so the in-flight
        // marker has to be cleared here; the aborted task never will.
        self.shared.panel.send_modify(|panel| {
            panel.visible = false;
            panel.searching = false;
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        // Armed timers must not outlive the controller.
        self.cancel_timer();
    }
}
