use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use stockdeck_core::{Endpoints, HttpClient, HttpRequest};

use crate::error::ClientError;
use crate::pipeline::SelectionPipeline;

const GENERIC_FAILURE: &str = "Failed to process query";

/// Structured answer to a natural-language query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
    pub text: String,
    /// Instrument reference embedded in the answer, if the backend resolved
    /// one. When present it has also been forwarded to the selection
    /// pipeline.
    pub symbol: Option<String>,
}

/// One natural-language request/response exchange. A new submission or an
/// explicit clear discards the prior exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryExchange {
    #[default]
    Idle,
    Pending {
        query: String,
    },
    Answered {
        query: String,
        answer: QueryAnswer,
    },
    Failed {
        query: String,
        message: String,
    },
}

impl QueryExchange {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

#[derive(Serialize)]
struct NlpRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct NlpStockData {
    symbol: Option<String>,
}

#[derive(Deserialize)]
struct NlpResponse {
    #[serde(default)]
    success: bool,
    response: Option<String>,
    stock_data: Option<NlpStockData>,
    error: Option<String>,
}

/// Dispatches free-form natural-language queries to the NLP backend and
/// relays the structured result.
///
/// One exchange is outstanding at a time; while `Pending`, further submits
/// are rejected with [`ClientError::Busy`]. When a successful answer embeds
/// an instrument reference, that symbol is forwarded to the selection
/// pipeline as a side effect.
pub struct QueryDispatcher {
    http: Arc<dyn HttpClient>,
    endpoints: Arc<Endpoints>,
    pipeline: Arc<SelectionPipeline>,
    exchange: watch::Sender<QueryExchange>,
}

impl QueryDispatcher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoints: Arc<Endpoints>,
        pipeline: Arc<SelectionPipeline>,
    ) -> Self {
        let (exchange, _) = watch::channel(QueryExchange::default());
        Self {
            http,
            endpoints,
            pipeline,
            exchange,
        }
    }

    /// Observe exchange transitions.
    pub fn subscribe(&self) -> watch::Receiver<QueryExchange> {
        self.exchange.subscribe()
    }

    pub fn exchange(&self) -> QueryExchange {
        self.exchange.borrow().clone()
    }

    /// Submit a natural-language query.
    ///
    /// # Errors
    ///
    /// Whitespace-only input returns [`ClientError::EmptyInput`] and an
    /// outstanding exchange returns [`ClientError::Busy`]; neither touches
    /// the network or the exchange state. Backend failures are not errors
    /// here: they land in [`QueryExchange::Failed`].
    pub async fn submit(&self, text: &str) -> Result<(), ClientError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ClientError::EmptyInput);
        }
        if self.exchange.borrow().is_pending() {
            return Err(ClientError::Busy);
        }

        // Replaces any prior answer or error before the network call.
        self.exchange.send_replace(QueryExchange::Pending {
            query: query.to_owned(),
        });

        match self.round_trip(query).await {
            Ok(response) if response.success => {
                let answer = QueryAnswer {
                    text: response.response.unwrap_or_default(),
                    symbol: response.stock_data.and_then(|data| data.symbol),
                };

                if let Some(symbol) = answer.symbol.clone() {
                    if let Err(error) = self.pipeline.select(&symbol).await {
                        warn!(symbol = %symbol, error = %error, "embedded symbol rejected");
                    }
                }

                self.exchange.send_replace(QueryExchange::Answered {
                    query: query.to_owned(),
                    answer,
                });
            }
            Ok(response) => {
                self.exchange.send_replace(QueryExchange::Failed {
                    query: query.to_owned(),
                    message: response.error.unwrap_or_else(|| GENERIC_FAILURE.to_owned()),
                });
            }
            Err(message) => {
                self.exchange.send_replace(QueryExchange::Failed {
                    query: query.to_owned(),
                    message,
                });
            }
        }

        Ok(())
    }

    /// Reset to the empty exchange unconditionally.
    pub fn clear(&self) {
        self.exchange.send_replace(QueryExchange::Idle);
    }

    async fn round_trip(&self, query: &str) -> Result<NlpResponse, String> {
        let body = serde_json::to_string(&NlpRequest { query })
            .map_err(|e| format!("failed to encode query: {e}"))?;

        let request = HttpRequest::post(self.endpoints.nlp_url()).with_json_body(body);
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| e.message().to_owned())?;

        let parsed: Option<NlpResponse> = serde_json::from_str(&response.body).ok();

        if !response.is_success() {
            // Prefer the backend-supplied message when the error body parses.
            let message = parsed
                .and_then(|p| p.error)
                .unwrap_or_else(|| GENERIC_FAILURE.to_owned());
            return Err(message);
        }

        parsed.ok_or_else(|| GENERIC_FAILURE.to_owned())
    }
}
