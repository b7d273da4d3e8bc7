use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::endpoints::EndpointTemplate;
use crate::error::FetchError;
use crate::http::{HttpClient, HttpRequest};

/// Fallback fetch chain: tries an ordered list of interchangeable endpoints
/// and returns the first successful, parsed payload.
///
/// Each endpoint gets exactly one attempt per call; there is no retry with
/// backoff and no memoization. Non-2xx status, transport failure, and a
/// malformed body are all treated uniformly as "try the next endpoint".
pub struct FetchChain {
    http: Arc<dyn HttpClient>,
}

impl FetchChain {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch `key` through `endpoints`, primary first.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::EmptyChain`] for an empty endpoint list and
    /// [`FetchError::AllSourcesExhausted`] (carrying the last underlying
    /// error) when every endpoint failed.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoints: &[EndpointTemplate],
        key: &str,
    ) -> Result<T, FetchError> {
        let mut last: Option<FetchError> = None;

        for template in endpoints {
            let url = template.expand(key);
            debug!(url = %url, "attempting endpoint");

            match self.attempt(&url).await {
                Ok(payload) => return Ok(payload),
                Err(error) => {
                    warn!(url = %url, error = %error, "endpoint failed, trying next");
                    last = Some(error);
                }
            }
        }

        let Some(last) = last else {
            return Err(FetchError::EmptyChain);
        };
        Err(FetchError::AllSourcesExhausted {
            last: Box::new(last),
        })
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| FetchError::Network(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(FetchError::Upstream {
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}
