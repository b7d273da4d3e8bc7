/// A path template with a `{key}` placeholder for the symbol or query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Expand the template, percent-encoding the key into the path.
    pub fn expand(&self, key: &str) -> String {
        self.0.replace("{key}", urlencoding::encode(key).as_ref())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The upstream HTTP surface: ordered fallback chains for instrument data
/// and search, plus the natural-language query endpoint.
///
/// Primary endpoints come first; each fallback is tried only after the one
/// before it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    data: Vec<EndpointTemplate>,
    search: Vec<EndpointTemplate>,
    nlp: String,
}

impl Endpoints {
    /// Endpoints rooted at `base` (empty base means same-origin relative
    /// paths), with the default chain layout: live data falling back to the
    /// sample-data endpoint, and the primary search falling back to legacy
    /// search.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            data: vec![
                EndpointTemplate::new(format!("{base}/api/av-stock/{{key}}")),
                EndpointTemplate::new(format!("{base}/api/test/{{key}}")),
            ],
            search: vec![
                EndpointTemplate::new(format!("{base}/api/av-search/{{key}}")),
                EndpointTemplate::new(format!("{base}/api/search/{{key}}")),
            ],
            nlp: format!("{base}/api/nlp-query"),
        }
    }

    /// Fully custom chains, for tests or non-default deployments. Empty
    /// chains are rejected by [`crate::FetchChain`] at call time.
    pub fn custom(
        data: Vec<EndpointTemplate>,
        search: Vec<EndpointTemplate>,
        nlp: impl Into<String>,
    ) -> Self {
        Self {
            data,
            search,
            nlp: nlp.into(),
        }
    }

    pub fn data_chain(&self) -> &[EndpointTemplate] {
        &self.data
    }

    pub fn search_chain(&self) -> &[EndpointTemplate] {
        &self.search
    }

    pub fn nlp_url(&self) -> &str {
        &self.nlp
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chains_match_api_surface() {
        let endpoints = Endpoints::default();

        let data: Vec<_> = endpoints
            .data_chain()
            .iter()
            .map(|t| t.expand("AAPL"))
            .collect();
        assert_eq!(data, vec!["/api/av-stock/AAPL", "/api/test/AAPL"]);

        let search: Vec<_> = endpoints
            .search_chain()
            .iter()
            .map(|t| t.expand("app"))
            .collect();
        assert_eq!(search, vec!["/api/av-search/app", "/api/search/app"]);

        assert_eq!(endpoints.nlp_url(), "/api/nlp-query");
    }

    #[test]
    fn expand_percent_encodes_the_key() {
        let template = EndpointTemplate::new("/api/av-search/{key}");
        assert_eq!(
            template.expand("oil & gas"),
            "/api/av-search/oil%20%26%20gas"
        );
    }

    #[test]
    fn base_url_is_prefixed_without_double_slash() {
        let endpoints = Endpoints::with_base("http://localhost:5001/");
        assert_eq!(
            endpoints.data_chain()[0].expand("SPY"),
            "http://localhost:5001/api/av-stock/SPY"
        );
    }
}
