use serde::{Deserialize, Serialize};

/// One search result. Produced fresh per query; a new search replaces the
/// whole list, so candidates carry no identity beyond it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub exchange: Option<String>,
}

/// Closing-price series as parallel ordered arrays, matching the wire shape
/// (`price_history.dates` / `price_history.prices`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub prices: Vec<f64>,
}

/// One news record. The live and sample upstreams emit different subsets of
/// these fields, so everything beyond the title is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub publisher: Option<String>,
    /// Unix seconds from one upstream, a formatted timestamp from another.
    #[serde(rename = "providerPublishTime")]
    pub published_at: Option<serde_json::Value>,
    pub summary: Option<String>,
}

/// One analyst recommendation record. Field names are capitalized on the
/// wire (`Firm`, `To_Grade`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "Firm")]
    pub firm: Option<String>,
    #[serde(rename = "To_Grade")]
    pub to_grade: Option<String>,
    #[serde(rename = "From_Grade")]
    pub from_grade: Option<String>,
    #[serde(rename = "Action")]
    pub action: Option<String>,
    #[serde(rename = "Period")]
    pub period: Option<String>,
}

/// The full data payload for one instrument.
///
/// Owned by the selection pipeline for the duration of one lookup and
/// replaced atomically on the next successful lookup, never partially
/// mutated. Scalar metrics are optional because sparse upstream payloads
/// must still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub symbol: String,
    pub company_name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub volume: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub price_history: PriceHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sample_payload_deserializes() {
        let body = r#"{
            "symbol": "AAPL",
            "current_price": 150.25,
            "company_name": "AAPL Test Company Inc.",
            "market_cap": 2500000000000,
            "pe_ratio": 25.4,
            "dividend_yield": 0.024,
            "volume": 45678901,
            "day_high": 152.30,
            "day_low": 148.90,
            "fifty_two_week_high": 180.95,
            "fifty_two_week_low": 125.20,
            "sector": "Technology",
            "industry": "Consumer Electronics",
            "summary": "This is a test company.",
            "news": [
                {
                    "title": "AAPL reaches new highs",
                    "publisher": "Test News Network",
                    "link": "https://example.com/test",
                    "providerPublishTime": 1692460800
                }
            ],
            "recommendations": [
                {
                    "Firm": "Test Investment Bank",
                    "To_Grade": "Buy",
                    "From_Grade": "Hold",
                    "Action": "up",
                    "Period": "2024-01-15"
                }
            ],
            "price_history": {
                "dates": ["2024-01-01", "2024-02-01"],
                "prices": [140.5, 145.2]
            }
        }"#;

        let snapshot: InstrumentSnapshot = serde_json::from_str(body).expect("should parse");
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.current_price, Some(150.25));
        assert_eq!(snapshot.news.len(), 1);
        assert_eq!(
            snapshot.recommendations[0].to_grade.as_deref(),
            Some("Buy")
        );
        assert_eq!(snapshot.price_history.dates.len(), 2);
        assert_eq!(snapshot.price_history.prices.len(), 2);
    }

    #[test]
    fn sparse_payload_still_deserializes() {
        let snapshot: InstrumentSnapshot =
            serde_json::from_str(r#"{"symbol": "TLT"}"#).expect("should parse");
        assert_eq!(snapshot.symbol, "TLT");
        assert_eq!(snapshot.current_price, None);
        assert!(snapshot.news.is_empty());
        assert!(snapshot.price_history.dates.is_empty());
    }

    #[test]
    fn candidate_tolerates_partial_records() {
        let body = r#"[
            {"symbol": "AAPL", "name": "Apple Inc.", "type": "Equity", "exchange": "United States - USD"},
            {"symbol": "APLE"}
        ]"#;

        let candidates: Vec<Candidate> = serde_json::from_str(body).expect("should parse");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].kind.as_deref(), Some("Equity"));
        assert_eq!(candidates[1].name, None);
    }
}
