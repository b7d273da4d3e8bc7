//! Core contracts for stockdeck.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Endpoint templates for the upstream HTTP surface
//! - The fallback fetch chain that tries interchangeable sources in order
//! - HTTP transport abstraction (reqwest in production, scripted offline)

pub mod chain;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod http;

pub use chain::FetchChain;
pub use domain::{
    Candidate, InstrumentSnapshot, NewsItem, PriceHistory, Recommendation, Symbol,
};
pub use endpoints::{EndpointTemplate, Endpoints};
pub use error::{FetchError, ValidationError};
pub use http::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient, ScriptedOutcome,
};
