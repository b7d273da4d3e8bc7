pub mod models;
pub mod symbol;

pub use models::{Candidate, InstrumentSnapshot, NewsItem, PriceHistory, Recommendation};
pub use symbol::Symbol;
