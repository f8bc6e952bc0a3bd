//! Query engine over the record store
//!
//! Filtering, identifier lookup and ranked name search. Nothing here ever
//! mutates a dataset.

pub mod engine;
pub mod filter;
pub mod ranking;


pub use engine::{FilterValues, NameSearchResponse, QueryEngine, QueryResponse};
pub use filter::Criteria;
