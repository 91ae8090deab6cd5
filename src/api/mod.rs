pub mod client;
pub mod models;

pub use client::{Backend, HttpBackend};
pub use models::{HealthResponse, interpret_search_response};
