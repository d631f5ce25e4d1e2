//! Remote model layer for Parley.
//!
//! # Architecture
//!
//! - [`traits::ModelProvider`]: the capability the conversation agent calls
//! - [`responses::ResponsesProvider`]: HTTP client for the Responses API
//! - [`error::ProviderError`]: transport, API, and decode failures

pub mod error;
pub mod responses;
pub mod traits;

pub use error::ProviderError;
pub use responses::{to_input_items, ResponsesProvider};
pub use traits::ModelProvider;
