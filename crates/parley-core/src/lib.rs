//! Parley Core: shared types, message bus, configuration, and utilities.
//!
//! - **types**: transcript turns, Responses API output items, tool specs
//! - **bus**: inbound/outbound queues between channels and the agent
//! - **config**: JSON config schema, loader, env overrides
//! - **utils**: data directory and path helpers

pub mod bus;
pub mod config;
pub mod types;
pub mod utils;
