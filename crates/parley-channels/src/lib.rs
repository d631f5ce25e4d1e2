//! Parley Channels: delivery channels for conversation text.
//!
//! This crate provides:
//! - **base**: The `Channel` trait
//! - **manager**: `ChannelManager`: lifecycle and outbound routing
//! - **http**: `HttpChannel`: POST/GET `/chat` plus a browser page at `/app`

pub mod base;
pub mod http;
pub mod manager;

pub use base::Channel;
pub use http::{HttpChannel, HTTP_CHANNEL};
pub use manager::ChannelManager;
