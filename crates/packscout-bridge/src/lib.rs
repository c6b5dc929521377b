//! # packscout-bridge
//!
//! `ChatTransport` implementation backed by a transport bridge: a small HTTP
//! service in front of the chat platform that exposes message history, a
//! long-poll update feed, emoji packs and emoji documents as JSON.
//!
//! ## Example
//!
//! ```ignore
//! use packscout_bridge::BridgeClient;
//!
//! let client = BridgeClient::from_config(&config.bridge)?;
//! let pack = client.fetch_pack_by_name("foo").await?;
//! ```

pub mod client;
pub mod error;
pub mod wire;

pub use client::BridgeClient;
pub use error::{BridgeError, BridgeResult};
