//! Port traits

mod ports;

pub use ports::{CatalogSink, ChatTransport, KeyValueStore, MessageStream, RepoResult};
