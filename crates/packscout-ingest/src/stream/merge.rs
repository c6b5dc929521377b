//! Fan-in of per-source streams

use futures::stream::{select_all, StreamExt};
use packscout_core::MessageStream;

/// Interleave several streams by readiness.
///
/// Order within each input is kept; there is no ordering across inputs.
/// The merged stream ends once every input has ended.
pub fn merge(streams: Vec<MessageStream>) -> MessageStream {
    select_all(streams).boxed()
}
