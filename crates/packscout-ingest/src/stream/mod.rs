//! Message streams feeding the pipeline.
//!
//! Backfill reads every source from its cursor with a cooldown between
//! messages, listen mode follows the live feed. Streams of several sources
//! are merged into one.

mod merge;
mod source;

pub use merge::merge;
pub use source::SourceStream;

use std::sync::Arc;
use std::time::Duration;

use packscout_cache::CursorStore;
use packscout_common::IngestMode;
use packscout_core::{ChatTransport, MessageStream};

use crate::halt::HaltedSources;

/// Build the merged message stream for the given mode.
///
/// Backfill streams end once their source shows up in `halted`.
pub fn message_stream(
    mode: IngestMode,
    transport: &Arc<dyn ChatTransport>,
    cursors: &CursorStore,
    halted: &HaltedSources,
    sources: &[String],
    cooldown: Duration,
) -> MessageStream {
    match mode {
        IngestMode::Scrape => merge(
            sources
                .iter()
                .map(|source| {
                    SourceStream::backfill(
                        transport.clone(),
                        cursors.clone(),
                        halted.clone(),
                        source,
                        cooldown,
                    )
                })
                .collect(),
        ),
        IngestMode::Listen => SourceStream::live(transport.as_ref(), sources),
    }
}
