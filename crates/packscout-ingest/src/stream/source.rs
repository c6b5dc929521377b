//! Paced, resumable message stream of one source

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use packscout_cache::CursorStore;
use packscout_core::{ChatTransport, MessageStream};

use crate::halt::HaltedSources;

/// Backfill progress of one source
enum State {
    /// Cursor not read yet
    Resuming {
        transport: Arc<dyn ChatTransport>,
        cursors: CursorStore,
    },
    /// Reading history; `paced` once a message has been handed out
    Paginating { history: MessageStream, paced: bool },
    Exhausted,
}

/// Message streams of single sources
pub struct SourceStream;

impl SourceStream {
    /// History of `source` after its cursor, oldest first.
    ///
    /// The cursor is read when the stream is first polled. After each
    /// message the stream waits `cooldown` before asking the transport for
    /// the next one. A transport failure ends the stream; a cache failure
    /// while reading the cursor is yielded as an error. The stream also ends,
    /// without fetching further, once `source` appears in `halted`.
    pub fn backfill(
        transport: Arc<dyn ChatTransport>,
        cursors: CursorStore,
        halted: HaltedSources,
        source: &str,
        cooldown: Duration,
    ) -> MessageStream {
        let source = source.to_string();
        let initial = State::Resuming { transport, cursors };

        stream::unfold(initial, move |mut state| {
            let source = source.clone();
            let halted = halted.clone();
            async move {
                loop {
                    state = match state {
                        State::Resuming { transport, cursors } => {
                            match cursors.get(&source).await {
                                Ok(after_id) => {
                                    tracing::info!(
                                        source = %source,
                                        after_id = %after_id,
                                        "Resuming source backfill"
                                    );
                                    State::Paginating {
                                        history: transport.paginate(&source, after_id),
                                        paced: false,
                                    }
                                }
                                Err(e) => return Some((Err(e), State::Exhausted)),
                            }
                        }
                        State::Paginating { mut history, paced } => {
                            if halted.contains(&source) {
                                tracing::warn!(source = %source, "Source halted, stopping backfill");
                                return None;
                            }

                            if paced && !cooldown.is_zero() {
                                tracing::debug!(
                                    source = %source,
                                    cooldown_ms = cooldown.as_millis() as u64,
                                    "Cooling down"
                                );
                                tokio::time::sleep(cooldown).await;

                                if halted.contains(&source) {
                                    tracing::warn!(source = %source, "Source halted, stopping backfill");
                                    return None;
                                }
                            }

                            match history.next().await {
                                Some(Ok(message)) => {
                                    return Some((
                                        Ok(message),
                                        State::Paginating {
                                            history,
                                            paced: true,
                                        },
                                    ));
                                }
                                Some(Err(e)) => {
                                    tracing::warn!(
                                        source = %source,
                                        error = %e,
                                        "History pagination failed, ending source"
                                    );
                                    State::Exhausted
                                }
                                None => {
                                    tracing::info!(source = %source, "Source backfill complete");
                                    State::Exhausted
                                }
                            }
                        }
                        State::Exhausted => return None,
                    };
                }
            }
        })
        .boxed()
    }

    /// Live feed of new messages from `sources`, unpaced
    pub fn live(transport: &dyn ChatTransport, sources: &[String]) -> MessageStream {
        tracing::info!(sources = ?sources, "Subscribing to live messages");
        transport.subscribe(sources)
    }
}
