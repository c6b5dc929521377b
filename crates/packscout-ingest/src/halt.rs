//! Sources stopped for the rest of a run

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

/// Halted source names, shared by the pipeline and the source streams.
///
/// The pipeline halts a source when persisting one of its messages fails;
/// a backfill stream checks the set before fetching its next message and
/// ends once its source is in it.
#[derive(Debug, Clone, Default)]
pub struct HaltedSources {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl HaltedSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Halt a source; `false` if it was already halted
    pub fn halt(&self, source: &str) -> bool {
        self.inner.write().insert(source.to_string())
    }

    pub fn contains(&self, source: &str) -> bool {
        self.inner.read().contains(source)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
