//! Turns a stream of query changes into cancelable, non-blocking searches.
//!
//! Cancellation is cooperative: every `submit` bumps an atomic generation
//! counter, and a finished batch is delivered only if its generation still
//! matches the counter. Superseded source calls run to completion but their
//! output is dropped unread; nothing is hard-killed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::logging;
use crate::model::ResultItem;
use crate::source::SearchSource;

/// One logical unit of work and its outcome. `generation` is the sole
/// cancellation token; exactly one generation is current at any instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBatch {
    pub query: String,
    pub generation: u64,
    pub items: Vec<ResultItem>,
}

pub type DeliveryFn = Arc<dyn Fn(ResultBatch) + Send + Sync>;

pub struct QueryDispatcher {
    sources: Vec<Arc<dyn SearchSource>>,
    deliver: DeliveryFn,
    generation: Arc<AtomicU64>,
}

impl QueryDispatcher {
    /// `sources` is the fixed priority order results are merged in.
    pub fn new(sources: Vec<Arc<dyn SearchSource>>, deliver: DeliveryFn) -> Self {
        Self {
            sources,
            deliver,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fire-and-forget. Assigns a fresh generation, which immediately makes
    /// every in-flight query stale. A blank query delivers an empty batch
    /// synchronously and touches no source; anything else fans out one
    /// worker per source and merges once all of them finish.
    pub fn submit(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let trimmed = query.trim();
        if trimmed.is_empty() {
            (self.deliver)(ResultBatch {
                query: String::new(),
                generation,
                items: Vec::new(),
            });
            return;
        }

        let query = trimmed.to_string();
        let sources = self.sources.clone();
        let deliver = Arc::clone(&self.deliver);
        let current = Arc::clone(&self.generation);

        std::thread::spawn(move || {
            let mut workers = Vec::with_capacity(sources.len());
            for source in sources {
                let per_source_query = query.clone();
                workers.push(std::thread::spawn(move || {
                    run_source(source.as_ref(), &per_source_query)
                }));
            }

            // Joining in configured order gives the fixed merge order no
            // matter which worker finishes first.
            let mut items = Vec::new();
            for worker in workers {
                match worker.join() {
                    Ok(batch) => items.extend(batch),
                    Err(_) => logging::error("search worker panicked; dropping its results"),
                }
            }

            if current.load(Ordering::SeqCst) == generation {
                deliver(ResultBatch {
                    query,
                    generation,
                    items,
                });
            }
        });
    }

    /// Marks every in-flight query stale without submitting a new one. Used
    /// when the controller switches modes and pending free-search results
    /// must never surface.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

fn run_source(source: &dyn SearchSource, query: &str) -> Vec<ResultItem> {
    match catch_unwind(AssertUnwindSafe(|| source.search(query))) {
        Ok(Ok(items)) => items,
        Ok(Err(error)) => {
            logging::warn(&format!(
                "source '{}' failed for query: {error}",
                source.source_name()
            ));
            Vec::new()
        }
        Err(_) => {
            logging::error(&format!("source '{}' panicked", source.source_name()));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryDispatcher, ResultBatch};
    use crate::model::ResultItem;
    use crate::source::{SearchSource, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{channel, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl SearchSource for CountingSource {
        fn source_name(&self) -> &'static str {
            "counting"
        }

        fn search(&self, _query: &str) -> Result<Vec<ResultItem>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn channel_delivery() -> (super::DeliveryFn, std::sync::mpsc::Receiver<ResultBatch>) {
        let (tx, rx) = channel();
        let tx: Mutex<Sender<ResultBatch>> = Mutex::new(tx);
        let deliver: super::DeliveryFn = Arc::new(move |batch| {
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(batch);
            }
        });
        (deliver, rx)
    }

    #[test]
    fn blank_query_skips_sources_and_delivers_synchronously() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (deliver, rx) = channel_delivery();
        let dispatcher = QueryDispatcher::new(
            vec![Arc::new(CountingSource {
                calls: Arc::clone(&calls),
            })],
            deliver,
        );

        dispatcher.submit("   ");

        let batch = rx.try_recv().expect("empty batch should already be there");
        assert!(batch.items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalidate_makes_inflight_work_stale() {
        let (deliver, rx) = channel_delivery();
        let dispatcher = QueryDispatcher::new(Vec::new(), deliver);

        dispatcher.submit("anything");
        dispatcher.invalidate();
        assert_eq!(dispatcher.current_generation(), 2);
        // The submit either delivered before the invalidate or was dropped;
        // in both cases no batch for generation 2 ever appears.
        while let Ok(batch) = rx.recv_timeout(Duration::from_millis(200)) {
            assert_eq!(batch.generation, 1);
        }
    }
}
