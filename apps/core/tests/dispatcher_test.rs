use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quickbar_core::dispatcher::{DeliveryFn, QueryDispatcher, ResultBatch};
use quickbar_core::model::ResultItem;
use quickbar_core::source::{SearchSource, SourceError};

fn channel_delivery() -> (DeliveryFn, Receiver<ResultBatch>) {
    let (tx, rx) = channel();
    let tx: Mutex<Sender<ResultBatch>> = Mutex::new(tx);
    let deliver: DeliveryFn = Arc::new(move |batch| {
        if let Ok(tx) = tx.lock() {
            let _ = tx.send(batch);
        }
    });
    (deliver, rx)
}

struct FixedSource {
    name: &'static str,
    items: Vec<ResultItem>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FixedSource {
    fn new(name: &'static str, items: Vec<ResultItem>) -> Self {
        Self {
            name,
            items,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl SearchSource for FixedSource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn search(&self, _query: &str) -> Result<Vec<ResultItem>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Ok(self.items.clone())
    }
}

struct FailingSource;

impl SearchSource for FailingSource {
    fn source_name(&self) -> &'static str {
        "failing"
    }

    fn search(&self, _query: &str) -> Result<Vec<ResultItem>, SourceError> {
        Err(SourceError::new("engine offline"))
    }
}

struct PanickingSource;

impl SearchSource for PanickingSource {
    fn source_name(&self) -> &'static str {
        "panicking"
    }

    fn search(&self, _query: &str) -> Result<Vec<ResultItem>, SourceError> {
        panic!("source blew up");
    }
}

/// Blocks on an external gate for one specific query; answers everything
/// else immediately. Used to pin the stale-drop ordering.
struct GatedSource {
    blocked_query: &'static str,
    gate: Mutex<Option<Receiver<()>>>,
}

impl SearchSource for GatedSource {
    fn source_name(&self) -> &'static str {
        "gated"
    }

    fn search(&self, query: &str) -> Result<Vec<ResultItem>, SourceError> {
        if query == self.blocked_query {
            let gate = match self.gate.lock() {
                Ok(mut guard) => guard.take(),
                Err(_) => None,
            };
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            return Ok(vec![ResultItem::file("slow-result", "C:\\slow")]);
        }
        Ok(vec![ResultItem::file("fast-result", "C:\\fast")])
    }
}

fn apps() -> Vec<ResultItem> {
    vec![
        ResultItem::app("a1", "C:\\a1.exe"),
        ResultItem::app("a2", "C:\\a2.exe"),
    ]
}

fn files() -> Vec<ResultItem> {
    vec![
        ResultItem::file("f1", "C:\\f1.txt"),
        ResultItem::file("f2", "C:\\f2.txt"),
    ]
}

#[test]
fn generations_are_strictly_increasing_and_unique() {
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![Arc::new(FixedSource::new("app", apps()))],
        deliver,
    );

    let mut generations = Vec::new();
    for query in ["one", "two", "", "three"] {
        dispatcher.submit(query);
        let batch = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("batch should be delivered");
        generations.push(batch.generation);
    }

    for pair in generations.windows(2) {
        assert!(pair[0] < pair[1], "generations not increasing: {generations:?}");
    }
}

#[test]
fn blank_query_collapses_synchronously_without_touching_sources() {
    let source = FixedSource::new("app", apps());
    let calls = Arc::clone(&source.calls);
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(vec![Arc::new(source)], deliver);

    dispatcher.submit("");
    dispatcher.submit("   ");

    // Both batches are already in the channel: delivery was synchronous.
    let first = rx.try_recv().expect("first empty batch");
    let second = rx.try_recv().expect("second empty batch");
    assert!(first.items.is_empty());
    assert!(second.items.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn stale_generation_results_are_never_delivered() {
    let (gate_tx, gate_rx) = channel();
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![Arc::new(GatedSource {
            blocked_query: "first",
            gate: Mutex::new(Some(gate_rx)),
        })],
        deliver,
    );

    dispatcher.submit("first");
    dispatcher.submit("second");

    let batch = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("the newer query should complete");
    assert_eq!(batch.query, "second");
    assert_eq!(batch.items[0].title, "fast-result");

    // Unblock the superseded query; its batch must be dropped unread.
    gate_tx.send(()).expect("gated worker should still be waiting");
    assert!(
        rx.recv_timeout(Duration::from_millis(400)).is_err(),
        "stale batch must never surface"
    );
}

#[test]
fn merge_order_is_source_priority_not_completion_order() {
    // The app source finishes last; its results must still come first.
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![
            Arc::new(FixedSource::new("app", apps()).with_delay(Duration::from_millis(120))),
            Arc::new(FixedSource::new("file", files())),
        ],
        deliver,
    );

    dispatcher.submit("q");
    let batch = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("batch should be delivered");

    let titles: Vec<&str> = batch.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["a1", "a2", "f1", "f2"]);
}

#[test]
fn merge_order_holds_when_the_file_source_is_slow_instead() {
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![
            Arc::new(FixedSource::new("app", apps())),
            Arc::new(FixedSource::new("file", files()).with_delay(Duration::from_millis(120))),
        ],
        deliver,
    );

    dispatcher.submit("q");
    let batch = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("batch should be delivered");

    let titles: Vec<&str> = batch.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["a1", "a2", "f1", "f2"]);
}

#[test]
fn failing_source_yields_zero_results_without_hurting_the_rest() {
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![
            Arc::new(FixedSource::new("app", apps())),
            Arc::new(FailingSource),
        ],
        deliver,
    );

    dispatcher.submit("q");
    let batch = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("batch should be delivered");

    let titles: Vec<&str> = batch.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["a1", "a2"]);
}

#[test]
fn panicking_source_is_contained_the_same_way() {
    let (deliver, rx) = channel_delivery();
    let dispatcher = QueryDispatcher::new(
        vec![
            Arc::new(PanickingSource),
            Arc::new(FixedSource::new("file", files())),
        ],
        deliver,
    );

    dispatcher.submit("q");
    let batch = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("batch should be delivered");

    let titles: Vec<&str> = batch.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["f1", "f2"]);
}
