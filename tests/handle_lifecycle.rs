use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use ignis::{
    BoxError, BuildError, Builder, BuilderFn, BuilderRef, Config, Event, EventKind, Handle,
    HandleError, InlinePool, Metadata, Resource, Status, Subscribe, TokioPool,
};

/// Counter resource: every ignition starts from the persisted value.
#[derive(Debug)]
struct Counter {
    value: AtomicU64,
    store: Arc<AtomicU64>,
}

impl Counter {
    fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Resource for Counter {
    async fn close(&self) -> Result<(), BoxError> {
        self.store
            .store(self.value.load(Ordering::SeqCst), Ordering::SeqCst);
        Ok(())
    }
}

struct CounterBuilder {
    store: Arc<AtomicU64>,
    metadata: Metadata,
}

#[async_trait]
impl Builder for CounterBuilder {
    type Resource = Counter;

    fn name(&self) -> &str {
        "counter"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    async fn ignite(&self) -> Result<Counter, BuildError> {
        Ok(Counter {
            value: AtomicU64::new(self.store.load(Ordering::SeqCst)),
            store: Arc::clone(&self.store),
        })
    }
}

fn counter_builder() -> CounterBuilder {
    CounterBuilder {
        store: Arc::new(AtomicU64::new(0)),
        metadata: Metadata::new(),
    }
}

fn counter_ref() -> BuilderRef<Counter> {
    Arc::new(counter_builder())
}

#[tokio::test]
async fn rebuild_yields_fresh_instance_with_equal_value() {
    let handle = Handle::configure(counter_ref())
        .with_pool(InlinePool::new())
        .build();

    let first = handle.build().await.expect("build");
    assert_eq!(first.increment(), 1);
    assert_eq!(first.increment(), 2);

    let second = handle.rebuild().await.expect("rebuild");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(
        second.value.load(Ordering::SeqCst),
        first.value.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn builder_metadata_is_write_once() {
    let builder = counter_builder();
    assert!(builder.set_metadata("owner", "payments"));
    assert!(!builder.set_metadata("owner", "search"));

    let handle = builder.to_handle();
    let owner = handle.metadata_value::<&str>("owner");
    assert_eq!(owner.as_deref(), Some(&"payments"));
    assert_eq!(handle.metadata().keys(), vec!["owner"]);
    assert_eq!(handle.status(), Status::Inactive);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_builds_share_one_ignition() {
    let ignitions = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&ignitions);
    let builder: BuilderRef<Counter> = BuilderFn::arc("shared", move || {
        counted.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(Counter {
                value: AtomicU64::new(0),
                store: Arc::new(AtomicU64::new(0)),
            })
        }
    });
    let handle = Handle::configure(builder)
        .with_pool(TokioPool::new())
        .build();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let h = handle.clone();
        tasks.push(tokio::spawn(async move { h.build().await }));
    }
    let mut built = Vec::new();
    for t in tasks {
        built.push(t.await.expect("join").expect("build"));
    }

    assert!(built.iter().all(|r| Arc::ptr_eq(r, &built[0])));
    assert_eq!(ignitions.load(Ordering::SeqCst), 1);
    assert!(handle.is_present());
}

#[tokio::test]
async fn observe_times_out_while_ignition_is_pending() {
    let builder: BuilderRef<Counter> = BuilderFn::arc("stuck", || async {
        futures::future::pending::<()>().await;
        Err(BuildError::Missing)
    });
    let handle = Handle::configure(builder)
        .with_config(Config {
            timeout: Duration::from_millis(20),
            ..Config::default()
        })
        .with_pool(TokioPool::new())
        .build();

    let err = handle.observe().await.map(|_| ()).unwrap_err();
    assert!(matches!(err, HandleError::Timeout { .. }));
    assert_eq!(handle.status(), Status::Starting);

    handle.close().await;
    assert_eq!(handle.status(), Status::Inactive);
}

#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn subscribers_see_the_lifecycle() {
    let recorder = Arc::new(Recorder::default());
    let handle = Handle::configure(counter_ref())
        .with_pool(InlinePool::new())
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    handle.build().await.expect("build");
    handle.close().await;

    for _ in 0..100 {
        if recorder.kinds.lock().len() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        *recorder.kinds.lock(),
        vec![
            EventKind::IgnitionStarting,
            EventKind::IgnitionSucceeded,
            EventKind::HandleClosed,
        ]
    );
}

#[cfg(feature = "logging")]
#[tokio::test]
async fn log_writer_can_be_attached() {
    let handle = Handle::configure(counter_ref())
        .with_pool(InlinePool::new())
        .with_subscribers(vec![Arc::new(ignis::LogWriter::new()) as Arc<dyn Subscribe>])
        .build();

    handle.build().await.expect("build");
    handle.close().await;
    assert!(handle.is_empty());
}
