//! # Custom Subscriber Example
//!
//! Counts handle lifecycle events with a custom subscriber while a flaky
//! builder is retried and the handle is rebuilt a few times.
//!
//! ## Run
//! ```bash
//! cargo run --example subscriber
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ignis::{BoxError, BuildError, BuilderFn, Event, EventKind, Handle, Resource, Subscribe};

struct MetricsSubscriber {
    ignitions: AtomicU64,
    failures: AtomicU64,
    closes: AtomicU64,
}

impl MetricsSubscriber {
    fn new() -> Self {
        Self {
            ignitions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            closes: AtomicU64::new(0),
        }
    }

    fn print_stats(&self) {
        println!();
        println!("Metrics:");
        println!(" ├─► Ignitions: {}", self.ignitions.load(Ordering::Relaxed));
        println!(" ├─► Failures:  {}", self.failures.load(Ordering::Relaxed));
        println!(" └─► Closes:    {}", self.closes.load(Ordering::Relaxed));
    }
}

#[async_trait::async_trait]
impl Subscribe for MetricsSubscriber {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::IgnitionSucceeded => {
                self.ignitions.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::IgnitionFailed => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::HandleClosed => {
                self.closes.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "metrics"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}

struct Session(u32);

#[async_trait::async_trait]
impl Resource for Session {
    async fn close(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let metrics = Arc::new(MetricsSubscriber::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::clone(&metrics) as Arc<dyn Subscribe>];

    let attempts = Arc::new(AtomicU32::new(0));
    let flaky = BuilderFn::arc("session", move || {
        let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if attempt <= 2 {
                return Err(BuildError::msg(format!("attempt {attempt} failed")));
            }
            Ok(Session(attempt))
        }
    });
    let handle = Handle::configure(flaky).with_subscribers(subs).build();

    let session = loop {
        match handle.build().await {
            Ok(session) => break session,
            Err(err) => println!("build: {}", err.as_message()),
        }
    };
    println!("session #{} active", session.0);

    for _ in 0..3 {
        let session = handle.rebuild().await?;
        println!("session #{} active", session.0);
    }
    handle.close().await;

    // Subscribers run on their own workers; give them a moment to drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    metrics.print_stats();
    Ok(())
}
