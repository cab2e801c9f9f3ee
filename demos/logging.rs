//! # LogWriter Example
//!
//! Renders handle events through `tracing` with the built-in [`LogWriter`],
//! including a cancelled ignition whose late resource is discarded.
//!
//! ## Run
//! ```bash
//! RUST_LOG=ignis=debug cargo run --example logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use ignis::{BoxError, BuildError, BuilderFn, Handle, LogWriter, Resource, Subscribe};
use tracing_subscriber::EnvFilter;

struct Cache {
    shard: u8,
}

#[async_trait::async_trait]
impl Resource for Cache {
    async fn close(&self) -> Result<(), BoxError> {
        if self.shard == 0 {
            return Err("shard 0 already evicted".into());
        }
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ignis=debug")),
        )
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let slow = BuilderFn::arc("cache", || async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok::<_, BuildError>(Cache { shard: 1 })
    });
    let handle = Handle::configure(slow).with_subscribers(subs).build();

    // Cancelled while pending; the late resource is closed when it arrives.
    let pending = handle.access();
    handle.close().await;
    if let Some(promise) = pending {
        println!("pending ignition: {:?}", promise.wait().await.map(|_| ()));
    }

    handle.build().await?;
    let evicted = BuilderFn::arc("cache-evicted", || async {
        Ok::<_, BuildError>(Cache { shard: 0 })
    });
    handle.rebuild_with(evicted, true).await?;

    // Closing shard 0 fails; the error is logged, not returned.
    handle.close().await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    Ok(())
}
