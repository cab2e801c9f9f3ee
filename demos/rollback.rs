//! # Rebuild with rollback
//!
//! A handle over a database client is switched to a replica that refuses
//! connections. With rollback enabled the primary is reignited and the handle
//! stays usable; without it the handle is left empty until the next `build()`.
//!
//! ## Run
//! ```bash
//! cargo run --example rollback
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ignis::{BoxError, BuildError, BuilderFn, BuilderRef, Handle, Resource};

struct Client {
    endpoint: &'static str,
    connection: u32,
}

#[async_trait::async_trait]
impl Resource for Client {
    async fn close(&self) -> Result<(), BoxError> {
        println!("  closing {} (connection #{})", self.endpoint, self.connection);
        Ok(())
    }
}

fn client(endpoint: &'static str, connections: Arc<AtomicU32>) -> BuilderRef<Client> {
    BuilderFn::arc(endpoint, move || {
        let connection = connections.fetch_add(1, Ordering::Relaxed) + 1;
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Client {
                endpoint,
                connection,
            })
        }
    })
}

fn unreachable(endpoint: &'static str) -> BuilderRef<Client> {
    BuilderFn::arc(endpoint, move || async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err(BuildError::msg(format!("{endpoint}: connection refused")))
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let connections = Arc::new(AtomicU32::new(0));
    let handle = Handle::new(client("db-primary", Arc::clone(&connections)));

    handle.on_start(|c| println!("  started {} (connection #{})", c.endpoint, c.connection));
    handle.on_close(|| println!("  handle is empty"));

    println!("build:");
    let c = handle.build().await?;
    println!("  using {}", c.endpoint);

    println!("switch to a dead replica, rollback on:");
    let adopted = handle.rebuild_with(unreachable("db-replica"), true).await?;
    println!(
        "  adopted={adopted} builder={} status={}",
        handle.name(),
        handle.status().as_label()
    );

    println!("switch to a dead replica, rollback off:");
    let adopted = handle.rebuild_with(unreachable("db-replica"), false).await?;
    println!(
        "  adopted={adopted} builder={} status={}",
        handle.name(),
        handle.status().as_label()
    );

    println!("retry with the kept builder:");
    let c = handle.build().await?;
    println!("  using {} (connection #{})", c.endpoint, c.connection);

    handle.close().await;
    println!("connections opened: {}", connections.load(Ordering::Relaxed));
    Ok(())
}
