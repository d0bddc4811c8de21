// Copyright (c) 2025 - Cowboy AI, Inc.

//! Restaurant Application
//!
//! Reads one JSON command envelope per line from stdin, handles it, and
//! writes the JSON response to stdout. Appended events are projected in the
//! background; at end of input the queue is drained and the projected
//! restaurants and orders are printed.
//!
//! ```text
//! echo '{"command":{"kind":"MarkOrderAsPrepared","id":"o-1"}}' | cargo run --bin restaurant-app
//! ```
//!
//! Configuration comes from `RESTAURANT_QUEUE_CAPACITY`,
//! `RESTAURANT_MAX_DELIVERY_ATTEMPTS` and `RESTAURANT_PUBLISH_EVENTS`.

use anyhow::{Context, Result};
use restaurant_cqrs::{AppConfig, Application};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(
        queue_capacity = config.queue_capacity,
        max_delivery_attempts = config.max_delivery_attempts,
        publish_events = config.publish_events,
        "Starting restaurant application"
    );

    let app = Application::in_memory(config);
    let projector = app
        .start_projector()
        .await
        .context("Failed to start projector")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = app.submit_json(&line).await;
        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        handled += 1;
    }

    app.shutdown().await;
    let stats = projector.await.context("Projector task panicked")?;
    info!(
        commands = handled,
        projected = stats.delivered,
        dropped = stats.dropped,
        "Input exhausted, projector drained"
    );

    let summary = serde_json::json!({
        "restaurants": app.restaurants().await?,
        "orders": app.orders().await?,
    });
    stdout
        .write_all(format!("{}\n", serde_json::to_string_pretty(&summary)?).as_bytes())
        .await?;
    stdout.flush().await?;

    Ok(())
}
