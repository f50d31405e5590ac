//! Periodic portfolio refresh with an explicit stop handle.
//!
//! Each tick spawns an independent fetch; overlapping fetches are neither
//! deduplicated nor sequenced. The latest result is published on a `watch`
//! channel. Stopping (or dropping) the handle ends the timer and aborts any
//! fetch still in flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use whale_common::types::Portfolio;

use crate::portfolio::PortfolioClient;

/// Outcome of one refresh tick.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSnapshot {
    pub address: String,
    pub fetched_at: DateTime<Utc>,
    pub result: Result<Portfolio, String>,
}

/// Handle to a running refresh task.
pub struct RefreshHandle {
    address: String,
    stop_tx: Option<oneshot::Sender<()>>,
    updates: watch::Receiver<Option<PortfolioSnapshot>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Receiver for snapshots; holds `None` until the first fetch completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<PortfolioSnapshot>> {
        self.updates.clone()
    }

    /// Stop the timer and wait for the task to wind down.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await
            && e.is_panic()
        {
            tracing::error!(address = %self.address, "Refresh task panicked");
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start refreshing `address` every `period`. The first fetch happens immediately.
pub fn spawn_refresh(client: PortfolioClient, address: String, period: Duration) -> RefreshHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (updates_tx, updates) = watch::channel(None);

    let task = tokio::spawn(run_refresh(
        client,
        address.clone(),
        period,
        stop_rx,
        Arc::new(updates_tx),
    ));

    tracing::info!(
        address = %address,
        period_secs = period.as_secs_f64(),
        "Portfolio refresh started"
    );

    RefreshHandle {
        address,
        stop_tx: Some(stop_tx),
        updates,
        task,
    }
}

async fn run_refresh(
    client: PortfolioClient,
    address: String,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
    updates: Arc<watch::Sender<Option<PortfolioSnapshot>>>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let client = client.clone();
                let address = address.clone();
                let updates = Arc::clone(&updates);
                in_flight.spawn(async move {
                    let result = client
                        .fetch_portfolio(&address)
                        .await
                        .map_err(|e| e.to_string());
                    if let Err(e) = &result {
                        tracing::warn!(address = %address, error = %e, "Portfolio refresh failed");
                    }
                    updates.send_replace(Some(PortfolioSnapshot {
                        address,
                        fetched_at: Utc::now(),
                        result,
                    }));
                });
            }
            Some(joined) = in_flight.join_next() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    tracing::error!(address = %address, "Portfolio fetch panicked");
                }
            }
        }
    }

    in_flight.shutdown().await;
    tracing::info!(address = %address, "Portfolio refresh stopped");
}
