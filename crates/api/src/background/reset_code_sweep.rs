//! Periodic removal of expired password-reset codes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use emerald_core::reset_code::ResetCodeStore;
use tokio_util::sync::CancellationToken;

/// Sweep `store` every `interval` until `cancel` fires.
pub async fn run(store: Arc<ResetCodeStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Reset code sweep started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reset code sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let removed = store.sweep_expired(Utc::now()).await;
                if removed > 0 {
                    tracing::info!(removed, "Reset code sweep: dropped expired codes");
                } else {
                    tracing::debug!("Reset code sweep: nothing expired");
                }
            }
        }
    }
}
