//! Background scheduled tasks for the application.
//!
//! Currently the only recurring job is the share-visitor janitor. It runs on a
//! fixed interval, independent of request handlers, and writes through the same
//! record store. Call `spawn_all` once during startup to launch it.

use crate::services::ShareService;

/// Spawn all background tasks.
///
/// Notes
/// - The visitor janitor only runs when a retention period is configured;
///   the default is unlimited retention (no pruning at all).
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(share_service: ShareService, visitor_retention_days: Option<i64>) {
    let Some(days) = visitor_retention_days else {
        log::info!("Share visitor pruning disabled (unlimited retention)");
        return;
    };

    // 访客清理（每 6 小时）
    tokio::spawn(async move {
        loop {
            match share_service.prune_stale_visitors(days).await {
                Ok(n) if n > 0 => log::info!("Stale share visitors pruned: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to prune share visitors: {e:?}"),
            }
            tokio::time::sleep(std::time::Duration::from_secs(6 * 3600)).await;
        }
    });
}
