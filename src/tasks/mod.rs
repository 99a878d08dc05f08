//! Background scheduled tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use crate::services::SubscriptionService;
use chrono::Utc;

/// Spawn all background tasks. Tasks are detached via `tokio::spawn`.
pub fn spawn_all(subscription_service: SubscriptionService, expiry_sweep_interval_secs: u64) {
    // 订阅过期检查
    {
        let svc = subscription_service.clone();
        let interval = std::time::Duration::from_secs(expiry_sweep_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                match svc.expire_subscriptions(Utc::now()).await {
                    Ok(n) if n > 0 => log::info!("Expired subscriptions processed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire subscriptions: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
