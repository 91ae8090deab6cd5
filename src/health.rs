use std::sync::Arc;

use crate::api::Backend;
use crate::view::{HealthIndicator, View};

/// Best-effort liveness check. Failures are logged and never shown.
pub struct HealthProbe<B: Backend, V: View> {
    backend: Arc<B>,
    view: Arc<V>,
}

impl<B: Backend, V: View> HealthProbe<B, V> {
    pub fn new(backend: Arc<B>, view: Arc<V>) -> Self {
        Self { backend, view }
    }

    /// Queries `/health` once and updates the indicator. Returns what was
    /// shown, or `None` when the check failed.
    pub async fn check(&self) -> Option<HealthIndicator> {
        match self.backend.health().await {
            Ok(health) => {
                let indicator = if health.is_healthy() {
                    HealthIndicator::Online
                } else {
                    HealthIndicator::Offline
                };
                log::info!("server health: {}", health.status);
                self.view
                    .set_health_indicator(indicator, format!("Server: {}", health.status));
                Some(indicator)
            }
            Err(e) => {
                log::warn!("health check failed: {:#}", e);
                None
            }
        }
    }
}
