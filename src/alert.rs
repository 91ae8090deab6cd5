use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::render::render_alert_html;
use crate::view::{Alert, View};

/// Shows one transient alert at a time.
///
/// Every alert schedules its own removal after `timeout`. A newer alert
/// replaces an older one, and the older one's timer then leaves the newer
/// alert alone.
pub struct AlertBoard<V: View> {
    view: Arc<V>,
    timeout: Duration,
    generation: Arc<AtomicU64>,
}

impl<V: View> AlertBoard<V> {
    pub fn new(view: Arc<V>, timeout: Duration) -> Self {
        Self {
            view,
            timeout,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn show(&self, alert: Alert) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.view.show_alert(&alert, render_alert_html(&alert));

        let view = self.view.clone();
        let current = self.generation.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if current.load(Ordering::SeqCst) == generation {
                view.clear_alert();
            }
        });
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.view.clear_alert();
    }
}
