use chrono::Utc;
use futures::future::join_all;
use nanoid::nanoid;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::alert::AlertBoard;
use crate::animation::CounterAnimation;
use crate::api::Backend;
use crate::config::{
    CONFIG, DEFAULT_ALERT_TIMEOUT_MS, DEFAULT_ANIMATION_MS, DEFAULT_SCROLL_DURATION,
};
use crate::data_models::{SearchRequest, SearchResult};
use crate::error::SearchError;
use crate::health::HealthProbe;
use crate::render::{render_error_html, render_result_html};
use crate::view::{Alert, Field, LoadingPhase, Metric, View};

const SESSION_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// `session_<epoch millis>_<9 base36 chars>`. Only used client-side.
pub fn generate_session_id() -> String {
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        nanoid!(9, &SESSION_ALPHABET)
    )
}

/// Where a submission currently is. `Idle` is both the start and the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Validating,
    Submitting,
    RenderedSuccess,
    RenderedError,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission was already in flight.
    Ignored,
    /// A required field was empty; the server was not contacted.
    Invalid,
    Succeeded {
        session_id: String,
        result: SearchResult,
        response_time: Duration,
    },
    Failed {
        session_id: String,
        error: SearchError,
    },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Used when the scroll-duration field is empty or not a whole number.
    pub default_scroll_duration: u32,
    pub alert_timeout: Duration,
    pub animation_duration: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_scroll_duration: DEFAULT_SCROLL_DURATION,
            alert_timeout: Duration::from_millis(DEFAULT_ALERT_TIMEOUT_MS),
            animation_duration: Duration::from_millis(DEFAULT_ANIMATION_MS),
        }
    }
}

impl ControllerSettings {
    pub fn from_config() -> Self {
        Self {
            default_scroll_duration: CONFIG.default_scroll_duration,
            alert_timeout: Duration::from_millis(CONFIG.alert_timeout_ms),
            animation_duration: Duration::from_millis(CONFIG.animation_ms),
        }
    }
}

/// Drives one search form: validation, the single in-flight request, and
/// rendering of whatever comes back.
pub struct SearchController<B: Backend, V: View> {
    backend: Arc<B>,
    view: Arc<V>,
    settings: ControllerSettings,
    alerts: AlertBoard<V>,
    phase: Mutex<ControllerPhase>,
    animations: Mutex<Vec<CounterAnimation>>,
}

/// Returns the controller to `Idle` and the form to its ready state when a
/// submission ends, however it ends.
struct ProcessingGuard<'a, B: Backend, V: View> {
    controller: &'a SearchController<B, V>,
}

impl<B: Backend, V: View> Drop for ProcessingGuard<'_, B, V> {
    fn drop(&mut self) {
        let view = &self.controller.view;
        view.hide_loading();
        view.set_submit_busy(false);
        view.set_submit_enabled(true);
        *self.controller.lock_phase() = ControllerPhase::Idle;
    }
}

impl<B: Backend, V: View> SearchController<B, V> {
    pub fn new(backend: Arc<B>, view: Arc<V>, settings: ControllerSettings) -> Self {
        let alerts = AlertBoard::new(view.clone(), settings.alert_timeout);
        Self {
            backend,
            view,
            settings,
            alerts,
            phase: Mutex::new(ControllerPhase::Idle),
            animations: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn phase(&self) -> ControllerPhase {
        *self.lock_phase()
    }

    pub fn is_processing(&self) -> bool {
        self.phase() != ControllerPhase::Idle
    }

    /// A probe sharing this controller's backend and view.
    pub fn health_probe(&self) -> HealthProbe<B, V> {
        HealthProbe::new(self.backend.clone(), self.view.clone())
    }

    /// True iff query and website are both non-blank. Mirrors the result
    /// onto the submit control.
    pub fn validate(&self) -> bool {
        let query = self.view.field_value(Field::Query);
        let website = self.view.field_value(Field::Website);
        let valid = !query.trim().is_empty() && !website.trim().is_empty();
        self.view.set_submit_enabled(valid);
        valid
    }

    pub async fn submit(&self) -> SubmitOutcome {
        {
            let mut phase = self.lock_phase();
            if *phase != ControllerPhase::Idle {
                log::debug!("submit ignored, a search is already in flight");
                return SubmitOutcome::Ignored;
            }
            *phase = ControllerPhase::Validating;
        }

        if !self.validate() {
            self.alerts.show(Alert::error(SearchError::Validation.to_string()));
            *self.lock_phase() = ControllerPhase::Idle;
            return SubmitOutcome::Invalid;
        }

        let request = self.read_request();
        let session_id = generate_session_id();
        let guard = ProcessingGuard { controller: self };
        *self.lock_phase() = ControllerPhase::Submitting;

        self.show_loading();
        self.cancel_animations();
        self.view.clear_results();
        self.alerts.clear();

        log::info!(
            "[{session_id}] searching {:?} for {:?} (scroll {}s)",
            request.query,
            request.website,
            request.scroll_duration
        );

        let started = Instant::now();
        let outcome = self.backend.search(&request).await;
        let response_time = started.elapsed();

        let outcome = match outcome {
            Ok(result) => {
                log::info!(
                    "[{session_id}] search finished in {:.2}s, {} steps",
                    response_time.as_secs_f64(),
                    result.steps.len()
                );
                self.show_success(&result, &session_id, response_time);
                *self.lock_phase() = ControllerPhase::RenderedSuccess;
                SubmitOutcome::Succeeded {
                    session_id,
                    result,
                    response_time,
                }
            }
            Err(error) => {
                log::error!("[{session_id}] search failed: {:#}", error);
                self.show_error(&error);
                *self.lock_phase() = ControllerPhase::RenderedError;
                SubmitOutcome::Failed { session_id, error }
            }
        };

        drop(guard);
        outcome
    }

    /// Waits for every running metric animation to write its last frame.
    pub async fn settle_animations(&self) {
        let animations: Vec<CounterAnimation> = std::mem::take(&mut *self.lock_animations());
        join_all(animations.into_iter().map(CounterAnimation::finished)).await;
    }

    fn read_request(&self) -> SearchRequest {
        let raw = self.view.field_value(Field::ScrollDuration);
        let scroll_duration = raw.trim().parse::<u32>().unwrap_or_else(|_| {
            if !raw.trim().is_empty() {
                log::warn!(
                    "invalid scroll duration {raw:?}, using {}",
                    self.settings.default_scroll_duration
                );
            }
            self.settings.default_scroll_duration
        });

        SearchRequest::new(
            self.view.field_value(Field::Query).trim(),
            self.view.field_value(Field::Website).trim(),
            scroll_duration,
        )
    }

    fn show_loading(&self) {
        self.view.set_submit_enabled(false);
        self.view.set_submit_busy(true);
        self.view.show_loading(LoadingPhase::Initialization);
    }

    fn show_success(&self, result: &SearchResult, session_id: &str, response_time: Duration) {
        self.view
            .render_result(render_result_html(result, session_id, response_time));
        self.animate_metrics(result);
        self.alerts
            .show(Alert::success("Search completed successfully!"));
    }

    fn show_error(&self, error: &SearchError) {
        let message = error.to_string();
        self.view.render_result(render_error_html(&message));
        self.alerts.show(Alert::error(format!("Error: {message}")));
    }

    fn animate_metrics(&self, result: &SearchResult) {
        let metrics = &result.metrics;
        let targets = [
            (Metric::Duration, metrics.total_duration),
            (Metric::Steps, metrics.steps_completed),
            (Metric::Scrolls, metrics.scroll_actions),
        ];

        let mut animations = self.lock_animations();
        for (metric, target) in targets {
            let view = self.view.clone();
            animations.push(CounterAnimation::start(
                target,
                self.settings.animation_duration,
                move |value| view.set_metric_text(metric, metric.format(value)),
            ));
        }
    }

    fn cancel_animations(&self) {
        for animation in self.lock_animations().drain(..) {
            animation.cancel();
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, ControllerPhase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_animations(&self) -> MutexGuard<'_, Vec<CounterAnimation>> {
        self.animations.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
