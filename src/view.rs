//! The rendering surface the controller talks to.
//!
//! The controller never touches markup directly: it reads fields and pushes
//! state through [`View`], so anything from a browser bridge to a terminal
//! (or the in-memory [`MemoryView`]) can host it.

use dashmap::DashMap;
use std::sync::Mutex;

use crate::render::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Query,
    Website,
    ScrollDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Alert {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Alert {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }
}

/// Cells of the metrics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Duration,
    ResponseTime,
    Steps,
    Scrolls,
}

impl Metric {
    pub fn id(&self) -> &'static str {
        match self {
            Metric::Duration => "metricDuration",
            Metric::ResponseTime => "metricResponse",
            Metric::Steps => "metricSteps",
            Metric::Scrolls => "metricScrolls",
        }
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            Metric::Duration | Metric::ResponseTime => format!("{}s", format_number(value)),
            Metric::Steps | Metric::Scrolls => format_number(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthIndicator {
    Online,
    Offline,
}

/// Loading-indicator phases, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadingPhase {
    Initialization,
    SearchExecution,
    PageLoading,
    BehaviorSimulation,
}

impl LoadingPhase {
    pub const ALL: [LoadingPhase; 4] = [
        LoadingPhase::Initialization,
        LoadingPhase::SearchExecution,
        LoadingPhase::PageLoading,
        LoadingPhase::BehaviorSimulation,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Phases shown as active while `self` is current: every phase up to and
    /// including it.
    pub fn active_phases(&self) -> &'static [LoadingPhase] {
        &Self::ALL[..=self.index()]
    }

    /// Progress-bar fill in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        (self.index() + 1) as f64 / Self::ALL.len() as f64
    }
}

pub trait View: Send + Sync + 'static {
    fn field_value(&self, field: Field) -> String;

    fn set_submit_enabled(&self, enabled: bool);

    /// Switches the submit control between its idle and "Processing..." looks.
    fn set_submit_busy(&self, busy: bool);

    fn show_loading(&self, phase: LoadingPhase);

    fn hide_loading(&self);

    fn render_result(&self, html: String);

    fn clear_results(&self);

    /// Replaces whatever alert is currently shown.
    fn show_alert(&self, alert: &Alert, html: String);

    fn clear_alert(&self);

    fn set_metric_text(&self, metric: Metric, text: String);

    fn set_health_indicator(&self, indicator: HealthIndicator, tooltip: String);
}

/// Everything a [`MemoryView`] has been told, for inspection.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub submit_enabled: bool,
    pub submit_busy: bool,
    /// Current loading phase, `None` while the indicator is hidden.
    pub loading: Option<LoadingPhase>,
    pub results_html: Option<String>,
    pub alert: Option<Alert>,
    pub alert_html: Option<String>,
    pub alerts_shown: Vec<Alert>,
    pub health: Option<(HealthIndicator, String)>,
}

/// A headless [`View`] that records state instead of drawing it.
#[derive(Default)]
pub struct MemoryView {
    fields: DashMap<Field, String>,
    metric_frames: DashMap<Metric, Vec<String>>,
    state: Mutex<ViewState>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(query: &str, website: &str, scroll_duration: &str) -> Self {
        let view = Self::new();
        view.set_field(Field::Query, query);
        view.set_field(Field::Website, website);
        view.set_field(Field::ScrollDuration, scroll_duration);
        view
    }

    pub fn set_field(&self, field: Field, value: &str) {
        self.fields.insert(field, value.to_string());
    }

    pub fn state(&self) -> ViewState {
        self.lock().clone()
    }

    /// Last text written to a metric cell by an animation.
    pub fn metric_text(&self, metric: Metric) -> Option<String> {
        self.metric_frames
            .get(&metric)
            .and_then(|frames| frames.last().cloned())
    }

    pub fn metric_frames(&self, metric: Metric) -> Vec<String> {
        self.metric_frames
            .get(&metric)
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewState> {
        // A panicking writer leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl View for MemoryView {
    fn field_value(&self, field: Field) -> String {
        self.fields
            .get(&field)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.lock().submit_enabled = enabled;
    }

    fn set_submit_busy(&self, busy: bool) {
        self.lock().submit_busy = busy;
    }

    fn show_loading(&self, phase: LoadingPhase) {
        self.lock().loading = Some(phase);
    }

    fn hide_loading(&self) {
        self.lock().loading = None;
    }

    fn render_result(&self, html: String) {
        self.lock().results_html = Some(html);
    }

    fn clear_results(&self) {
        self.lock().results_html = None;
        self.metric_frames.clear();
    }

    fn show_alert(&self, alert: &Alert, html: String) {
        let mut state = self.lock();
        state.alert = Some(alert.clone());
        state.alert_html = Some(html);
        state.alerts_shown.push(alert.clone());
    }

    fn clear_alert(&self) {
        let mut state = self.lock();
        state.alert = None;
        state.alert_html = None;
    }

    fn set_metric_text(&self, metric: Metric, text: String) {
        self.metric_frames.entry(metric).or_default().push(text);
    }

    fn set_health_indicator(&self, indicator: HealthIndicator, tooltip: String) {
        self.lock().health = Some((indicator, tooltip));
    }
}
