use dashmap::DashMap;
use html2text::from_read;

use crate::view::{Alert, AlertKind, Field, HealthIndicator, LoadingPhase, Metric, View};

const TEXT_WIDTH: usize = 80;

/// A [`View`] for the command line: fields come from arguments, rendered
/// HTML is printed as plain text.
pub struct TerminalView {
    fields: DashMap<Field, String>,
    metrics: DashMap<Metric, String>,
}

impl TerminalView {
    pub fn new(query: &str, website: &str, scroll_duration: Option<u32>) -> Self {
        let fields = DashMap::new();
        fields.insert(Field::Query, query.to_string());
        fields.insert(Field::Website, website.to_string());
        if let Some(secs) = scroll_duration {
            fields.insert(Field::ScrollDuration, secs.to_string());
        }
        Self {
            fields,
            metrics: DashMap::new(),
        }
    }

    /// Final animated metric values, in panel order.
    pub fn metric_summary(&self) -> Vec<(Metric, String)> {
        [Metric::Duration, Metric::Steps, Metric::Scrolls]
            .into_iter()
            .filter_map(|m| self.metrics.get(&m).map(|v| (m, v.clone())))
            .collect()
    }

    fn print_html(html: &str) {
        match from_read(html.as_bytes(), TEXT_WIDTH) {
            Ok(text) => println!("{}", text.trim_end()),
            Err(e) => {
                log::warn!("could not convert html to text: {:#}", e);
                println!("{html}");
            }
        }
    }
}

fn phase_label(phase: LoadingPhase) -> &'static str {
    match phase {
        LoadingPhase::Initialization => "Initializing browser",
        LoadingPhase::SearchExecution => "Executing search",
        LoadingPhase::PageLoading => "Loading page",
        LoadingPhase::BehaviorSimulation => "Simulating behavior",
    }
}

impl View for TerminalView {
    fn field_value(&self, field: Field) -> String {
        self.fields
            .get(&field)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    fn set_submit_enabled(&self, _enabled: bool) {}

    fn set_submit_busy(&self, busy: bool) {
        if busy {
            eprintln!("Processing...");
        }
    }

    fn show_loading(&self, phase: LoadingPhase) {
        eprintln!(
            "[{}/{}] {} ({:.0}%)",
            phase.index() + 1,
            LoadingPhase::ALL.len(),
            phase_label(phase),
            phase.progress() * 100.0
        );
    }

    fn hide_loading(&self) {}

    fn render_result(&self, html: String) {
        Self::print_html(&html);
    }

    fn clear_results(&self) {
        self.metrics.clear();
    }

    fn show_alert(&self, alert: &Alert, _html: String) {
        match alert.kind {
            AlertKind::Success => eprintln!("✓ {}", alert.message),
            AlertKind::Error => eprintln!("✗ {}", alert.message),
        }
    }

    fn clear_alert(&self) {}

    fn set_metric_text(&self, metric: Metric, text: String) {
        self.metrics.insert(metric, text);
    }

    fn set_health_indicator(&self, indicator: HealthIndicator, tooltip: String) {
        let glyph = match indicator {
            HealthIndicator::Online => "● online",
            HealthIndicator::Offline => "○ offline",
        };
        println!("{glyph} ({tooltip})");
    }
}
