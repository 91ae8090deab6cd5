//! Pure HTML rendering of search results.
//!
//! Everything here is a function of its arguments (plus the local timezone
//! for step timestamps), so the same result always renders the same markup.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::time::Duration;

use crate::data_models::{Metrics, SearchResult, StepName, StepRecord, StepStatus, Timestamp};
use crate::view::{Alert, Metric};

pub const URL_MAX_LEN: usize = 50;
pub const DETAIL_SEPARATOR: &str = " • ";

const TROUBLESHOOTING_TIPS: [&str; 4] = [
    "Check if the website exists in Google search results",
    "Verify the website domain is correct",
    "Try a different search query",
    "Ensure the website is not blocking automated requests",
];

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn format_step_name(name: &StepName) -> String {
    match name {
        StepName::Initialization => "Browser Initialization".to_string(),
        StepName::SearchExecution => "Google Search".to_string(),
        StepName::PageLoading => "Page Loading".to_string(),
        StepName::BehaviorSimulation => "Behavior Simulation".to_string(),
        StepName::ErrorHandling => "Error Handling".to_string(),
        StepName::Other(raw) => raw.replace('_', " ").to_uppercase(),
    }
}

/// Cuts `url` to `max_len` characters and appends `...` when it was longer.
pub fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() > max_len {
        let head: String = url.chars().take(max_len).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}

/// Integral values print without a fractional part (`5`, not `5.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// `h:mm:ss AM/PM` in the given timezone. Unparsable date strings are
/// returned unchanged.
pub fn format_timestamp<Tz>(timestamp: &Timestamp, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    const TIME_FORMAT: &str = "%-I:%M:%S %p";
    match timestamp {
        Timestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms as i64)
            .map(|dt| dt.with_timezone(tz).format(TIME_FORMAT).to_string()),
        Timestamp::Text(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(tz).format(TIME_FORMAT).to_string())
                .unwrap_or_else(|_| raw.clone()),
        ),
    }
}

pub fn format_step_details(step: &StepRecord) -> String {
    format_step_details_in(step, &Local)
}

/// Present, non-zero fields in fixed order, joined by [`DETAIL_SEPARATOR`].
pub fn format_step_details_in<Tz>(step: &StepRecord, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut details = Vec::new();

    if let Some(position) = step.search_position.filter(|p| *p != 0.0) {
        details.push(format!("Position: {}", format_number(position)));
    }
    if let Some(url) = step.target_url.as_deref().filter(|u| !u.is_empty()) {
        details.push(format!("URL: {}", truncate_url(url, URL_MAX_LEN)));
    }
    if let Some(duration) = step.duration.filter(|d| *d != 0.0) {
        details.push(format!("Duration: {}s", format_number(duration)));
    }
    if let Some(scrolls) = step.scroll_actions.filter(|s| *s != 0.0) {
        details.push(format!("Scrolls: {}", format_number(scrolls)));
    }
    if let Some(time) = step
        .timestamp
        .as_ref()
        .filter(|ts| ts.is_present())
        .and_then(|ts| format_timestamp(ts, tz))
    {
        details.push(format!("Time: {time}"));
    }

    details.join(DETAIL_SEPARATOR)
}

pub fn render_step_html(step: &StepRecord) -> String {
    let class = match step.status {
        StepStatus::Completed => " completed",
        StepStatus::Failed => " failed",
        _ => "",
    };
    let error = step
        .error
        .as_deref()
        .filter(|e| !e.is_empty())
        .map(|e| format!(r#"<div class="text-error mt-1">{}</div>"#, escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<div class="step-item{class}"><div class="step-content"><div class="step-title">{}</div><div class="step-details">{}</div>{error}</div></div>"#,
        escape_html(&format_step_name(&step.step)),
        escape_html(&format_step_details(step)),
    )
}

pub fn format_response_time(response_time: Duration) -> String {
    format!("{:.2}s", response_time.as_secs_f64())
}

pub fn render_metrics_html(metrics: &Metrics, response_time: Duration) -> String {
    let cells = [
        (Metric::Duration, Metric::Duration.format(metrics.total_duration), "Total Duration"),
        (Metric::ResponseTime, format_response_time(response_time), "Response Time"),
        (Metric::Steps, Metric::Steps.format(metrics.steps_completed), "Steps Completed"),
        (Metric::Scrolls, Metric::Scrolls.format(metrics.scroll_actions), "Scroll Actions"),
    ];

    let body: String = cells
        .iter()
        .map(|(metric, value, label)| {
            format!(
                r#"<div class="metric"><span class="metric-value" id="{}">{value}</span><span class="metric-label">{label}</span></div>"#,
                metric.id()
            )
        })
        .collect();

    format!(r#"<div class="result-metrics">{body}</div>"#)
}

/// `client_session_id` is shown when the server did not name the session.
pub fn render_result_html(
    result: &SearchResult,
    client_session_id: &str,
    response_time: Duration,
) -> String {
    let (class, glyph, heading) = if result.success {
        ("success", "✓", "Search Completed Successfully")
    } else {
        ("error", "✗", "Search Failed")
    };

    let metrics = if result.success {
        render_metrics_html(&result.metrics, response_time)
    } else {
        String::new()
    };

    let landing = match (&result.final_url, &result.page_title) {
        (Some(url), title) => format!(
            r#"<p class="text-secondary">Landed on: {}{}</p>"#,
            escape_html(url),
            title
                .as_deref()
                .map(|t| format!(" ({})", escape_html(t)))
                .unwrap_or_default()
        ),
        (None, _) => String::new(),
    };

    let session_id = if result.session_id.is_empty() {
        client_session_id
    } else {
        result.session_id.as_str()
    };

    let steps: String = result.steps.iter().map(render_step_html).collect();

    let error = result
        .error
        .as_deref()
        .filter(|e| !e.is_empty())
        .map(|e| {
            format!(
                r#"<div class="alert alert-error mt-4"><strong>Error:</strong> {}</div>"#,
                escape_html(e)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="result-card {class}"><div class="result-header"><div class="result-icon">{glyph}</div><div><h3>{heading}</h3><p class="text-secondary">Session: {}</p>{landing}</div></div>{metrics}<div class="steps-timeline">{steps}</div>{error}</div>"#,
        escape_html(session_id),
    )
}

pub fn render_error_html(message: &str) -> String {
    let tips: String = TROUBLESHOOTING_TIPS
        .iter()
        .map(|tip| format!("<li>{tip}</li>"))
        .collect();

    format!(
        r#"<div class="result-card error"><div class="result-header"><div class="result-icon">✗</div><div><h3>Search Failed</h3><p class="text-secondary">Please check your inputs and try again</p></div></div><div class="alert alert-error"><strong>Error:</strong> <span class="error-message">{}</span></div><div class="mt-4"><h4>Troubleshooting Tips:</h4><ul>{tips}</ul></div></div>"#,
        escape_html(message)
    )
}

pub fn render_alert_html(alert: &Alert) -> String {
    format!(
        r#"<div class="alert alert-{} show">{}</div>"#,
        alert.kind.as_str(),
        escape_html(&alert.message)
    )
}
