use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/search`. Built fresh for every submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub website: String,
    pub scroll_duration: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, website: impl Into<String>, scroll_duration: u32) -> Self {
        SearchRequest {
            query: query.into(),
            website: website.into(),
            scroll_duration,
        }
    }
}

/// Outcome of one automation job as reported by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    /// Job duration from backends that report it beside the steps rather
    /// than inside `metrics`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
}

impl SearchResult {
    /// Moves a top-level `total_duration` into `metrics` when `metrics`
    /// carried none.
    pub fn fold_top_level_duration(mut self) -> Self {
        if let Some(duration) = self.total_duration.take() {
            if self.metrics.total_duration == 0.0 {
                self.metrics.total_duration = duration;
            }
        }
        self
    }
}

/// Counters are plain JSON numbers; backends are not consistent about
/// sending `3` vs `3.0`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_duration: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps_completed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scroll_actions: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: StepName,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub search_position: Option<f64>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub scroll_actions: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StepRecord {
    pub fn new(step: impl Into<StepName>, status: StepStatus) -> Self {
        StepRecord {
            step: step.into(),
            status,
            search_position: None,
            target_url: None,
            duration: None,
            scroll_actions: None,
            timestamp: None,
            error: None,
        }
    }
}

/// Job phase identifier. Unknown names are kept verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum StepName {
    Initialization,
    SearchExecution,
    PageLoading,
    BehaviorSimulation,
    ErrorHandling,
    Other(String),
}

impl StepName {
    pub fn as_str(&self) -> &str {
        match self {
            StepName::Initialization => "initialization",
            StepName::SearchExecution => "search_execution",
            StepName::PageLoading => "page_loading",
            StepName::BehaviorSimulation => "behavior_simulation",
            StepName::ErrorHandling => "error_handling",
            StepName::Other(name) => name,
        }
    }
}

impl From<String> for StepName {
    fn from(s: String) -> Self {
        match s.as_str() {
            "initialization" => StepName::Initialization,
            "search_execution" => StepName::SearchExecution,
            "page_loading" => StepName::PageLoading,
            "behavior_simulation" => StepName::BehaviorSimulation,
            "error_handling" => StepName::ErrorHandling,
            _ => StepName::Other(s),
        }
    }
}

impl From<&str> for StepName {
    fn from(s: &str) -> Self {
        StepName::from(s.to_string())
    }
}

impl From<StepName> for String {
    fn from(name: StepName) -> Self {
        match name {
            StepName::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step status. Matching is case-insensitive since backends disagree on
/// `completed` vs `Completed`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl From<String> for StepStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => StepStatus::Pending,
            "completed" => StepStatus::Completed,
            "failed" => StepStatus::Failed,
            _ => StepStatus::Other(s),
        }
    }
}

impl From<StepStatus> for String {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Pending => "pending".to_string(),
            StepStatus::Completed => "completed".to_string(),
            StepStatus::Failed => "failed".to_string(),
            StepStatus::Other(s) => s,
        }
    }
}

/// Step timestamp: epoch milliseconds, or a date string from backends that
/// send ISO-8601.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(f64),
    Text(String),
}

impl Timestamp {
    /// Zero and empty timestamps count as missing.
    pub fn is_present(&self) -> bool {
        match self {
            Timestamp::Millis(ms) => *ms != 0.0,
            Timestamp::Text(raw) => !raw.trim().is_empty(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
