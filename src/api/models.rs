use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data_models::SearchResult;
use crate::error::{Result, SearchError};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Envelope around a search result: `{success, data?, error?}`.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Turns a raw `/api/search` response into a result or a failure.
///
/// Non-2xx statuses fail with the body's `error` (or `HTTP <code>`),
/// `success: false` fails with `error` (or "Search failed"). A success body
/// without `data` is read as the result itself, with a top-level
/// `total_duration` standing in for a missing `metrics.total_duration`.
pub fn interpret_search_response(status: u16, body: &str) -> Result<SearchResult> {
    let ok = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !ok => {
            return Err(SearchError::Server {
                status,
                message: format!("HTTP {status}"),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let envelope = SearchEnvelope::deserialize(&value)?;
    let error = envelope.error.filter(|e| !e.is_empty());

    if !ok {
        return Err(SearchError::Server {
            status,
            message: error.unwrap_or_else(|| format!("HTTP {status}")),
        });
    }

    if envelope.success != Some(true) {
        return Err(SearchError::Rejected(
            error.unwrap_or_else(|| "Search failed".to_string()),
        ));
    }

    let result = match envelope.data {
        Some(data) => SearchResult::deserialize(data)?,
        None => SearchResult::deserialize(value)?,
    };
    Ok(result.fold_top_level_duration())
}
