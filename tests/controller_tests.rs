use anyhow::Result;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use searchbot::api::HttpBackend;
use searchbot::view::{AlertKind, Field, LoadingPhase, MemoryView, Metric, View};
use searchbot::{ControllerPhase, ControllerSettings, SearchController, SearchError, SubmitOutcome};

mod test_helpers {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::get, routing::post};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct StubState {
        status: StatusCode,
        body: Value,
        delay: Duration,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<Value>>>,
    }

    /// An in-process stand-in for the automation server.
    pub struct StubServer {
        pub base_url: String,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<Value>>>,
    }

    impl StubServer {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<Value> {
            self.last_request.lock().unwrap().clone()
        }
    }

    async fn search_handler(
        State(state): State<StubState>,
        Json(request): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        state.calls.fetch_add(1, Ordering::SeqCst);
        *state.last_request.lock().unwrap() = Some(request);
        tokio::time::sleep(state.delay).await;
        (state.status, Json(state.body.clone()))
    }

    async fn health_handler() -> Json<Value> {
        Json(json!({"status": "healthy"}))
    }

    pub async fn spawn_stub(status: u16, body: Value, delay: Duration) -> Result<StubServer> {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let state = StubState {
            status: StatusCode::from_u16(status)?,
            body,
            delay,
            calls: calls.clone(),
            last_request: last_request.clone(),
        };

        let router = Router::new()
            .route("/api/search", post(search_handler))
            .route("/health", get(health_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Ok(StubServer {
            base_url: format!("http://{addr}"),
            calls,
            last_request,
        })
    }

    /// A base URL nothing is listening on.
    pub async fn dead_base_url() -> Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);
        Ok(format!("http://{addr}"))
    }

    pub fn controller_for(
        base_url: &str,
        view: Arc<MemoryView>,
    ) -> Result<SearchController<HttpBackend, MemoryView>> {
        let backend = Arc::new(HttpBackend::new(base_url)?);
        let settings = ControllerSettings {
            animation_duration: Duration::from_millis(60),
            ..ControllerSettings::default()
        };
        Ok(SearchController::new(backend, view, settings))
    }

    pub fn filled_view() -> Arc<MemoryView> {
        Arc::new(MemoryView::with_fields(
            "  rust crates ",
            " example.com ",
            "12",
        ))
    }

    pub fn select_text(html: &str, selector: &str) -> Vec<String> {
        let document = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .collect()
    }

    pub fn success_body() -> Value {
        json!({
            "success": true,
            "data": {
                "success": true,
                "session_id": "srv-42",
                "error": null,
                "metrics": {"total_duration": 5, "steps_completed": 4, "scroll_actions": 3},
                "steps": [
                    {"step": "initialization", "status": "completed", "timestamp": 1700000000000u64},
                    {"step": "search_execution", "status": "completed", "search_position": 3},
                    {"step": "page_loading", "status": "completed",
                     "target_url": format!("https://example.com/{}", "p".repeat(70))},
                    {"step": "behavior_simulation", "status": "completed", "scroll_actions": 3, "duration": 2.5}
                ]
            }
        })
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_validate_mirrors_submit_control() -> Result<()> {
    let view = Arc::new(MemoryView::new());
    let controller = controller_for(&dead_base_url().await?, view.clone())?;

    let cases = [
        ("", "", false),
        ("query", "", false),
        ("", "example.com", false),
        ("   ", "example.com", false),
        ("query", "\t\n", false),
        ("query", "example.com", true),
        (" q ", " w ", true),
    ];

    for (query, website, expected) in cases {
        view.set_field(Field::Query, query);
        view.set_field(Field::Website, website);
        assert_eq!(controller.validate(), expected, "{query:?} / {website:?}");
        assert_eq!(view.state().submit_enabled, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_successful_search_renders_result() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::ZERO).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    let (session_id, result) = match controller.submit().await {
        SubmitOutcome::Succeeded {
            session_id, result, ..
        } => (session_id, result),
        other => panic!("expected success, got {other:?}"),
    };
    assert!(session_id.starts_with("session_"));
    assert_eq!(result.session_id, "srv-42");

    let request = stub.last_request().expect("request recorded");
    assert_eq!(
        request,
        json!({"query": "rust crates", "website": "example.com", "scroll_duration": 12})
    );

    let state = view.state();
    let html = state.results_html.expect("results rendered");
    assert_eq!(select_text(&html, ".result-icon"), vec!["✓"]);
    assert_eq!(select_text(&html, "#metricDuration"), vec!["5s"]);
    assert_eq!(select_text(&html, "#metricSteps"), vec!["4"]);
    assert_eq!(select_text(&html, "#metricScrolls"), vec!["3"]);
    assert!(html.contains("Session: srv-42"));

    let titles = select_text(&html, ".step-item.completed .step-title");
    assert_eq!(
        titles,
        vec![
            "Browser Initialization",
            "Google Search",
            "Page Loading",
            "Behavior Simulation"
        ]
    );

    let details = select_text(&html, ".step-details");
    assert_eq!(details[1], "Position: 3");
    assert!(details[0].starts_with("Time: "));
    let url_detail = details[2].strip_prefix("URL: ").expect("url detail");
    assert_eq!(url_detail.chars().count(), 53);
    assert!(url_detail.ends_with("..."));
    assert_eq!(details[3], "Duration: 2.5s • Scrolls: 3");

    let alert = state.alert.expect("alert shown");
    assert_eq!(alert.kind, AlertKind::Success);
    assert_eq!(alert.message, "Search completed successfully!");

    assert_eq!(state.loading, None);
    assert!(!state.submit_busy);
    assert!(state.submit_enabled);
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn test_metric_animation_settles_on_exact_values() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::ZERO).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    assert!(controller.submit().await.is_success());
    controller.settle_animations().await;

    assert_eq!(view.metric_text(Metric::Duration).as_deref(), Some("5s"));
    assert_eq!(view.metric_text(Metric::Steps).as_deref(), Some("4"));
    assert_eq!(view.metric_text(Metric::Scrolls).as_deref(), Some("3"));

    let frames = view.metric_frames(Metric::Steps);
    assert_eq!(frames.first().map(String::as_str), Some("0"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_renders_error_card() -> Result<()> {
    let stub = spawn_stub(500, json!({"error": "timeout"}), Duration::ZERO).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    let error = match controller.submit().await {
        SubmitOutcome::Failed { error, .. } => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(matches!(error, SearchError::Server { status: 500, .. }));
    assert_eq!(error.to_string(), "timeout");

    let state = view.state();
    let html = state.results_html.expect("error card rendered");
    assert_eq!(select_text(&html, ".error-message"), vec!["timeout"]);
    assert_eq!(select_text(&html, "li").len(), 4);

    let alert = state.alert.expect("alert shown");
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.message, "Error: timeout");

    assert!(state.submit_enabled);
    assert!(!state.submit_busy);
    assert_eq!(state.loading, None);
    assert!(!controller.is_processing());
    Ok(())
}

#[tokio::test]
async fn test_rejected_search_uses_server_message() -> Result<()> {
    let stub = spawn_stub(
        200,
        json!({"success": false, "error": "Could not find a link"}),
        Duration::ZERO,
    )
    .await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    let error = match controller.submit().await {
        SubmitOutcome::Failed { error, .. } => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(error.to_string(), "Could not find a link");
    let html = view.state().results_html.expect("error card rendered");
    assert_eq!(
        select_text(&html, ".error-message"),
        vec!["Could not find a link"]
    );
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_recovers() -> Result<()> {
    let view = filled_view();
    let controller = controller_for(&dead_base_url().await?, view.clone())?;

    let error = match controller.submit().await {
        SubmitOutcome::Failed { error, .. } => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(matches!(error, SearchError::Transport(_)));

    let state = view.state();
    assert!(state.results_html.unwrap().contains("Search Failed"));
    assert!(state.submit_enabled);
    assert_eq!(state.loading, None);
    assert_eq!(controller.phase(), ControllerPhase::Idle);

    // form left intact for a retry
    assert_eq!(view.field_value(Field::Query), "  rust crates ");
    Ok(())
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::ZERO).await?;
    let view = Arc::new(MemoryView::with_fields("   ", "example.com", "10"));
    let controller = controller_for(&stub.base_url, view.clone())?;

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Invalid));
    assert_eq!(stub.calls(), 0);

    let state = view.state();
    let alert = state.alert.expect("alert shown");
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.message, "Please fill in all required fields");
    assert!(!state.submit_enabled);
    assert!(state.results_html.is_none());
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn test_second_submit_while_pending_is_ignored() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::from_millis(300)).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    let (first, second) = tokio::join!(controller.submit(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.phase(), ControllerPhase::Submitting);
        assert_eq!(view.state().loading, Some(LoadingPhase::Initialization));
        assert!(view.state().submit_busy);
        controller.submit().await
    });

    assert!(first.is_success());
    assert!(matches!(second, SubmitOutcome::Ignored));
    assert_eq!(stub.calls(), 1);
    assert_eq!(view.state().alerts_shown.len(), 1);

    // idle again, so a new submission goes through
    assert!(controller.submit().await.is_success());
    assert_eq!(stub.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_invalid_scroll_duration_uses_default() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::ZERO).await?;
    let view = Arc::new(MemoryView::with_fields("q", "example.com", "soon"));
    let controller = controller_for(&stub.base_url, view.clone())?;

    assert!(controller.submit().await.is_success());
    let request = stub.last_request().expect("request recorded");
    assert_eq!(
        request["scroll_duration"],
        json!(controller.settings().default_scroll_duration)
    );
    Ok(())
}

#[tokio::test]
async fn test_unwrapped_result_with_capitalized_status() -> Result<()> {
    let body = json!({
        "success": true,
        "error": null,
        "steps": [
            {"step": "Driver Initialization", "status": "Completed"},
            {"step": "Google Search", "status": "Failed", "error": "captcha"}
        ],
        "final_url": "https://example.com/",
        "page_title": "Example",
        "total_duration": 3.2
    });
    let stub = spawn_stub(200, body, Duration::ZERO).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    assert!(controller.submit().await.is_success());
    let html = view.state().results_html.expect("results rendered");
    assert_eq!(
        select_text(&html, ".step-item.completed .step-title"),
        vec!["DRIVER INITIALIZATION"]
    );
    assert_eq!(
        select_text(&html, ".step-item.failed .step-title"),
        vec!["GOOGLE SEARCH"]
    );
    assert_eq!(select_text(&html, ".text-error"), vec!["captcha"]);
    assert!(html.contains("Landed on: https://example.com/ (Example)"));
    assert_eq!(select_text(&html, "#metricDuration"), vec!["3.2s"]);

    // no server session id, so the client one is shown
    let session = select_text(&html, ".result-header .text-secondary");
    assert!(session[0].starts_with("Session: session_"), "{session:?}");
    Ok(())
}

#[tokio::test]
async fn test_float_valued_counters_render() -> Result<()> {
    let body = json!({
        "success": true,
        "data": {
            "success": true,
            "session_id": "srv-float",
            "metrics": {"total_duration": 4.0, "steps_completed": 2.0, "scroll_actions": 6.0},
            "steps": [
                {"step": "search_execution", "status": "completed", "search_position": 3.0}
            ]
        }
    });
    let stub = spawn_stub(200, body, Duration::ZERO).await?;
    let view = filled_view();
    let controller = controller_for(&stub.base_url, view.clone())?;

    assert!(controller.submit().await.is_success());
    controller.settle_animations().await;

    let html = view.state().results_html.expect("results rendered");
    assert_eq!(select_text(&html, ".step-details"), vec!["Position: 3"]);
    assert_eq!(select_text(&html, "#metricSteps"), vec!["2"]);
    assert_eq!(view.metric_text(Metric::Scrolls).as_deref(), Some("6"));
    assert_eq!(view.metric_text(Metric::Duration).as_deref(), Some("4s"));
    Ok(())
}

#[tokio::test]
async fn test_health_probe_over_http() -> Result<()> {
    let stub = spawn_stub(200, success_body(), Duration::ZERO).await?;
    let view = Arc::new(MemoryView::new());
    let controller = controller_for(&stub.base_url, view.clone())?;

    let indicator = controller.health_probe().check().await;
    assert_eq!(indicator, Some(searchbot::view::HealthIndicator::Online));
    assert_eq!(
        view.state().health.map(|(_, tooltip)| tooltip).as_deref(),
        Some("Server: healthy")
    );

    // unreachable server: nothing shown, nothing raised
    let view = Arc::new(MemoryView::new());
    let controller = controller_for(&dead_base_url().await?, view.clone())?;
    assert_eq!(controller.health_probe().check().await, None);
    assert!(view.state().health.is_none());
    Ok(())
}
