use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::json;
use server::{cli::Cli, routes, AppState};
use tower::ServiceExt;
use uuid::Uuid;

/// Router with default configuration: no spreadsheet id, no OAuth client
fn app() -> Router {
    let args = Cli::parse_from(["server"]);
    routes::router(AppState::new(args))
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("non-JSON body: {e}"))
}

#[tokio::test]
async fn ping_needs_no_auth() {
    let response = app()
        .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn data_endpoints_reject_anonymous_requests_with_json() {
    let endpoints = [
        ("GET", "/api/user"),
        ("GET", "/api/plan/monday"),
        ("GET", "/api/catalog"),
        ("POST", "/api/session"),
        ("GET", "/api/session/abc/sets"),
        ("POST", "/api/session/abc/sets"),
        ("POST", "/api/session/abc/finish"),
        ("PUT", "/api/sets/00000000-0000-0000-0000-000000000000"),
        ("DELETE", "/api/sets/00000000-0000-0000-0000-000000000000"),
        ("GET", "/api/setup/bench_press"),
        ("PUT", "/api/setup/bench_press"),
        ("GET", "/api/history/bench_press"),
    ];

    for (method, uri) in endpoints {
        let response = app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        // Every failure is a structured JSON payload, never a bare status
        let json = body_json(response).await;
        assert_eq!(json["kind"], "inner", "{method} {uri}");
        assert_eq!(json["inner"], "Unauthorized", "{method} {uri}");
    }
}

#[tokio::test]
async fn login_without_oauth_config_is_a_structured_error() {
    let response = app()
        .oneshot(Request::builder().uri("/api/auth/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "inner");
    let message = json["inner"]["Misconfigured"]["message"].as_str().unwrap();
    assert!(message.contains("OAUTH_CLIENT_ID"), "unexpected message: {message}");
}

#[tokio::test]
async fn logout_works_without_a_session() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn callback_without_state_is_a_validation_error() {
    let response = app()
        .oneshot(
            Request::builder().uri("/api/auth/callback?code=abc").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "validation");
}

// --- Mock backend: values API plus token/userinfo endpoints ---

#[derive(Clone, Default)]
struct MockBackend {
    tabs: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
    /// Tab names whose appends fail with a 500
    failing_appends: Arc<Mutex<Vec<String>>>,
}

fn json_row(body: &serde_json::Value) -> Vec<String> {
    body["values"][0]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}

async fn mock_get(
    State(mock): State<MockBackend>,
    Path((_doc, tab)): Path<(String, String)>,
) -> Json<serde_json::Value> {
    let tabs = mock.tabs.lock().unwrap();
    let values = tabs.get(&tab).cloned().unwrap_or_default();
    Json(json!({ "values": values }))
}

async fn mock_append(
    State(mock): State<MockBackend>,
    Path((_doc, range)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let tab = range.strip_suffix(":append").unwrap().to_string();
    if mock.failing_appends.lock().unwrap().contains(&tab) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock backend refused the append")
            .into_response();
    }
    mock.tabs.lock().unwrap().entry(tab).or_default().push(json_row(&body));
    Json(json!({})).into_response()
}

async fn mock_update(
    State(mock): State<MockBackend>,
    Path((_doc, range)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    // Range looks like "Sessions!A2:K2"; the row number follows the A
    let (tab, cells) = range.split_once('!').unwrap();
    let row_number: usize = cells[1..].split(':').next().unwrap().parse().unwrap();
    let mut tabs = mock.tabs.lock().unwrap();
    tabs.get_mut(tab).unwrap()[row_number - 1] = json_row(&body);
    Json(json!({}))
}

async fn mock_token() -> Json<serde_json::Value> {
    Json(json!({
        "access_token": "mock-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "mock-refresh",
    }))
}

async fn mock_userinfo() -> Json<serde_json::Value> {
    Json(json!({ "email": "user@example.com" }))
}

async fn spawn_backend(mock: MockBackend) -> SocketAddr {
    let router = Router::new()
        .route("/sheets/:doc/values/:range", get(mock_get).post(mock_append).put(mock_update))
        .route("/token", post(mock_token))
        .route("/userinfo", get(mock_userinfo))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Every tab with its canonical header row, plus one planned exercise for
/// user@example.com on monday
fn seeded_backend() -> MockBackend {
    let mock = MockBackend::default();
    {
        let mut tabs = mock.tabs.lock().unwrap();
        tabs.insert(
            "Plan".to_string(),
            vec![
                row(&[
                    "UserEmail", "Day", "Exercise", "Order", "PlannedSets", "RepRange",
                    "RestSecs", "VideoUrl",
                ]),
                row(&["user@example.com", "monday", "bench_press", "1", "2", "5-8", "", ""]),
            ],
        );
        tabs.insert(
            "Sessions".to_string(),
            vec![row(&[
                "SessionId", "UserEmail", "PlanDay", "StartedAt", "EndedAt", "Timezone",
                "PlannedExercises", "CompletedExercises", "TotalSets", "Notes", "CreatedAt",
            ])],
        );
        tabs.insert(
            "Sets".to_string(),
            vec![row(&[
                "SetId", "SessionId", "Exercise", "SetNumber", "Weight", "Reps", "RPE",
                "Skipped", "SkipReason", "RestTakenSecs", "RestTargetSecs", "Notes", "Deleted",
                "CreatedAt",
            ])],
        );
        tabs.insert(
            "Setup".to_string(),
            vec![row(&["UserEmail", "Exercise", "RestSecs", "RequiresWeight", "Notes"])],
        );
        tabs.insert(
            "Catalog".to_string(),
            vec![row(&[
                "Exercise", "Name", "VideoUrl", "DefaultRestSecs", "RequiresWeight", "Active",
            ])],
        );
        tabs.insert(
            "Notes".to_string(),
            vec![row(&["SessionId", "Exercise", "Note", "CreatedAt"])],
        );
    }
    mock
}

fn configured_app(addr: SocketAddr) -> Router {
    let base = format!("http://{addr}");
    let args = Cli::parse_from([
        "server".to_string(),
        "--spreadsheet-id=doc".to_string(),
        format!("--sheets-base-url={base}/sheets"),
        "--oauth-client-id=mock-client".to_string(),
        "--oauth-client-secret=mock-secret".to_string(),
        format!("--oauth-token-url={base}/token"),
        format!("--oauth-userinfo-url={base}/userinfo"),
    ]);
    routes::router(AppState::new(args))
}

/// Full login round-trip against the mock provider; returns the session
/// cookie carrying the grant
async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/auth/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets the session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let login = body_json(response).await;
    let authorize_url = login["authorize_url"].as_str().unwrap();
    let state = authorize_url
        .split_once('?')
        .unwrap()
        .1
        .split('&')
        .find_map(|p| p.strip_prefix("state="))
        .unwrap();

    let uri = format!("/api/auth/callback?code=mock-code&state={state}");
    let response = app
        .clone()
        .oneshot(
            Request::builder().uri(uri).header(header::COOKIE, &cookie).body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    cookie
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder().method(method).uri(uri).header(header::COOKIE, cookie);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn full_workout_flow_against_the_mock_backend() {
    let mock = seeded_backend();
    let addr = spawn_backend(mock.clone()).await;
    let app = configured_app(addr);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/session",
        &cookie,
        Some(json!({ "plan_day": "monday", "timezone": "Europe/London" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let session_id = created["session"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["progression"]["phase"]["phase"], "active");

    let response = send(
        &app,
        "POST",
        &format!("/api/session/{session_id}/sets"),
        &cookie,
        Some(json!({ "exercise": "bench_press", "weight": 60.0, "reps": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["set"]["set_number"], 1);

    let response =
        send(&app, "GET", &format!("/api/session/{session_id}/sets"), &cookie, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        "POST",
        &format!("/api/session/{session_id}/finish"),
        &cookie,
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let finished = body_json(response).await;
    assert!(finished["ended_at"].is_string());
    assert_eq!(finished["total_sets"], 1);

    // Finishing again returns the session unchanged, no second stamp
    let response = send(
        &app,
        "POST",
        &format!("/api/session/{session_id}/finish"),
        &cookie,
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let again = body_json(response).await;
    assert_eq!(again["ended_at"], finished["ended_at"]);
}

#[tokio::test]
async fn failed_note_append_surfaces_after_the_end_stamp() {
    let mock = seeded_backend();
    mock.failing_appends.lock().unwrap().push("Notes".to_string());
    let addr = spawn_backend(mock.clone()).await;
    let app = configured_app(addr);
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/session",
        &cookie,
        Some(json!({ "plan_day": "monday", "timezone": "UTC" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = body_json(response).await["session"]["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "POST",
        &format!("/api/session/{session_id}/finish"),
        &cookie,
        Some(json!({
            "exercise_notes": [{ "exercise": "bench_press", "note": "felt heavy" }],
        })),
    )
    .await;

    // The lost note is an error, not a silently successful finish
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error = body_json(response).await;
    assert_eq!(error["kind"], "inner");
    assert_eq!(error["inner"]["Backend"]["status"], 500);

    // The end stamp landed before the note failure; a retry won't restamp
    let tabs = mock.tabs.lock().unwrap();
    assert!(!tabs["Sessions"][1][4].is_empty());
}

#[tokio::test]
async fn another_users_set_reads_as_absent() {
    let mock = seeded_backend();
    let set_id = Uuid::new_v4();
    let sid = set_id.to_string();
    {
        let mut tabs = mock.tabs.lock().unwrap();
        tabs.get_mut("Sessions").unwrap().push(row(&[
            "other-session",
            "other@example.com",
            "monday",
            "2026-03-01T10:00:00+00:00",
            "",
            "UTC",
            "1",
            "0",
            "1",
            "",
            "2026-03-01T10:00:00+00:00",
        ]));
        tabs.get_mut("Sets").unwrap().push(row(&[
            sid.as_str(),
            "other-session",
            "bench_press",
            "1",
            "100",
            "5",
            "",
            "FALSE",
            "",
            "",
            "",
            "",
            "FALSE",
            "2026-03-01T10:05:00+00:00",
        ]));
    }
    let addr = spawn_backend(mock.clone()).await;
    let app = configured_app(addr);
    // Signs in as user@example.com, who does not own other-session
    let cookie = sign_in(&app).await;

    let response =
        send(&app, "PUT", &format!("/api/sets/{set_id}"), &cookie, Some(json!({ "reps": 6 }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", &format!("/api/sets/{set_id}"), &cookie, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/api/session/other-session/sets", &cookie, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The row is untouched
    let tabs = mock.tabs.lock().unwrap();
    assert_eq!(tabs["Sets"][1][5], "5");
}
