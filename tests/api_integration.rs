//! End-to-end API integration tests
//!
//! These tests drive the real router over the in-memory repository:
//! - Team creation, listing, filtering, partial and full updates, deletion
//! - Basic authentication on write endpoints and denial of unlisted routes
//! - The uniform error body for validation and not-found failures

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde_json::{json, Value};
use soccer_api::api::{self, AppState};
use soccer_api::auth::CredentialStore;
use soccer_api::infrastructure::repositories::InMemoryTeamRepository;
use soccer_api::services::TeamService;
use tower::util::ServiceExt; // for oneshot

/// Setup test application with an empty store and one admin user
fn setup_app() -> Router {
    let repository = Arc::new(InMemoryTeamRepository::new());
    let credentials = CredentialStore::new()
        .with_user("admin", "admin", 4)
        .expect("credential store");

    api::router(AppState::new(TeamService::new(repository), credentials))
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{user}:{password}")))
}

/// Sends one request and returns status plus parsed JSON (Null for empty bodies)
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    (status, json)
}

fn admin() -> Option<String> {
    Some(basic("admin", "admin"))
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, created) = send(app, Method::POST, "/api/teams", admin(), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {created}");
    created
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn test_create_then_read() {
    let app = setup_app();

    let created = create(
        &app,
        json!({ "name": "Paris Saint-Germain", "acronym": "PSG", "budget": 800000000, "players": [] }),
    )
    .await;
    assert!(created["id"].as_i64().is_some());

    let (status, page) = send(&app, Method::GET, "/api/teams", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let first = &page["content"][0];
    assert_eq!(first["name"], "Paris Saint-Germain");
    assert_eq!(first["acronym"], "PSG");
    assert_eq!(first["budget"].as_f64(), Some(800000000.0));
    assert_eq!(first["players"], json!([]));
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["number"], 0);
    assert_eq!(page["size"], 10);
    assert_eq!(page["first"], true);
    assert_eq!(page["last"], true);
}

#[tokio::test]
async fn test_create_with_players_returns_ids() {
    let app = setup_app();

    let created = create(
        &app,
        json!({
            "name": "Olympique de Marseille",
            "acronym": "OM",
            "budget": "12.50",
            "players": [
                { "name": "Pau Lopez", "position": "GOALKEEPER" },
                { "name": "Dimitri Payet", "position": "MIDFIELDER" }
            ]
        }),
    )
    .await;

    assert_eq!(created["budget"].as_f64(), Some(12.5));
    let players = created["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p["id"].as_i64().is_some()));
    assert_eq!(players[1]["position"], "MIDFIELDER");
    assert!(players[0].get("team").is_none());
    assert!(players[0].get("teamId").is_none());
}

#[tokio::test]
async fn test_create_with_invalid_name() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teams",
        admin(),
        Some(json!({ "name": "", "acronym": "PSG", "budget": 800000000, "players": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["fields"][0]["field"], "name");
    assert_eq!(body["fields"][0]["rejectedValue"], "");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_with_malformed_body() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teams",
        admin(),
        Some(json!({ "name": "T", "acronym": "T", "budget": 1, "players": [{ "name": "A", "position": "COACH" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("position"));
    assert!(body.get("fields").is_none());
}

#[tokio::test]
async fn test_write_requires_credentials() {
    let app = setup_app();
    let body = json!({ "name": "T", "acronym": "T", "budget": 1, "players": [] });

    let (status, error) = send(&app, Method::POST, "/api/teams", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["status"], 401);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/teams",
        Some(basic("admin", "wrong")),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, page) = send(&app, Method::GET, "/api/teams", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 0);
}

#[tokio::test]
async fn test_unauthorized_response_carries_challenge() {
    let app = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/teams/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        r#"Basic realm="soccer""#
    );
}

#[tokio::test]
async fn test_unlisted_routes_are_denied() {
    let app = setup_app();

    let (status, _) = send(&app, Method::GET, "/api/players", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/players", admin(), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    // Listed path, unlisted method
    let (status, _) = send(&app, Method::GET, "/api/teams/1", admin(), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patch_existing() {
    let app = setup_app();
    let created = create(
        &app,
        json!({ "name": "Old Name", "acronym": "OLD", "budget": 1, "players": [{ "name": "A", "position": "DEFENDER" }] }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/teams/{id}"),
        admin(),
        Some(json!({ "name": "New Name", "budget": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New Name");
    assert_eq!(body["budget"].as_f64(), Some(10.0));
    assert_eq!(body["acronym"], "OLD");
    assert_eq!(body["players"], created["players"]);
}

#[tokio::test]
async fn test_patch_unknown() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/teams/99",
        admin(),
        Some(json!({ "name": "X", "budget": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Team not found with id 99");
}

#[tokio::test]
async fn test_patch_violations_on_existing_team() {
    let app = setup_app();
    let created = create(&app, json!({ "name": "Lyon", "acronym": "OL", "budget": 5 })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/teams/{id}"),
        admin(),
        Some(json!({ "name": "X", "budget": -1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["name", "budget"]);
}

#[tokio::test]
async fn test_full_replace_rebuilds_players() {
    let app = setup_app();
    let created = create(
        &app,
        json!({ "name": "Old", "acronym": "OLD", "budget": 1, "players": [{ "name": "A", "position": "MIDFIELDER" }] }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let original_player = created["players"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/teams/{id}"),
        admin(),
        Some(json!({
            "name": "NN",
            "acronym": "NEW",
            "budget": 1000,
            "players": [{ "name": "Kylian Mbappe", "position": "FORWARD" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acronym"], "NEW");

    let (_, page) = send(&app, Method::GET, "/api/teams", None, None).await;
    let players = page["content"][0]["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Kylian Mbappe");
    assert_eq!(players[0]["position"], "FORWARD");
    assert_ne!(players[0]["id"].as_i64().unwrap(), original_player);
}

#[tokio::test]
async fn test_full_replace_is_validated() {
    let app = setup_app();
    let created = create(&app, json!({ "name": "Nice", "acronym": "OGCN", "budget": 3 })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/teams/{id}"),
        admin(),
        Some(json!({ "name": "Nice", "players": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "acronym"));
    assert!(fields.iter().any(|f| f["field"] == "budget"));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/teams/404",
        admin(),
        Some(json!({ "name": "N", "acronym": "N", "budget": 1, "players": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter() {
    let app = setup_app();
    create(&app, json!({ "name": "OM", "acronym": "OM", "budget": 10000000 })).await;
    create(&app, json!({ "name": "OL", "acronym": "OL", "budget": 5000000 })).await;

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/teams/filter?name=om&minBudget=10000000",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["name"], "OM");

    let (_, everything) = send(&app, Method::GET, "/api/teams/filter", None, None).await;
    assert_eq!(everything["totalElements"], 2);
    assert_eq!(everything["size"], 10);
}

#[tokio::test]
async fn test_listing_sorts_and_pages() {
    let app = setup_app();
    for (name, budget) in [("Alpha", 3), ("Bravo", 1), ("Charlie", 2)] {
        create(&app, json!({ "name": name, "acronym": "X", "budget": budget })).await;
    }

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/teams?page=0&size=2&sortBy=budget&direction=DESC",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content"][0]["name"], "Alpha");
    assert_eq!(page["content"][1]["name"], "Charlie");
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["numberOfElements"], 2);
    assert_eq!(page["last"], false);

    let (_, second) = send(&app, Method::GET, "/api/teams?page=1&size=2", None, None).await;
    assert_eq!(second["content"][0]["name"], "Charlie");
    assert_eq!(second["last"], true);
}

#[tokio::test]
async fn test_listing_parameter_violations() {
    let app = setup_app();

    let (status, body) = send(&app, Method::GET, "/api/teams?page=-1&size=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["violations"][0]["property"], "page");
    assert_eq!(body["violations"][0]["invalidValue"], -1);
    assert_eq!(body["violations"][1]["property"], "size");

    let (status, body) = send(&app, Method::GET, "/api/teams?page=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("violations").is_none());

    let (status, body) = send(&app, Method::GET, "/api/teams?sortBy=colour", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No property 'colour' found for type 'Team'");
}

#[tokio::test]
async fn test_empty_listing_parameters_use_defaults() {
    let app = setup_app();
    for (name, budget) in [("Charlie", 2), ("Alpha", 3), ("Bravo", 1)] {
        create(&app, json!({ "name": name, "acronym": "X", "budget": budget })).await;
    }

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/teams?page=&size=&sortBy=&direction=",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {page}");
    assert_eq!(page["number"], 0);
    assert_eq!(page["size"], 10);
    let names: Vec<_> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|team| team["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
}

#[tokio::test]
async fn test_empty_filter_parameters_match_everything() {
    let app = setup_app();
    create(&app, json!({ "name": "OM", "acronym": "OM", "budget": 10000000 })).await;
    create(&app, json!({ "name": "OL", "acronym": "OL", "budget": 5000000 })).await;

    let (status, page) = send(&app, Method::GET, "/api/teams/filter?name=&minBudget=", None, None).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {page}");
    assert_eq!(page["totalElements"], 2);

    let (status, page) = send(&app, Method::GET, "/api/teams/filter?minBudget=&name=ol", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["name"], "OL");
}

#[tokio::test]
async fn test_delete() {
    let app = setup_app();
    let created = create(&app, json!({ "name": "Lens", "acronym": "RCL", "budget": 2 })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::DELETE, &format!("/api/teams/{id}"), admin(), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/teams/{id}"), admin(), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Team not found with id {id}"));

    let (_, page) = send(&app, Method::GET, "/api/teams", None, None).await;
    assert_eq!(page["totalElements"], 0);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = setup_app();

    let (status, _) = send(&app, Method::DELETE, "/api/teams/abc", admin(), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
