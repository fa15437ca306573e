//! The assembled router: admin API authorization and MCP endpoint routing.

use super::helpers::{TestGateway, WEATHER_URL, gateway};
use axum::{
    Router,
    body::Body,
    http::{
        Method, Request, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use toolgate::{
    config::ServerConfig,
    http::{USER_ID_HEADER, USER_ROLE_HEADER, build_router},
};
use tower::ServiceExt;

const ADMIN: (&str, &str) = ("operator", "ADMIN");
const ALICE: (&str, &str) = ("alice", "USER");
const BOB: (&str, &str) = ("bob", "USER");

struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body should be JSON")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("body should be UTF-8")
    }
}

fn router(gateway: &TestGateway) -> Router {
    build_router(Arc::clone(&gateway.app), &ServerConfig::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<(&str, &str)>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = caller {
        builder = builder
            .header(USER_ID_HEADER, user_id)
            .header(USER_ROLE_HEADER, role);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    exchange(app, request).await
}

async fn exchange(app: &Router, request: Request<Body>) -> Reply {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec();
    Reply { status, body }
}

fn id_of(reply: &Reply) -> String {
    reply.json()["id"]
        .as_str()
        .expect("created id should be a string")
        .to_owned()
}

/// Registers the weather server, binds Alice and gives her a bundle.
async fn alice_bundle(app: &Router, gateway: &TestGateway) -> String {
    gateway.upstream.serve_names(WEATHER_URL, &["forecast"]);
    let created = send(
        app,
        Method::POST,
        "/api/catalog/servers",
        Some(ADMIN),
        Some(json!({"name": "weather", "url": WEATHER_URL, "access_type": "public"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let server_id = id_of(&created);

    let hub = send(
        app,
        Method::POST,
        "/api/hub/servers",
        Some(ALICE),
        Some(json!({
            "catalog_server_id": server_id,
            "auth_type": "bearer",
            "auth_value": "alice-token",
        })),
    )
    .await;
    assert_eq!(hub.status, StatusCode::OK);

    let tools = send(app, Method::GET, "/api/tools", Some(ALICE), None).await;
    assert_eq!(tools.status, StatusCode::OK);
    let tool_ids: Vec<Value> = tools.json()["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|tool| tool["id"].clone())
        .collect();
    assert_eq!(tool_ids.len(), 1);

    let bundle = send(
        app,
        Method::POST,
        "/api/virtual-servers",
        Some(ALICE),
        Some(json!({"name": "bundle", "tool_ids": tool_ids})),
    )
    .await;
    assert_eq!(bundle.status, StatusCode::OK);
    id_of(&bundle)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_check_needs_no_identity(gateway: TestGateway) {
    let app = router(&gateway);

    let reply = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "ok");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_api_requires_a_user_header(gateway: TestGateway) {
    let app = router(&gateway);

    let reply = send(&app, Method::GET, "/api/catalog/servers", None, None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["status"], 401);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn catalog_mutations_require_the_admin_role(gateway: TestGateway) {
    let app = router(&gateway);

    let reply = send(
        &app,
        Method::POST,
        "/api/catalog/servers",
        Some(ALICE),
        Some(json!({"name": "weather", "url": WEATHER_URL, "access_type": "public"})),
    )
    .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert!(gateway.upstream.connections().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_catalog_names_conflict(gateway: TestGateway) {
    let app = router(&gateway);
    let body = json!({"name": "notes", "url": "http://notes.local/mcp", "access_type": "private"});

    let first = send(&app, Method::POST, "/api/catalog/servers", Some(ADMIN), Some(body.clone())).await;
    let second = send(&app, Method::POST, "/api/catalog/servers", Some(ADMIN), Some(body)).await;
    let listed = send(&app, Method::GET, "/api/catalog/servers", Some(ALICE), None).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(listed.json()["items"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hub_views_never_echo_credentials(gateway: TestGateway) {
    let app = router(&gateway);
    alice_bundle(&app, &gateway).await;

    let reply = send(&app, Method::GET, "/api/hub/servers", Some(ALICE), None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(!reply.text().contains("alice-token"));
    assert_eq!(reply.json()["items"][0]["has_credentials"], true);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn virtual_servers_are_private_to_their_owner(gateway: TestGateway) {
    let app = router(&gateway);
    let bundle_id = alice_bundle(&app, &gateway).await;
    let uri = format!("/api/virtual-servers/{bundle_id}/tools");

    let own = send(&app, Method::GET, &uri, Some(ALICE), None).await;
    let foreign = send(&app, Method::GET, &uri, Some(BOB), None).await;

    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.json()["items"][0]["original_name"], "forecast");
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tools_outside_the_callers_bindings_cannot_be_bundled(gateway: TestGateway) {
    let app = router(&gateway);
    let bundle_id = alice_bundle(&app, &gateway).await;
    let attached = send(
        &app,
        Method::GET,
        &format!("/api/virtual-servers/{bundle_id}/tools"),
        Some(ALICE),
        None,
    )
    .await;
    let forecast = attached.json()["items"][0]["id"].clone();

    let reply = send(
        &app,
        Method::POST,
        "/api/virtual-servers",
        Some(BOB),
        Some(json!({"name": "bundle", "tool_ids": [forecast]})),
    )
    .await;
    let listed = send(&app, Method::GET, "/api/virtual-servers", Some(BOB), None).await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(listed.json()["items"].as_array().map(Vec::len), Some(0));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mcp_endpoint_is_post_only_and_keyed_by_uuid(gateway: TestGateway) {
    let app = router(&gateway);
    let uri = format!("/servers/{}/mcp", uuid::Uuid::new_v4());
    let stream_request = Request::builder()
        .method(Method::GET)
        .uri(&uri)
        .header(ACCEPT, "text/event-stream")
        .body(Body::empty())
        .expect("request should build");

    let streamed = exchange(&app, stream_request).await;
    let malformed = send(&app, Method::POST, "/servers/not-a-uuid/mcp", None, Some(json!({}))).await;

    assert_eq!(streamed.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(gateway.upstream.connections().is_empty());
}
