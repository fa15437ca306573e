//! The streamable-HTTP connector against a live MCP server.

use super::upstream_fixture::{Paging, ScriptedUpstream};
use axum::http::Method;
use rstest::{fixture, rstest};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use toolgate::upstream::{
    UpstreamClient, UpstreamEndpoint, UpstreamError, UpstreamHeaders,
    adapters::{HttpUpstreamConnector, HttpUpstreamSettings},
};

const TOKEN: &str = "Bearer tenant-token";

#[fixture]
fn client() -> UpstreamClient<HttpUpstreamConnector> {
    let settings = HttpUpstreamSettings {
        request_timeout: Duration::from_secs(5),
        ..HttpUpstreamSettings::default()
    };
    let connector = HttpUpstreamConnector::new(settings).expect("connector should build");
    UpstreamClient::new(Arc::new(connector), Duration::from_secs(5))
}

fn authorized(url: &str) -> UpstreamEndpoint {
    let mut headers = UpstreamHeaders::new();
    headers.insert("Authorization".to_owned(), TOKEN.to_owned());
    UpstreamEndpoint::new(url, headers)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discovery_runs_one_full_session(client: UpstreamClient<HttpUpstreamConnector>) {
    let upstream =
        ScriptedUpstream::start(Paging::Pages(vec![vec!["forecast", "alerts"], vec!["radar"]])).await;

    let discovered = client
        .discover(&authorized(&upstream.url))
        .await
        .expect("discovery should succeed");

    let names: Vec<&str> = discovered.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, ["forecast", "alerts", "radar"]);
    assert!(discovered.capabilities["tools"].is_object());
    assert_eq!(
        upstream.posted_methods(),
        ["initialize", "notifications/initialized", "tools/list", "tools/list"]
    );
    let deleted = upstream
        .wait_for_delete()
        .await
        .expect("the session should be deleted on close");
    assert!(deleted.session_id.is_some());
    let exchanges = upstream.exchanges();
    assert!(
        exchanges
            .iter()
            .all(|exchange| exchange.authorization.as_deref() == Some(TOKEN))
    );
    assert!(
        exchanges
            .iter()
            .filter(|exchange| exchange.http_method == Method::POST)
            .skip(1)
            .all(|exchange| exchange.session_id == deleted.session_id)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tool_calls_pass_arguments_and_results_through(
    client: UpstreamClient<HttpUpstreamConnector>,
) {
    let upstream = ScriptedUpstream::start(Paging::Pages(vec![vec!["forecast"]])).await;

    let result = client
        .call_tool(&authorized(&upstream.url), "forecast", json!({"city": "Oslo"}))
        .await
        .expect("call should succeed");

    assert!(!result.is_error());
    assert_eq!(
        result.as_value()["content"][0]["text"],
        r#"forecast called with {"city":"Oslo"}"#
    );
    assert_eq!(
        upstream.posted_methods(),
        ["initialize", "notifications/initialized", "tools/call"]
    );
    assert!(upstream.wait_for_delete().await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn endless_pagination_is_cut_off(client: UpstreamClient<HttpUpstreamConnector>) {
    let upstream = ScriptedUpstream::start(Paging::Endless).await;

    let outcome = client.list_tools(&authorized(&upstream.url)).await;

    assert!(matches!(outcome, Err(UpstreamError::Protocol(_))));
    assert!(upstream.wait_for_delete().await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_connections_are_connect_errors(client: UpstreamClient<HttpUpstreamConnector>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("loopback port should bind");
    let address = listener.local_addr().expect("listener has an address");
    drop(listener);

    let outcome = client
        .list_tools(&UpstreamEndpoint::anonymous(format!("http://{address}/mcp")))
        .await;

    assert!(matches!(outcome, Err(UpstreamError::Connect { .. })));
}
