//! Virtual server endpoints driven by a real MCP client over HTTP.

use super::helpers::{
    TestGateway, WEATHER_URL, bind_bearer, bundle, gateway, publish_forecast, unbind, user,
};
use rstest::rstest;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use toolgate::{
    gateway::{TOOL_NOT_FOUND, UNAUTHORIZED},
    registry::domain::VirtualServerId,
    upstream::{
        UpstreamClient, UpstreamEndpoint, UpstreamError,
        adapters::{HttpUpstreamConnector, HttpUpstreamSettings},
    },
};

fn mcp_client() -> UpstreamClient<HttpUpstreamConnector> {
    let settings = HttpUpstreamSettings {
        request_timeout: Duration::from_secs(5),
        ..HttpUpstreamSettings::default()
    };
    let connector = HttpUpstreamConnector::new(settings).expect("connector should build");
    UpstreamClient::new(Arc::new(connector), Duration::from_secs(5))
}

fn endpoint(base_url: &str, virtual_server: VirtualServerId) -> UpstreamEndpoint {
    UpstreamEndpoint::anonymous(format!("{base_url}/servers/{virtual_server}/mcp"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bundles_are_listed_and_called_under_upstream_names(gateway: TestGateway) {
    let forecast = publish_forecast(&gateway).await;
    let alice = user("alice");
    bind_bearer(&gateway, &alice, WEATHER_URL, "alice-token").await;
    let alice_bundle = bundle(&gateway, &alice, &[forecast]).await;
    let served = gateway.serve().await;
    let client = mcp_client();
    let target = endpoint(&served.base_url, alice_bundle);

    let discovered = client.discover(&target).await.expect("discovery should succeed");
    let result = client
        .call_tool(&target, "forecast", json!({"city": "Leeds"}))
        .await
        .expect("call should succeed");

    assert!(discovered.capabilities["tools"].is_object());
    let names: Vec<&str> = discovered.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, ["forecast"]);
    assert_eq!(
        discovered.tools.first().map(|tool| &tool.input_schema),
        Some(&json!({"type": "object"}))
    );
    assert!(!result.is_error());
    assert_eq!(result.as_value()["content"][0]["text"], "forecast ok");
    let calls = gateway.upstream.calls();
    let call = calls.first().expect("one upstream call");
    assert_eq!(call.arguments, json!({"city": "Leeds"}));
    assert_eq!(
        call.headers.get("Authorization").map(String::as_str),
        Some("Bearer alice-token")
    );
    assert_eq!(gateway.upstream.open_sessions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refusals_arrive_as_protocol_errors(gateway: TestGateway) {
    let forecast = publish_forecast(&gateway).await;
    let bob = user("bob");
    bind_bearer(&gateway, &bob, WEATHER_URL, "bob-token").await;
    let bob_bundle = bundle(&gateway, &bob, &[forecast]).await;
    unbind(&gateway, &bob).await;
    let served = gateway.serve().await;
    let client = mcp_client();
    let target = endpoint(&served.base_url, bob_bundle);

    let unbound = client
        .call_tool(&target, "forecast", json!({}))
        .await
        .expect_err("bob's binding is gone");
    let unknown = client
        .call_tool(&target, "weather-forecast", json!({}))
        .await
        .expect_err("modified names are not callable");

    assert!(matches!(unbound, UpstreamError::Rpc { code, .. } if code == i64::from(UNAUTHORIZED.0)));
    assert!(matches!(unknown, UpstreamError::Rpc { code, .. } if code == i64::from(TOOL_NOT_FOUND.0)));
    assert!(gateway.upstream.calls().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_virtual_servers_expose_no_tools(gateway: TestGateway) {
    let served = gateway.serve().await;

    let tools = mcp_client()
        .list_tools(&endpoint(&served.base_url, VirtualServerId::new()))
        .await
        .expect("listing should succeed");

    assert!(tools.is_empty());
}
