//! Proxy authorization and upstream failure handling across tenants.

use super::helpers::{
    NOTES_URL, TestGateway, WEATHER_URL, bind_bearer, bundle, gateway, publish_forecast, unbind,
    user,
};
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use toolgate::{
    composer::ComposerError,
    gateway::{ProxyError, UNAUTHORIZED, UPSTREAM_FAILURE},
    registry::domain::{AccessType, ToolFilter},
    upstream::UpstreamError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_bound_owner_may_call_a_shared_tool(gateway: TestGateway) {
    let forecast = publish_forecast(&gateway).await;
    let alice = user("alice");
    let bob = user("bob");
    bind_bearer(&gateway, &alice, WEATHER_URL, "alice-token").await;
    bind_bearer(&gateway, &bob, WEATHER_URL, "bob-token").await;
    let alice_bundle = bundle(&gateway, &alice, &[forecast]).await;
    let bob_bundle = bundle(&gateway, &bob, &[forecast]).await;
    unbind(&gateway, &bob).await;

    let refused = gateway
        .app
        .proxy
        .call_tool(bob_bundle, "forecast", json!({"city": "Leeds"}))
        .await
        .expect_err("bob is refused");
    assert_eq!(refused.rpc_code(), UNAUTHORIZED);
    assert!(gateway.upstream.calls().is_empty());

    let answered = gateway
        .app
        .proxy
        .call_tool(alice_bundle, "forecast", json!({"city": "Leeds"}))
        .await
        .expect("alice is served");
    assert!(!answered.is_error());
    let calls = gateway.upstream.calls();
    let call = calls.first().expect("alice reached upstream");
    assert_eq!(call.arguments, json!({"city": "Leeds"}));
    assert_eq!(
        call.headers.get("Authorization").map(String::as_str),
        Some("Bearer alice-token")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unbound_tenants_cannot_bundle_shared_tools(gateway: TestGateway) {
    let forecast = publish_forecast(&gateway).await;
    let bob = user("bob");

    let err = gateway
        .app
        .composer
        .create_with_tools(bob.clone(), "bundle", &[forecast])
        .await
        .expect_err("bob has no binding to the weather server");

    assert!(matches!(err, ComposerError::ToolNotVisible(id) if id == forecast));
    assert!(
        gateway
            .app
            .composer
            .list_for_user(&bob)
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tenant_tools_are_called_with_the_owners_credentials(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
    gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    let alice = user("alice");
    let bob = user("bob");
    bind_bearer(&gateway, &alice, NOTES_URL, "alice-notes").await;
    bind_bearer(&gateway, &bob, NOTES_URL, "bob-notes").await;
    let bobs_search = gateway
        .app
        .tools
        .list_for_user(&bob, &ToolFilter::default())
        .await
        .expect("listing should succeed")
        .first()
        .expect("bob has a search tool")
        .id();
    let bob_bundle = bundle(&gateway, &bob, &[bobs_search]).await;

    gateway
        .app
        .proxy
        .call_tool(bob_bundle, "search", json!({"q": "rust"}))
        .await
        .expect("call should succeed");

    let calls = gateway.upstream.calls();
    let call = calls.last().expect("one upstream call");
    assert_eq!(
        call.headers.get("Authorization").map(String::as_str),
        Some("Bearer bob-notes")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn another_tenants_private_tool_cannot_be_attached(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
    gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    let alice = user("alice");
    let bob = user("bob");
    bind_bearer(&gateway, &alice, NOTES_URL, "alice-notes").await;
    bind_bearer(&gateway, &bob, NOTES_URL, "bob-notes").await;
    let alices_search = gateway
        .app
        .tools
        .list_for_user(&alice, &ToolFilter::default())
        .await
        .expect("listing should succeed")
        .first()
        .expect("alice has a search tool")
        .id();
    let bob_bundle = bundle(&gateway, &bob, &[]).await;

    let err = gateway
        .app
        .composer
        .replace_tools(bob_bundle, &[alices_search])
        .await
        .expect_err("alice's tool is private to alice");

    assert!(matches!(err, ComposerError::ToolNotVisible(id) if id == alices_search));
    assert!(
        gateway
            .app
            .composer
            .list_tools(bob_bundle)
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_upstream_calls_time_out() {
    let gateway = TestGateway::with_limits(None, 50, Duration::from_millis(50));
    let forecast = publish_forecast(&gateway).await;
    let alice = user("alice");
    bind_bearer(&gateway, &alice, WEATHER_URL, "alice-token").await;
    let alice_bundle = bundle(&gateway, &alice, &[forecast]).await;
    gateway.upstream.delay_calls(Duration::from_millis(500));

    let err = gateway
        .app
        .proxy
        .call_tool(alice_bundle, "forecast", json!({}))
        .await
        .expect_err("call should time out");

    assert!(matches!(
        err,
        ProxyError::Upstream(UpstreamError::Timeout {
            operation: "tools/call",
            ..
        })
    ));
    assert_eq!(err.rpc_code(), UPSTREAM_FAILURE);
    assert_eq!(gateway.upstream.open_sessions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_the_binding_revokes_access(gateway: TestGateway) {
    let forecast = publish_forecast(&gateway).await;
    let alice = user("alice");
    bind_bearer(&gateway, &alice, WEATHER_URL, "alice-token").await;
    let alice_bundle = bundle(&gateway, &alice, &[forecast]).await;
    let hub_id = gateway
        .app
        .hubs
        .list_for_user(&alice)
        .await
        .expect("listing should succeed")
        .first()
        .expect("one binding")
        .hub
        .id();

    gateway
        .app
        .hubs
        .delete(&alice, hub_id)
        .await
        .expect("delete should succeed");
    let err = gateway
        .app
        .proxy
        .call_tool(alice_bundle, "forecast", json!({}))
        .await
        .expect_err("call should be refused");

    assert!(matches!(err, ProxyError::Unauthorized { .. }));
    assert_eq!(err.rpc_code(), UNAUTHORIZED);
}
