//! Hub binding atomicity and credential handling.

use super::helpers::{NOTES_URL, TestGateway, VAULT_KEY, gateway, user, vaulted_gateway};
use rstest::rstest;
use serde_json::json;
use toolgate::{
    reconciliation::{AddHubRequest, ReconciliationError},
    registry::{
        domain::{AccessType, AuthType},
        ports::HubRepository,
    },
    upstream::UpstreamError,
    vault::{CredentialVault, EncryptedEnvelope},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_discovery_stores_no_hub_and_no_tools(gateway: TestGateway) {
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    gateway.upstream.fail_connections(NOTES_URL);
    let tenant = user("tenant-a");

    let err = gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: tenant.clone(),
            catalog_server_id: server.id(),
            auth_type: AuthType::Bearer,
            auth_value: Some(json!("tok")),
        })
        .await
        .expect_err("hub add should fail");

    assert!(matches!(
        err,
        ReconciliationError::Upstream(UpstreamError::Connect { .. })
    ));
    assert!(
        gateway
            .registry
            .list_hubs_for_user(&tenant)
            .await
            .expect("listing should succeed")
            .is_empty()
    );
    assert_eq!(gateway.registry.tool_count().expect("count"), 0);
    assert_eq!(gateway.upstream.open_sessions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_failure_after_handshake_closes_the_session(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    gateway.upstream.fail_listing(NOTES_URL);

    let result = gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: user("tenant-a"),
            catalog_server_id: server.id(),
            auth_type: AuthType::None,
            auth_value: None,
        })
        .await;

    assert!(result.is_err());
    assert_eq!(gateway.upstream.connections().len(), 1);
    assert_eq!(gateway.upstream.open_sessions(), 0);
    assert_eq!(gateway.registry.tool_count().expect("count"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn credentials_are_sealed_at_rest_and_opened_for_upstream(vaulted_gateway: TestGateway) {
    let gateway = vaulted_gateway;
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    let tenant = user("tenant-a");

    gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: tenant.clone(),
            catalog_server_id: server.id(),
            auth_type: AuthType::CustomHeaders,
            auth_value: Some(json!({"X-Api-Key": "k-123"})),
        })
        .await
        .expect("hub should be added");

    let binding = gateway
        .registry
        .find_hub_for_user(&tenant, server.id())
        .await
        .expect("lookup should succeed")
        .expect("binding should exist");
    let stored = binding.hub.auth_value().expect("credential is stored");
    assert!(!stored.to_string().contains("k-123"));
    let envelope = EncryptedEnvelope::from_value(stored).expect("stored value is an envelope");
    let vault = CredentialVault::from_hex(VAULT_KEY).expect("valid key");
    let opened = vault
        .decrypt_from_json(&envelope)
        .expect("envelope should open with the same key");
    let plaintext: serde_json::Value =
        serde_json::from_slice(&opened).expect("plaintext is JSON");
    assert_eq!(plaintext, json!({"X-Api-Key": "k-123"}));

    let connections = gateway.upstream.connections();
    let connection = connections.first().expect("discovery connected");
    assert_eq!(
        connection.headers.get("X-Api-Key").map(String::as_str),
        Some("k-123")
    );
}

#[rstest]
#[case(AuthType::Bearer, Some(json!({"token": "x"})))]
#[case(AuthType::CustomHeaders, Some(json!("not-an-object")))]
#[case(AuthType::None, Some(json!("stray")))]
#[tokio::test(flavor = "multi_thread")]
async fn mismatched_credentials_are_rejected_before_discovery(
    gateway: TestGateway,
    #[case] auth_type: AuthType,
    #[case] auth_value: Option<serde_json::Value>,
) {
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;

    let err = gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: user("tenant-a"),
            catalog_server_id: server.id(),
            auth_type,
            auth_value,
        })
        .await
        .expect_err("pairing should be rejected");

    assert!(matches!(err, ReconciliationError::Domain(_)));
    assert!(gateway.upstream.connections().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_hub_removes_its_tools(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search", "index"]);
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    let tenant = user("tenant-a");
    let hub = gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: tenant.clone(),
            catalog_server_id: server.id(),
            auth_type: AuthType::None,
            auth_value: None,
        })
        .await
        .expect("hub should be added")
        .hub;
    assert_eq!(gateway.registry.tool_count().expect("count"), 2);

    gateway
        .app
        .hubs
        .delete(&tenant, hub.id())
        .await
        .expect("delete should succeed");

    assert_eq!(gateway.registry.tool_count().expect("count"), 0);
}
