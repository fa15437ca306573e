//! End-to-end catalog, hub, composition and proxy flows.

use super::helpers::{NOTES_URL, TestGateway, WEATHER_URL, gateway, user};
use rstest::rstest;
use serde_json::json;
use toolgate::{
    reconciliation::{AddCatalogServerRequest, AddHubRequest},
    registry::{
        domain::{AccessType, AuthType},
        ports::{ToolRepository, VirtualServerRepository},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn public_server_tools_follow_upstream_across_refreshes(gateway: TestGateway) {
    gateway.upstream.serve_names(WEATHER_URL, &["a", "b"]);
    let server = gateway
        .add_server("weather", WEATHER_URL, AccessType::Public)
        .await;
    let tenant = user("tenant-a");
    gateway
        .app
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: tenant.clone(),
            catalog_server_id: server.id(),
            auth_type: AuthType::Bearer,
            auth_value: Some(json!("tok")),
        })
        .await
        .expect("hub should be added");

    let visible = gateway
        .registry
        .list_tools_visible_to(&tenant)
        .await
        .expect("listing should succeed");
    let mut names: Vec<_> = visible.iter().map(|t| t.modified_name().to_owned()).collect();
    names.sort();
    assert_eq!(names, ["weather-a", "weather-b"]);

    let ids: Vec<_> = visible.iter().map(|tool| tool.id()).collect();
    let bundle = gateway
        .app
        .composer
        .create_with_tools(tenant.clone(), "bundle", &ids)
        .await
        .expect("virtual server should be created");

    let exposed = gateway
        .app
        .proxy
        .list_tools(bundle.id())
        .await
        .expect("listing should succeed");
    let mut exposed_names: Vec<_> = exposed.iter().map(|tool| tool.name.as_str()).collect();
    exposed_names.sort_unstable();
    assert_eq!(exposed_names, ["a", "b"]);

    let result = gateway
        .app
        .proxy
        .call_tool(bundle.id(), "a", json!({"q": 1}))
        .await
        .expect("call should succeed");
    assert!(!result.is_error());
    let calls = gateway.upstream.calls();
    let call = calls.first().expect("one upstream call");
    assert_eq!(call.tool, "a");
    assert_eq!(
        call.headers.get("Authorization").map(String::as_str),
        Some("Bearer tok")
    );

    gateway.upstream.serve_names(WEATHER_URL, &["b", "c"]);
    let outcome = gateway
        .app
        .catalog_orchestrator
        .refresh(server.id())
        .await
        .expect("refresh should succeed");
    let added: Vec<_> = outcome.added.iter().map(|t| t.original_name()).collect();
    let deleted: Vec<_> = outcome.deleted.iter().map(|t| t.original_name()).collect();
    assert_eq!(added, ["c"]);
    assert_eq!(deleted, ["a"]);

    let attached = gateway
        .registry
        .list_attached_tools(bundle.id())
        .await
        .expect("listing should succeed");
    let attached_names: Vec<_> = attached.iter().map(|t| t.original_name()).collect();
    assert_eq!(attached_names, ["b"]);
    assert_eq!(gateway.upstream.open_sessions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refreshing_an_unchanged_server_is_a_no_op(gateway: TestGateway) {
    gateway.upstream.serve_names(WEATHER_URL, &["a", "b"]);
    let server = gateway
        .add_server("weather", WEATHER_URL, AccessType::Public)
        .await;

    let outcome = gateway
        .app
        .catalog_orchestrator
        .refresh(server.id())
        .await
        .expect("refresh should succeed");

    assert!(outcome.added.is_empty());
    assert!(outcome.deleted.is_empty());
    assert_eq!(gateway.registry.tool_count().expect("count"), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn private_server_tools_are_discovered_per_tenant(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search", "search"]);
    let server = gateway
        .add_server("notes", NOTES_URL, AccessType::Private)
        .await;
    assert!(
        gateway.upstream.connections().is_empty(),
        "private servers are not contacted at registration"
    );

    let first = user("tenant-a");
    let second = user("tenant-b");
    for (tenant, token) in [(&first, "tok-a"), (&second, "tok-b")] {
        let registered = gateway
            .app
            .hub_orchestrator
            .add(AddHubRequest {
                user_id: tenant.clone(),
                catalog_server_id: server.id(),
                auth_type: AuthType::Bearer,
                auth_value: Some(json!(token)),
            })
            .await
            .expect("hub should be added");
        let names: Vec<_> = registered.tools.iter().map(|t| t.modified_name()).collect();
        assert_eq!(names, ["notes-search", "notes-search__2"]);
    }

    let connections = gateway.upstream.connections();
    let tokens: Vec<_> = connections
        .iter()
        .filter_map(|c| c.headers.get("Authorization").map(String::as_str))
        .collect();
    assert_eq!(tokens, ["Bearer tok-a", "Bearer tok-b"]);

    let first_tools = gateway
        .registry
        .list_tools_visible_to(&first)
        .await
        .expect("listing should succeed");
    assert_eq!(first_tools.len(), 2);
    assert!(first_tools.iter().all(|t| t.user_id() == Some(&first)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hub_refresh_marks_unreachable_then_recovers(gateway: TestGateway) {
    gateway.upstream.serve_names(NOTES_URL, &["search"]);
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

    gateway.upstream.fail_listing(NOTES_URL);
    gateway
        .app
        .hub_orchestrator
        .refresh(&tenant, hub.id())
        .await
        .expect_err("refresh should fail");
    let stored = gateway
        .app
        .hubs
        .get(&tenant, hub.id())
        .await
        .expect("hub should exist");
    assert_eq!(stored.hub.status().as_str(), "UNREACHABLE");

    gateway.upstream.recover(NOTES_URL);
    gateway.upstream.serve_names(NOTES_URL, &["search", "index"]);
    let outcome = gateway
        .app
        .hub_orchestrator
        .refresh(&tenant, hub.id())
        .await
        .expect("refresh should succeed");
    let added: Vec<_> = outcome.added.iter().map(|t| t.modified_name()).collect();
    assert_eq!(added, ["notes-index"]);
    let recovered = gateway
        .app
        .hubs
        .get(&tenant, hub.id())
        .await
        .expect("hub should exist");
    assert_eq!(recovered.hub.status().as_str(), "ACTIVE");
    assert_eq!(gateway.upstream.open_sessions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn colliding_names_across_servers_get_suffixes(gateway: TestGateway) {
    let first_url = "http://a.local/mcp";
    let second_url = "http://a-b.local/mcp";
    gateway.upstream.serve_names(first_url, &["b-c"]);
    gateway.upstream.serve_names(second_url, &["c"]);
    let first = gateway
        .add_server("a", first_url, AccessType::Public)
        .await;

    let registered = gateway
        .app
        .catalog_orchestrator
        .add(AddCatalogServerRequest {
            name: "a-b".to_owned(),
            url: second_url.to_owned(),
            description: String::new(),
            transport: None,
            access_type: AccessType::Public,
        })
        .await
        .expect("a colliding base name should not block registration");

    let names: Vec<_> = registered.tools.iter().map(|t| t.modified_name()).collect();
    assert_eq!(names, ["a-b-c__2"]);
    for server_id in [first.id(), registered.server.id()] {
        let outcome = gateway
            .app
            .catalog_orchestrator
            .refresh(server_id)
            .await
            .expect("refresh should succeed");
        assert!(outcome.added.is_empty());
        assert!(outcome.deleted.is_empty());
    }
    assert_eq!(gateway.registry.tool_count().expect("count"), 2);
}
