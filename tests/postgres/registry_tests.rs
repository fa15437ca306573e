//! Registry adapter behaviour against a real `PostgreSQL` server.

use super::helpers::{
    PreparedRegistry, bearer_hub, catalog_server, prepared_registry, test_runtime, tool, user,
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;
use toolgate::registry::{
    domain::{AccessType, RecordStatus, Tool, ToolScope, VirtualServer, VirtualServerName},
    ports::{
        CatalogRepository, HubRepository, RegistryError, ToolRepository, VirtualServerRepository,
    },
};

fn bundle_for(raw_user: &str) -> VirtualServer {
    VirtualServer::new(
        user(raw_user),
        VirtualServerName::new("bundle").expect("valid name"),
        &DefaultClock,
    )
}

#[rstest]
fn catalog_server_and_global_tools_round_trip(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let server = catalog_server("weather", AccessType::Public);
        let forecast = tool(&server, ToolScope::Global, "forecast");

        registry
            .insert_catalog_server(&server, std::slice::from_ref(&forecast))
            .await
            .expect("insert should succeed");

        let by_name = registry
            .find_catalog_server_by_name(server.name())
            .await
            .expect("lookup should succeed")
            .expect("server should exist");
        assert_eq!(by_name.id(), server.id());
        assert_eq!(by_name.url().as_str(), "http://weather.local/mcp");
        assert_eq!(by_name.access_type(), AccessType::Public);

        let stored = registry
            .list_tools_in_scope(server.id(), &ToolScope::Global)
            .await
            .expect("listing should succeed");
        let first = stored.first().expect("one tool");
        assert_eq!(first.id(), forecast.id());
        assert_eq!(first.modified_name(), "weather-forecast");
        assert_eq!(first.input_schema(), forecast.input_schema());
        assert_eq!(first.annotations(), &json!({"readOnlyHint": true}));
        assert_eq!(first.status(), RecordStatus::Active);
    });
}

#[rstest]
fn duplicate_catalog_names_are_reported(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        registry
            .insert_catalog_server(&catalog_server("notes", AccessType::Private), &[])
            .await
            .expect("first insert should succeed");

        let result = registry
            .insert_catalog_server(&catalog_server("notes", AccessType::Private), &[])
            .await;

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateCatalogServerName(_))
        ));
    });
}

#[rstest]
fn one_binding_per_tenant_and_server(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let server = catalog_server("weather", AccessType::Public);
        registry
            .insert_catalog_server(&server, &[])
            .await
            .expect("insert should succeed");
        let tenant = user("tenant-a");
        registry
            .insert_hub(&bearer_hub(&tenant, &server, "one"), &[])
            .await
            .expect("first binding should succeed");

        let result = registry
            .insert_hub(&bearer_hub(&tenant, &server, "two"), &[])
            .await;

        assert!(matches!(result, Err(RegistryError::DuplicateHub { .. })));
        let bindings = registry
            .list_hubs_for_user(&tenant)
            .await
            .expect("listing should succeed");
        assert_eq!(bindings.len(), 1);
        let binding = bindings.first().expect("one binding");
        assert_eq!(binding.server.id(), server.id());
        assert_eq!(binding.hub.auth_value(), Some(&json!("one")));
    });
}

#[rstest]
fn colliding_tenant_tool_names_roll_back_the_binding(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let server = catalog_server("notes", AccessType::Private);
        registry
            .insert_catalog_server(&server, &[])
            .await
            .expect("insert should succeed");
        let tenant = user("tenant-a");
        let hub = bearer_hub(&tenant, &server, "tok");
        let scope = ToolScope::Tenant {
            user_id: tenant.clone(),
            hub_server_id: hub.id(),
        };
        let tools = [
            tool(&server, scope.clone(), "search"),
            tool(&server, scope, "search"),
        ];

        let result = registry.insert_hub(&hub, &tools).await;

        assert!(matches!(result, Err(RegistryError::DuplicateToolName(_))));
        assert!(
            registry
                .find_hub(hub.id())
                .await
                .expect("lookup should succeed")
                .is_none()
        );
    });
}

#[rstest]
fn visibility_follows_bindings(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let weather = catalog_server("weather", AccessType::Public);
        let maps = catalog_server("maps", AccessType::Public);
        registry
            .insert_catalog_server(&weather, &[tool(&weather, ToolScope::Global, "forecast")])
            .await
            .expect("insert should succeed");
        registry
            .insert_catalog_server(&maps, &[tool(&maps, ToolScope::Global, "route")])
            .await
            .expect("insert should succeed");
        let notes = catalog_server("notes", AccessType::Private);
        registry
            .insert_catalog_server(&notes, &[])
            .await
            .expect("insert should succeed");
        let alice = user("alice");
        let bob = user("bob");
        registry
            .insert_hub(&bearer_hub(&alice, &weather, "tok"), &[])
            .await
            .expect("binding should succeed");
        let bob_hub = bearer_hub(&bob, &notes, "tok");
        let bob_scope = ToolScope::Tenant {
            user_id: bob.clone(),
            hub_server_id: bob_hub.id(),
        };
        registry
            .insert_hub(&bob_hub, &[tool(&notes, bob_scope, "search")])
            .await
            .expect("binding should succeed");

        let alice_sees = registry
            .list_tools_visible_to(&alice)
            .await
            .expect("listing should succeed");
        let bob_sees = registry
            .list_tools_visible_to(&bob)
            .await
            .expect("listing should succeed");

        let names = |tools: &[Tool]| -> Vec<String> {
            tools.iter().map(|t| t.modified_name().to_owned()).collect()
        };
        assert_eq!(names(&alice_sees), ["weather-forecast"]);
        assert_eq!(names(&bob_sees), ["notes-search"]);
    });
}

#[rstest]
fn attachments_keep_order_and_follow_tool_deletion(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let server = catalog_server("weather", AccessType::Public);
        let tools: Vec<Tool> = ["alerts", "forecast", "radar"]
            .into_iter()
            .map(|name| tool(&server, ToolScope::Global, name))
            .collect();
        registry
            .insert_catalog_server(&server, &tools)
            .await
            .expect("insert should succeed");
        let bundle = bundle_for("alice");
        let reversed: Vec<_> = tools.iter().rev().map(Tool::id).collect();
        registry
            .insert_virtual_server(&bundle, &reversed)
            .await
            .expect("virtual server insert should succeed");

        let radar = tools.get(2).expect("three tools").id();
        registry
            .apply_tool_changes(&[], &[radar])
            .await
            .expect("delete should succeed");

        let attached = registry
            .list_attached_tools(bundle.id())
            .await
            .expect("listing should succeed");
        let names: Vec<&str> = attached.iter().map(Tool::original_name).collect();
        assert_eq!(names, ["forecast", "alerts"]);
    });
}

#[rstest]
fn deleting_a_hub_cascades_to_its_tools(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let server = catalog_server("notes", AccessType::Private);
        registry
            .insert_catalog_server(&server, &[])
            .await
            .expect("insert should succeed");
        let tenant = user("alice");
        let hub = bearer_hub(&tenant, &server, "tok");
        let search = tool(
            &server,
            ToolScope::Tenant {
                user_id: tenant.clone(),
                hub_server_id: hub.id(),
            },
            "search",
        );
        registry
            .insert_hub(&hub, std::slice::from_ref(&search))
            .await
            .expect("binding should succeed");
        let bundle = bundle_for("alice");
        registry
            .insert_virtual_server(&bundle, &[search.id()])
            .await
            .expect("virtual server insert should succeed");

        registry
            .delete_hub(hub.id())
            .await
            .expect("delete should succeed");

        assert!(
            registry
                .find_tool(search.id())
                .await
                .expect("lookup should succeed")
                .is_none()
        );
        assert!(
            registry
                .list_attached_tools(bundle.id())
                .await
                .expect("listing should succeed")
                .is_empty()
        );
        assert!(
            registry
                .find_virtual_server(bundle.id())
                .await
                .expect("lookup should succeed")
                .is_some()
        );
    });
}

#[rstest]
fn owner_names_leave_out_the_asking_server(prepared_registry: PreparedRegistry) {
    let registry = &prepared_registry.registry;
    test_runtime().block_on(async {
        let weather = catalog_server("weather", AccessType::Public);
        let maps = catalog_server("maps", AccessType::Public);
        registry
            .insert_catalog_server(&weather, &[tool(&weather, ToolScope::Global, "forecast")])
            .await
            .expect("insert should succeed");
        registry
            .insert_catalog_server(&maps, &[tool(&maps, ToolScope::Global, "route")])
            .await
            .expect("insert should succeed");
        let notes = catalog_server("notes", AccessType::Private);
        registry
            .insert_catalog_server(&notes, &[])
            .await
            .expect("insert should succeed");
        let alice = user("alice");
        let hub = bearer_hub(&alice, &notes, "tok");
        let tenant_scope = ToolScope::Tenant {
            user_id: alice.clone(),
            hub_server_id: hub.id(),
        };
        registry
            .insert_hub(&hub, &[tool(&notes, tenant_scope.clone(), "search")])
            .await
            .expect("binding should succeed");

        let global = registry
            .list_tool_names_owned_by_others(&ToolScope::Global, weather.id())
            .await
            .expect("listing should succeed");
        let tenant = registry
            .list_tool_names_owned_by_others(&tenant_scope, maps.id())
            .await
            .expect("listing should succeed");

        assert_eq!(global, ["maps-route"]);
        assert_eq!(tenant, ["notes-search"]);
    });
}
