//! Virtual server composition limits and attachment rules.

use super::helpers::{TestGateway, WEATHER_URL, bind_bearer, gateway, user};
use rstest::rstest;
use toolgate::{
    composer::ComposerError,
    reconciliation::AddCatalogServerRequest,
    registry::{
        domain::{AccessType, Tool, ToolId},
        ports::{RegistryError, VirtualServerRepository},
    },
};

/// Publishes `count` weather tools and binds `tenant-a` to them.
async fn publish_weather_tools(gateway: &TestGateway, count: usize) -> Vec<Tool> {
    let names: Vec<String> = (0..count).map(|index| format!("tool-{index:03}")).collect();
    let borrowed: Vec<&str> = names.iter().map(String::as_str).collect();
    gateway.upstream.serve_names(WEATHER_URL, &borrowed);
    let registered = gateway
        .app
        .catalog_orchestrator
        .add(AddCatalogServerRequest {
            name: "weather".to_owned(),
            url: WEATHER_URL.to_owned(),
            description: "weather server".to_owned(),
            transport: None,
            access_type: AccessType::Public,
        })
        .await
        .expect("catalog server should register");
    bind_bearer(gateway, &user("tenant-a"), WEATHER_URL, "tok").await;
    registered.tools
}

fn ids_of(tools: &[Tool]) -> Vec<ToolId> {
    tools.iter().map(Tool::id).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replacing_with_too_many_tools_keeps_the_first_fifty(gateway: TestGateway) {
    let tools = publish_weather_tools(&gateway, 75).await;
    let owner = user("tenant-a");
    let bundle = gateway
        .app
        .composer
        .create(owner, "bundle")
        .await
        .expect("virtual server should be created");
    let requested = ids_of(&tools);

    let attached = gateway
        .app
        .composer
        .replace_tools(bundle.id(), &requested)
        .await
        .expect("replace should succeed");

    assert_eq!(attached.len(), 50);
    assert_eq!(attached.as_slice(), requested.get(..50).expect("75 ids"));
    let stored = gateway
        .registry
        .list_attached_tools(bundle.id())
        .await
        .expect("listing should succeed");
    assert_eq!(ids_of(&stored), attached);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creating_above_the_cap_stores_nothing(gateway: TestGateway) {
    let tools = publish_weather_tools(&gateway, 51).await;
    let owner = user("tenant-a");

    let err = gateway
        .app
        .composer
        .create_with_tools(owner.clone(), "bundle", &ids_of(&tools))
        .await
        .expect_err("51 tools exceed the cap");

    assert!(matches!(
        err,
        ComposerError::TooManyTools {
            requested: 51,
            max: 50
        }
    ));
    assert!(
        gateway
            .registry
            .list_virtual_servers_for_user(&owner)
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_ids_count_once_against_the_cap(gateway: TestGateway) {
    let tools = publish_weather_tools(&gateway, 50).await;
    let mut requested = ids_of(&tools);
    requested.extend(ids_of(&tools));

    let bundle = gateway
        .app
        .composer
        .create_with_tools(user("tenant-a"), "bundle", &requested)
        .await
        .expect("fifty distinct tools fit");

    let stored = gateway
        .app
        .composer
        .list_tools(bundle.id())
        .await
        .expect("listing should succeed");
    assert_eq!(stored.len(), 50);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_tools_cannot_be_bundled(gateway: TestGateway) {
    let tools = publish_weather_tools(&gateway, 2).await;
    let retired = tools.first().expect("two tools").id();
    gateway
        .app
        .tools
        .deactivate(retired)
        .await
        .expect("deactivate should succeed");

    let err = gateway
        .app
        .composer
        .create_with_tools(user("tenant-a"), "bundle", &ids_of(&tools))
        .await
        .expect_err("inactive tool should be rejected");

    assert!(matches!(
        err,
        ComposerError::Repository(RegistryError::ToolNotActive(id)) if id == retired
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_bundle_keeps_its_tools(gateway: TestGateway) {
    let tools = publish_weather_tools(&gateway, 3).await;
    let bundle = gateway
        .app
        .composer
        .create_with_tools(user("tenant-a"), "bundle", &ids_of(&tools))
        .await
        .expect("virtual server should be created");

    gateway
        .app
        .composer
        .delete(bundle.id())
        .await
        .expect("delete should succeed");

    assert_eq!(gateway.registry.tool_count().expect("count"), 3);
    assert!(matches!(
        gateway.app.composer.get(bundle.id()).await,
        Err(ComposerError::NotFound(_))
    ));
}
