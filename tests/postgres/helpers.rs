//! Shared helpers for `PostgreSQL` registry tests.
//!
//! Tests share one embedded cluster started by `pg-embed-setup-unpriv`. The
//! gateway schema is applied once to a template database, and every test
//! gets its own copy of it, dropped again when the test ends.

use diesel::{
    connection::SimpleConnection,
    prelude::*,
    r2d2::{ConnectionManager, Pool},
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
pub use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::fixture;
use serde_json::json;
use tokio::runtime::Runtime;
use toolgate::registry::{
    adapters::PostgresRegistry,
    domain::{
        AccessType, AuthType, CatalogServer, CatalogServerDraft, CatalogServerName, HubServer,
        HubServerDraft, ServerUrl, Tool, ToolDraft, ToolScope, UserId,
    },
};
use uuid::Uuid;

/// Boxed error type for fallible test setup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Schema applied to the template database.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-09-01-000000_create_gateway_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "toolgate_test_template";

/// Creates a runtime for driving the async registry from sync tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error when the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut connection =
                PgConnection::establish(&url).map_err(|err| eyre::eyre!("{err}"))?;
            connection
                .batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|err| eyre::eyre!("schema migration failed: {err}"))?;
            Ok(())
        })
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// A database copied from the template, dropped when this value goes out
/// of scope.
pub struct TemporaryDatabase {
    cluster: &'static TestCluster,
    name: String,
}

impl TemporaryDatabase {
    fn create(cluster: &'static TestCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let name = format!("toolgate_test_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|err| Box::new(err) as BoxError)?;
        Ok(Self { cluster, name })
    }

    /// Connection URL of the temporary database.
    pub fn url(&self) -> String {
        self.cluster.connection().database_url(&self.name)
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// A registry over its own temporary database.
///
/// Field order matters: the pool closes before the database is dropped.
pub struct PreparedRegistry {
    /// Registry under test.
    pub registry: PostgresRegistry,
    /// Backing database.
    pub database: TemporaryDatabase,
}

/// Prepares a registry on the shared embedded cluster.
#[fixture]
pub fn prepared_registry(shared_test_cluster: &'static TestCluster) -> PreparedRegistry {
    let database = TemporaryDatabase::create(shared_test_cluster).expect("test database setup");
    let manager = ConnectionManager::<PgConnection>::new(database.url());
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("connection pool setup");
    PreparedRegistry {
        registry: PostgresRegistry::new(pool),
        database,
    }
}

/// Builds a catalog server named `name` at a matching local URL.
pub fn catalog_server(name: &str, access_type: AccessType) -> CatalogServer {
    CatalogServer::new(
        CatalogServerDraft {
            name: CatalogServerName::new(name).expect("valid name"),
            url: ServerUrl::new(format!("http://{name}.local/mcp")).expect("valid url"),
            description: format!("{name} server"),
            transport: "streamable_http".to_owned(),
            access_type,
        },
        &DefaultClock,
    )
}

/// Builds a tool named `<server>-<original>` in `scope`.
pub fn tool(server: &CatalogServer, scope: ToolScope, original: &str) -> Tool {
    Tool::new(
        ToolDraft {
            scope,
            catalog_server_id: server.id(),
            original_name: original.to_owned(),
            modified_name: format!("{}-{original}", server.name()),
            description: format!("{original} tool"),
            input_schema: json!({"type": "object", "properties": {"q": {"type": "string"}}}),
            annotations: Some(json!({"readOnlyHint": true})),
        },
        &DefaultClock,
    )
    .expect("valid tool")
}

/// Builds a bearer-authenticated binding for `user_id`.
pub fn bearer_hub(user_id: &UserId, server: &CatalogServer, token: &str) -> HubServer {
    HubServer::new(
        HubServerDraft {
            user_id: user_id.clone(),
            catalog_server_id: server.id(),
            auth_type: AuthType::Bearer,
            auth_value: Some(json!(token)),
        },
        &DefaultClock,
    )
}

/// Builds a tenant identifier.
pub fn user(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}
