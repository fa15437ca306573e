//! `PostgreSQL` adapter implementing every registry port with Diesel.
//!
//! Multi-row writes run inside `conn.transaction`, so a failure part way
//! through leaves no partial state. Blocking Diesel calls are moved onto the
//! Tokio blocking pool.

mod catalog;
mod conversion;
mod hub;
mod models;
mod schema;
mod tool;
mod virtual_server;

use crate::registry::ports::{RegistryError, RegistryResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type for registry adapters.
pub type RegistryPgPool = Pool<ConnectionManager<PgConnection>>;

/// Unique constraint on catalog server names.
const CATALOG_NAME_CONSTRAINT: &str = "uq_catalog_servers_name";

/// Unique constraint on one binding per tenant and catalog server.
const HUB_OWNER_CONSTRAINT: &str = "uq_hub_servers_user_server";

/// Unique index on modified tool names within an owner scope.
const TOOL_NAME_CONSTRAINT: &str = "uq_tools_owner_modified_name";

/// `PostgreSQL`-backed registry.
#[derive(Debug, Clone)]
pub struct PostgresRegistry {
    pool: RegistryPgPool,
}

impl PostgresRegistry {
    /// Creates a new registry from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: RegistryPgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &RegistryPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(RegistryError::persistence)?
    }
}

impl From<DieselError> for RegistryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Returns the violated unique constraint, if `err` is a unique violation.
fn unique_violation(err: &DieselError) -> Option<&str> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            constraint_of(info.as_ref())
        }
        _ => None,
    }
}

fn constraint_of(info: &dyn DatabaseErrorInformation) -> Option<&str> {
    info.constraint_name()
}

/// Maps tool-insert failures, surfacing scope name collisions.
fn map_tool_write_error(err: DieselError) -> RegistryError {
    if unique_violation(&err) == Some(TOOL_NAME_CONSTRAINT) {
        let detail = match &err {
            DieselError::DatabaseError(_, info) => info
                .details()
                .map_or_else(|| info.message().to_owned(), str::to_owned),
            _ => err.to_string(),
        };
        return RegistryError::DuplicateToolName(detail);
    }
    RegistryError::persistence(err)
}

/// Converts a zero-based index into a stored attachment position.
fn position_of(index: usize) -> RegistryResult<i32> {
    i32::try_from(index).map_err(RegistryError::persistence)
}
