//! Catalog port for the `PostgreSQL` registry.

use super::{
    CATALOG_NAME_CONSTRAINT, PostgresRegistry,
    conversion::{catalog_to_row, row_to_catalog, tool_to_row},
    map_tool_write_error,
    models::{CatalogServerRow, ToolRow},
    schema::{catalog_servers, tools},
    unique_violation,
};
use crate::registry::{
    domain::{CatalogServer, CatalogServerId, CatalogServerName, Tool},
    ports::{CatalogRepository, RegistryError, RegistryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

#[async_trait]
impl CatalogRepository for PostgresRegistry {
    async fn insert_catalog_server(
        &self,
        server: &CatalogServer,
        tools_to_insert: &[Tool],
    ) -> RegistryResult<()> {
        let server_name = server.name().clone();
        let server_row = catalog_to_row(server);
        let tool_rows: Vec<ToolRow> = tools_to_insert.iter().map(tool_to_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                diesel::insert_into(catalog_servers::table)
                    .values(&server_row)
                    .execute(tx)
                    .map_err(|err| {
                        if unique_violation(&err) == Some(CATALOG_NAME_CONSTRAINT) {
                            RegistryError::DuplicateCatalogServerName(server_name.clone())
                        } else {
                            RegistryError::persistence(err)
                        }
                    })?;
                if !tool_rows.is_empty() {
                    diesel::insert_into(tools::table)
                        .values(&tool_rows)
                        .execute(tx)
                        .map_err(map_tool_write_error)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update_catalog_server(&self, server: &CatalogServer) -> RegistryResult<()> {
        let row = catalog_to_row(server);

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(catalog_servers::table.filter(catalog_servers::id.eq(row.id)))
                    .set((
                        catalog_servers::url.eq(&row.url),
                        catalog_servers::description.eq(&row.description),
                        catalog_servers::capabilities.eq(&row.capabilities),
                        catalog_servers::updated_at.eq(row.updated_at),
                    ))
                    .execute(connection)?;
            if updated_count == 0 {
                return Err(RegistryError::CatalogServerNotFound(
                    CatalogServerId::from_uuid(row.id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn find_catalog_server(
        &self,
        server_id: CatalogServerId,
    ) -> RegistryResult<Option<CatalogServer>> {
        self.run_blocking(move |connection| {
            let row = catalog_servers::table
                .filter(catalog_servers::id.eq(server_id.into_inner()))
                .select(CatalogServerRow::as_select())
                .first::<CatalogServerRow>(connection)
                .optional()?;
            row.map(row_to_catalog).transpose()
        })
        .await
    }

    async fn find_catalog_server_by_name(
        &self,
        name: &CatalogServerName,
    ) -> RegistryResult<Option<CatalogServer>> {
        let server_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = catalog_servers::table
                .filter(catalog_servers::name.eq(&server_name))
                .select(CatalogServerRow::as_select())
                .first::<CatalogServerRow>(connection)
                .optional()?;
            row.map(row_to_catalog).transpose()
        })
        .await
    }

    async fn list_catalog_servers(&self) -> RegistryResult<Vec<CatalogServer>> {
        self.run_blocking(move |connection| {
            let rows = catalog_servers::table
                .order(catalog_servers::name.asc())
                .select(CatalogServerRow::as_select())
                .load::<CatalogServerRow>(connection)?;
            rows.into_iter().map(row_to_catalog).collect()
        })
        .await
    }
}
