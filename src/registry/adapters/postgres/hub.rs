//! Hub port for the `PostgreSQL` registry.

use super::{
    HUB_OWNER_CONSTRAINT, PostgresRegistry,
    conversion::{hub_to_row, row_to_catalog, row_to_hub, tool_to_row},
    map_tool_write_error,
    models::{CatalogServerRow, HubServerRow, ToolRow},
    schema::{catalog_servers, hub_servers, tools},
    unique_violation,
};
use crate::registry::{
    domain::{CatalogServerId, HubServer, HubServerId, HubWithServer, Tool, UserId},
    ports::{HubRepository, RegistryError, RegistryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

fn join_rows(rows: (HubServerRow, CatalogServerRow)) -> RegistryResult<HubWithServer> {
    let (hub_row, server_row) = rows;
    Ok(HubWithServer {
        hub: row_to_hub(hub_row)?,
        server: row_to_catalog(server_row)?,
    })
}

#[async_trait]
impl HubRepository for PostgresRegistry {
    async fn insert_hub(&self, hub: &HubServer, tools_to_insert: &[Tool]) -> RegistryResult<()> {
        let user_id = hub.user_id().clone();
        let catalog_server_id = hub.catalog_server_id();
        let hub_row = hub_to_row(hub);
        let tool_rows: Vec<ToolRow> = tools_to_insert.iter().map(tool_to_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                diesel::insert_into(hub_servers::table)
                    .values(&hub_row)
                    .execute(tx)
                    .map_err(|err| {
                        if unique_violation(&err) == Some(HUB_OWNER_CONSTRAINT) {
                            return RegistryError::DuplicateHub {
                                user_id: user_id.clone(),
                                catalog_server_id,
                            };
                        }
                        if matches!(
                            err,
                            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
                        ) {
                            return RegistryError::CatalogServerNotFound(catalog_server_id);
                        }
                        RegistryError::persistence(err)
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

    async fn update_hub(&self, hub: &HubServer) -> RegistryResult<()> {
        let row = hub_to_row(hub);

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(hub_servers::table.filter(hub_servers::id.eq(row.id)))
                    .set((
                        hub_servers::status.eq(&row.status),
                        hub_servers::capabilities.eq(&row.capabilities),
                        hub_servers::updated_at.eq(row.updated_at),
                    ))
                    .execute(connection)?;
            if updated_count == 0 {
                return Err(RegistryError::HubNotFound(HubServerId::from_uuid(row.id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_hub(&self, hub_id: HubServerId) -> RegistryResult<Option<HubServer>> {
        self.run_blocking(move |connection| {
            let row = hub_servers::table
                .filter(hub_servers::id.eq(hub_id.into_inner()))
                .select(HubServerRow::as_select())
                .first::<HubServerRow>(connection)
                .optional()?;
            row.map(row_to_hub).transpose()
        })
        .await
    }

    async fn find_hub_with_server(
        &self,
        hub_id: HubServerId,
    ) -> RegistryResult<Option<HubWithServer>> {
        self.run_blocking(move |connection| {
            let rows = hub_servers::table
                .inner_join(catalog_servers::table)
                .filter(hub_servers::id.eq(hub_id.into_inner()))
                .select((HubServerRow::as_select(), CatalogServerRow::as_select()))
                .first::<(HubServerRow, CatalogServerRow)>(connection)
                .optional()?;
            rows.map(join_rows).transpose()
        })
        .await
    }

    async fn find_hub_for_user(
        &self,
        user_id: &UserId,
        catalog_server_id: CatalogServerId,
    ) -> RegistryResult<Option<HubWithServer>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = hub_servers::table
                .inner_join(catalog_servers::table)
                .filter(hub_servers::user_id.eq(&owner))
                .filter(hub_servers::catalog_server_id.eq(catalog_server_id.into_inner()))
                .select((HubServerRow::as_select(), CatalogServerRow::as_select()))
                .first::<(HubServerRow, CatalogServerRow)>(connection)
                .optional()?;
            rows.map(join_rows).transpose()
        })
        .await
    }

    async fn list_hubs_for_user(&self, user_id: &UserId) -> RegistryResult<Vec<HubWithServer>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = hub_servers::table
                .inner_join(catalog_servers::table)
                .filter(hub_servers::user_id.eq(&owner))
                .order(catalog_servers::name.asc())
                .select((HubServerRow::as_select(), CatalogServerRow::as_select()))
                .load::<(HubServerRow, CatalogServerRow)>(connection)?;
            rows.into_iter().map(join_rows).collect()
        })
        .await
    }

    async fn delete_hub(&self, hub_id: HubServerId) -> RegistryResult<()> {
        let hub_uuid = hub_id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                diesel::delete(tools::table.filter(tools::hub_server_id.eq(hub_uuid)))
                    .execute(tx)?;
                let deleted = diesel::delete(hub_servers::table.filter(hub_servers::id.eq(hub_uuid)))
                    .execute(tx)?;
                if deleted == 0 {
                    return Err(RegistryError::HubNotFound(hub_id));
                }
                Ok(())
            })
        })
        .await
    }
}
