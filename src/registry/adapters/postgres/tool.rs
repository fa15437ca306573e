//! Tool port for the `PostgreSQL` registry.

use super::{
    PostgresRegistry,
    conversion::{row_to_tool, tool_to_row},
    map_tool_write_error,
    models::ToolRow,
    schema::{hub_servers, tool_virtual_servers, tools},
};
use crate::registry::{
    domain::{CatalogServerId, Tool, ToolId, ToolScope, UserId},
    ports::{RegistryError, RegistryResult, ToolRepository},
};
use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

#[async_trait]
impl ToolRepository for PostgresRegistry {
    async fn find_tool(&self, tool_id: ToolId) -> RegistryResult<Option<Tool>> {
        self.run_blocking(move |connection| {
            let row = tools::table
                .filter(tools::id.eq(tool_id.into_inner()))
                .select(ToolRow::as_select())
                .first::<ToolRow>(connection)
                .optional()?;
            row.map(row_to_tool).transpose()
        })
        .await
    }

    async fn list_tools_in_scope(
        &self,
        catalog_server_id: CatalogServerId,
        scope: &ToolScope,
    ) -> RegistryResult<Vec<Tool>> {
        let owner = scope.user_id().map(|user| user.as_str().to_owned());
        self.run_blocking(move |connection| {
            let scoped = tools::table
                .filter(tools::catalog_server_id.eq(catalog_server_id.into_inner()))
                .order(tools::modified_name.asc())
                .select(ToolRow::as_select())
                .into_boxed();
            let filtered = match owner {
                Some(user_id) => scoped.filter(tools::user_id.eq(user_id)),
                None => scoped.filter(tools::user_id.is_null()),
            };
            let rows = filtered.load::<ToolRow>(connection)?;
            rows.into_iter().map(row_to_tool).collect()
        })
        .await
    }

    async fn list_tool_names_owned_by_others(
        &self,
        scope: &ToolScope,
        excluding: CatalogServerId,
    ) -> RegistryResult<Vec<String>> {
        let owner = scope.user_id().map(|user| user.as_str().to_owned());
        self.run_blocking(move |connection| {
            let others = tools::table
                .filter(tools::catalog_server_id.ne(excluding.into_inner()))
                .order(tools::modified_name.asc())
                .select(tools::modified_name)
                .into_boxed();
            let filtered = match owner {
                Some(user_id) => others.filter(tools::user_id.eq(user_id)),
                None => others.filter(tools::user_id.is_null()),
            };
            Ok(filtered.load::<String>(connection)?)
        })
        .await
    }

    async fn list_tools_visible_to(&self, user_id: &UserId) -> RegistryResult<Vec<Tool>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let bound_servers = hub_servers::table
                .filter(hub_servers::user_id.eq(owner.clone()))
                .select(hub_servers::catalog_server_id);
            let rows = tools::table
                .filter(
                    tools::user_id.eq(owner.clone()).or(tools::user_id
                        .is_null()
                        .and(tools::catalog_server_id.eq_any(bound_servers))),
                )
                .order(tools::modified_name.asc())
                .select(ToolRow::as_select())
                .load::<ToolRow>(connection)?;
            rows.into_iter().map(row_to_tool).collect()
        })
        .await
    }

    async fn apply_tool_changes(&self, insert: &[Tool], delete: &[ToolId]) -> RegistryResult<()> {
        let tool_rows: Vec<ToolRow> = insert.iter().map(tool_to_row).collect();
        let doomed: Vec<Uuid> = delete.iter().map(|tool_id| tool_id.into_inner()).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                if !doomed.is_empty() {
                    diesel::delete(
                        tool_virtual_servers::table
                            .filter(tool_virtual_servers::tool_id.eq_any(&doomed)),
                    )
                    .execute(tx)?;
                    diesel::delete(tools::table.filter(tools::id.eq_any(&doomed))).execute(tx)?;
                }
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

    async fn update_tool(&self, tool: &Tool) -> RegistryResult<()> {
        let row = tool_to_row(tool);
        self.run_blocking(move |connection| {
            let updated_count = diesel::update(tools::table.filter(tools::id.eq(row.id)))
                .set((
                    tools::status.eq(&row.status),
                    tools::updated_at.eq(row.updated_at),
                ))
                .execute(connection)?;
            if updated_count == 0 {
                return Err(RegistryError::ToolNotFound(ToolId::from_uuid(row.id)));
            }
            Ok(())
        })
        .await
    }
}
