//! Virtual server port for the `PostgreSQL` registry.

use super::{
    PostgresRegistry,
    conversion::{row_to_tool, row_to_virtual_server, virtual_server_to_row},
    models::{NewAttachmentRow, ToolRow, VirtualServerRow},
    position_of,
    schema::{tool_virtual_servers, tools, virtual_servers},
};
use crate::registry::{
    domain::{
        RecordStatus, Tool, ToolId, UserId, VirtualServer, VirtualServerId, dedupe_tool_ids,
    },
    ports::{RegistryError, RegistryResult, VirtualServerRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Verifies every tool exists and, when requested, is active.
fn check_attachable(
    tx: &mut PgConnection,
    tool_ids: &[ToolId],
    require_active: bool,
) -> RegistryResult<()> {
    let wanted: Vec<Uuid> = tool_ids.iter().map(|tool_id| tool_id.into_inner()).collect();
    let found: HashMap<Uuid, String> = tools::table
        .filter(tools::id.eq_any(&wanted))
        .select((tools::id, tools::status))
        .load::<(Uuid, String)>(tx)?
        .into_iter()
        .collect();

    for tool_id in tool_ids {
        let status = found
            .get(tool_id.as_ref())
            .ok_or(RegistryError::ToolNotFound(*tool_id))?;
        let active = RecordStatus::try_from(status.as_str())
            .map_err(RegistryError::invalid_persisted_data)?
            .is_active();
        if require_active && !active {
            return Err(RegistryError::ToolNotActive(*tool_id));
        }
    }
    Ok(())
}

fn attachment_rows(
    server_id: VirtualServerId,
    tool_ids: &[ToolId],
) -> RegistryResult<Vec<NewAttachmentRow>> {
    tool_ids
        .iter()
        .enumerate()
        .map(|(index, tool_id)| {
            Ok(NewAttachmentRow {
                virtual_server_id: server_id.into_inner(),
                tool_id: tool_id.into_inner(),
                position: position_of(index)?,
            })
        })
        .collect()
}

#[async_trait]
impl VirtualServerRepository for PostgresRegistry {
    async fn insert_virtual_server(
        &self,
        server: &VirtualServer,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()> {
        let row = virtual_server_to_row(server);
        let attached = dedupe_tool_ids(tool_ids);
        let attachments = attachment_rows(server.id(), &attached)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                check_attachable(tx, &attached, true)?;
                diesel::insert_into(virtual_servers::table)
                    .values(&row)
                    .execute(tx)?;
                if !attachments.is_empty() {
                    diesel::insert_into(tool_virtual_servers::table)
                        .values(&attachments)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update_virtual_server(&self, server: &VirtualServer) -> RegistryResult<()> {
        let row = virtual_server_to_row(server);
        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(virtual_servers::table.filter(virtual_servers::id.eq(row.id)))
                    .set((
                        virtual_servers::status.eq(&row.status),
                        virtual_servers::updated_at.eq(row.updated_at),
                    ))
                    .execute(connection)?;
            if updated_count == 0 {
                return Err(RegistryError::VirtualServerNotFound(
                    VirtualServerId::from_uuid(row.id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn find_virtual_server(
        &self,
        server_id: VirtualServerId,
    ) -> RegistryResult<Option<VirtualServer>> {
        self.run_blocking(move |connection| {
            let row = virtual_servers::table
                .filter(virtual_servers::id.eq(server_id.into_inner()))
                .select(VirtualServerRow::as_select())
                .first::<VirtualServerRow>(connection)
                .optional()?;
            row.map(row_to_virtual_server).transpose()
        })
        .await
    }

    async fn list_virtual_servers_for_user(
        &self,
        user_id: &UserId,
    ) -> RegistryResult<Vec<VirtualServer>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = virtual_servers::table
                .filter(virtual_servers::user_id.eq(&owner))
                .order(virtual_servers::created_at.asc())
                .select(VirtualServerRow::as_select())
                .load::<VirtualServerRow>(connection)?;
            rows.into_iter().map(row_to_virtual_server).collect()
        })
        .await
    }

    async fn list_attached_tools(&self, server_id: VirtualServerId) -> RegistryResult<Vec<Tool>> {
        self.run_blocking(move |connection| {
            let rows = tool_virtual_servers::table
                .inner_join(tools::table)
                .filter(tool_virtual_servers::virtual_server_id.eq(server_id.into_inner()))
                .order(tool_virtual_servers::position.asc())
                .select(ToolRow::as_select())
                .load::<ToolRow>(connection)?;
            rows.into_iter().map(row_to_tool).collect()
        })
        .await
    }

    async fn replace_attached_tools(
        &self,
        server_id: VirtualServerId,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()> {
        let attached = dedupe_tool_ids(tool_ids);
        let attachments = attachment_rows(server_id, &attached)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                let exists: i64 = virtual_servers::table
                    .filter(virtual_servers::id.eq(server_id.into_inner()))
                    .count()
                    .get_result(tx)?;
                if exists == 0 {
                    return Err(RegistryError::VirtualServerNotFound(server_id));
                }
                check_attachable(tx, &attached, false)?;
                diesel::delete(
                    tool_virtual_servers::table
                        .filter(tool_virtual_servers::virtual_server_id.eq(server_id.into_inner())),
                )
                .execute(tx)?;
                if !attachments.is_empty() {
                    diesel::insert_into(tool_virtual_servers::table)
                        .values(&attachments)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn detach_tool(
        &self,
        server_id: VirtualServerId,
        tool_id: ToolId,
    ) -> RegistryResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(
                tool_virtual_servers::table
                    .filter(tool_virtual_servers::virtual_server_id.eq(server_id.into_inner()))
                    .filter(tool_virtual_servers::tool_id.eq(tool_id.into_inner())),
            )
            .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn delete_virtual_server(&self, server_id: VirtualServerId) -> RegistryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, RegistryError, _>(|tx| {
                diesel::delete(
                    tool_virtual_servers::table
                        .filter(tool_virtual_servers::virtual_server_id.eq(server_id.into_inner())),
                )
                .execute(tx)?;
                let deleted = diesel::delete(
                    virtual_servers::table.filter(virtual_servers::id.eq(server_id.into_inner())),
                )
                .execute(tx)?;
                if deleted == 0 {
                    return Err(RegistryError::VirtualServerNotFound(server_id));
                }
                Ok(())
            })
        })
        .await
    }
}
