//! Conversions between Diesel rows and registry domain aggregates.

use super::models::{CatalogServerRow, HubServerRow, ToolRow, VirtualServerRow};
use crate::registry::{
    domain::{
        AccessType, AuthType, CatalogServer, CatalogServerId, CatalogServerName, HubServer,
        HubServerId, HubStatus, PersistedCatalogServerData, PersistedHubServerData,
        PersistedToolData, PersistedVirtualServerData, RecordStatus, ServerUrl, Tool, ToolId,
        ToolScope, UserId, VirtualServer, VirtualServerId, VirtualServerName,
    },
    ports::{RegistryError, RegistryResult},
};
use thiserror::Error;

/// A tool row whose owner and hub columns disagree about its scope.
#[derive(Debug, Error)]
#[error("tool {0} has a user id without a hub id, or the reverse")]
struct InconsistentToolScope(uuid::Uuid);

pub(super) fn catalog_to_row(server: &CatalogServer) -> CatalogServerRow {
    CatalogServerRow {
        id: server.id().into_inner(),
        name: server.name().as_str().to_owned(),
        url: server.url().as_str().to_owned(),
        description: server.description().to_owned(),
        capabilities: server.capabilities().cloned(),
        transport: server.transport().to_owned(),
        access_type: server.access_type().as_str().to_owned(),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    }
}

pub(super) fn row_to_catalog(row: CatalogServerRow) -> RegistryResult<CatalogServer> {
    let data = PersistedCatalogServerData {
        id: CatalogServerId::from_uuid(row.id),
        name: CatalogServerName::new(&row.name).map_err(RegistryError::invalid_persisted_data)?,
        url: ServerUrl::new(&row.url).map_err(RegistryError::invalid_persisted_data)?,
        description: row.description,
        capabilities: row.capabilities,
        transport: row.transport,
        access_type: AccessType::try_from(row.access_type.as_str())
            .map_err(RegistryError::invalid_persisted_data)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(CatalogServer::from_persisted(data))
}

pub(super) fn hub_to_row(hub: &HubServer) -> HubServerRow {
    HubServerRow {
        id: hub.id().into_inner(),
        user_id: hub.user_id().as_str().to_owned(),
        catalog_server_id: hub.catalog_server_id().into_inner(),
        status: hub.status().as_str().to_owned(),
        auth_type: hub.auth_type().as_str().to_owned(),
        auth_value: hub.auth_value().cloned(),
        capabilities: hub.capabilities().cloned(),
        created_at: hub.created_at(),
        updated_at: hub.updated_at(),
    }
}

pub(super) fn row_to_hub(row: HubServerRow) -> RegistryResult<HubServer> {
    let data = PersistedHubServerData {
        id: HubServerId::from_uuid(row.id),
        user_id: UserId::new(&row.user_id).map_err(RegistryError::invalid_persisted_data)?,
        catalog_server_id: CatalogServerId::from_uuid(row.catalog_server_id),
        status: HubStatus::try_from(row.status.as_str())
            .map_err(RegistryError::invalid_persisted_data)?,
        auth_type: AuthType::try_from(row.auth_type.as_str())
            .map_err(RegistryError::invalid_persisted_data)?,
        auth_value: row.auth_value,
        capabilities: row.capabilities,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(HubServer::from_persisted(data))
}

pub(super) fn tool_to_row(tool: &Tool) -> ToolRow {
    ToolRow {
        id: tool.id().into_inner(),
        user_id: tool.user_id().map(|user| user.as_str().to_owned()),
        catalog_server_id: tool.catalog_server_id().into_inner(),
        hub_server_id: tool.hub_server_id().map(HubServerId::into_inner),
        original_name: tool.original_name().to_owned(),
        modified_name: tool.modified_name().to_owned(),
        description: tool.description().to_owned(),
        input_schema: tool.input_schema().clone(),
        annotations: tool.annotations().clone(),
        status: tool.status().as_str().to_owned(),
        created_at: tool.created_at(),
        updated_at: tool.updated_at(),
    }
}

pub(super) fn row_to_tool(row: ToolRow) -> RegistryResult<Tool> {
    let scope = match (row.user_id, row.hub_server_id) {
        (None, None) => ToolScope::Global,
        (Some(user_id), Some(hub_server_id)) => ToolScope::Tenant {
            user_id: UserId::new(&user_id).map_err(RegistryError::invalid_persisted_data)?,
            hub_server_id: HubServerId::from_uuid(hub_server_id),
        },
        _ => {
            return Err(RegistryError::invalid_persisted_data(
                InconsistentToolScope(row.id),
            ));
        }
    };
    let data = PersistedToolData {
        id: ToolId::from_uuid(row.id),
        scope,
        catalog_server_id: CatalogServerId::from_uuid(row.catalog_server_id),
        original_name: row.original_name,
        modified_name: row.modified_name,
        description: row.description,
        input_schema: row.input_schema,
        annotations: row.annotations,
        status: RecordStatus::try_from(row.status.as_str())
            .map_err(RegistryError::invalid_persisted_data)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Tool::from_persisted(data))
}

pub(super) fn virtual_server_to_row(server: &VirtualServer) -> VirtualServerRow {
    VirtualServerRow {
        id: server.id().into_inner(),
        user_id: server.user_id().as_str().to_owned(),
        name: server.name().as_str().to_owned(),
        status: server.status().as_str().to_owned(),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    }
}

pub(super) fn row_to_virtual_server(row: VirtualServerRow) -> RegistryResult<VirtualServer> {
    let data = PersistedVirtualServerData {
        id: VirtualServerId::from_uuid(row.id),
        user_id: UserId::new(&row.user_id).map_err(RegistryError::invalid_persisted_data)?,
        name: VirtualServerName::new(&row.name).map_err(RegistryError::invalid_persisted_data)?,
        status: RecordStatus::try_from(row.status.as_str())
            .map_err(RegistryError::invalid_persisted_data)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(VirtualServer::from_persisted(data))
}
