//! Virtual Server Composer.
//!
//! Maintains tenant-owned bundles of tool references. The composer trusts
//! its caller for ownership of the virtual server: the route layer checks
//! that the principal owns it before invoking any mutating operation. Tool
//! ids are checked here against what the virtual server's owner may see.

use crate::registry::{
    domain::{
        DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER, RecordStatus, RegistryDomainError, Tool, ToolId,
        UserId, VirtualServer, VirtualServerId, VirtualServerName, dedupe_tool_ids,
    },
    ports::{RegistryError, ToolRepository, VirtualServerRepository},
};
use mockable::Clock;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for virtual server composition.
#[derive(Debug, Error)]
pub enum ComposerError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RegistryError),
    /// No virtual server exists with the given identifier.
    #[error("virtual server {0} not found")]
    NotFound(VirtualServerId),
    /// The tool exists but belongs to another tenant or to a catalog server
    /// the owner is not bound to.
    #[error("tool {0} is not available to this user")]
    ToolNotVisible(ToolId),
    /// More tools were requested than a virtual server may hold.
    #[error("{requested} tools requested, at most {max} are allowed")]
    TooManyTools {
        /// Distinct tools requested.
        requested: usize,
        /// Configured cap.
        max: usize,
    },
}

/// Result type for composer operations.
pub type ComposerResult<T> = Result<T, ComposerError>;

/// Virtual server composition service.
pub struct VirtualServerComposer<R, C>
where
    R: VirtualServerRepository + ToolRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    max_tools: usize,
}

impl<R, C> Clone for VirtualServerComposer<R, C>
where
    R: VirtualServerRepository + ToolRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            max_tools: self.max_tools,
        }
    }
}

impl<R, C> VirtualServerComposer<R, C>
where
    R: VirtualServerRepository + ToolRepository,
    C: Clock + Send + Sync,
{
    /// Creates a composer with the default tool cap.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_max_tools(repository, clock, DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER)
    }

    /// Creates a composer with an explicit tool cap.
    #[must_use]
    pub const fn with_max_tools(repository: Arc<R>, clock: Arc<C>, max_tools: usize) -> Self {
        Self {
            repository,
            clock,
            max_tools,
        }
    }

    /// Returns the configured tool cap.
    #[must_use]
    pub const fn max_tools(&self) -> usize {
        self.max_tools
    }

    /// Creates an empty virtual server.
    ///
    /// # Errors
    ///
    /// Returns domain errors for an invalid name and repository errors.
    pub async fn create(&self, owner: UserId, name: &str) -> ComposerResult<VirtualServer> {
        self.create_with_tools(owner, name, &[]).await
    }

    /// Creates a virtual server and attaches `tool_ids` in one transaction.
    ///
    /// Duplicate ids are attached once.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::TooManyTools`] above the cap,
    /// [`ComposerError::ToolNotVisible`] for another tenant's tool, and
    /// [`RegistryError::ToolNotFound`] or [`RegistryError::ToolNotActive`]
    /// through [`ComposerError::Repository`] when any tool cannot be attached.
    /// Nothing is stored on any error.
    pub async fn create_with_tools(
        &self,
        owner: UserId,
        name: &str,
        tool_ids: &[ToolId],
    ) -> ComposerResult<VirtualServer> {
        let server_name = VirtualServerName::new(name)?;
        let unique = dedupe_tool_ids(tool_ids);
        if unique.len() > self.max_tools {
            return Err(ComposerError::TooManyTools {
                requested: unique.len(),
                max: self.max_tools,
            });
        }
        self.ensure_visible(&owner, &unique).await?;
        let server = VirtualServer::new(owner, server_name, &*self.clock);
        self.repository
            .insert_virtual_server(&server, &unique)
            .await?;
        info!(
            virtual_server_id = %server.id(),
            tool_count = unique.len(),
            "virtual server created"
        );
        Ok(server)
    }

    /// Returns one virtual server.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers.
    pub async fn get(&self, server_id: VirtualServerId) -> ComposerResult<VirtualServer> {
        self.repository
            .find_virtual_server(server_id)
            .await?
            .ok_or(ComposerError::NotFound(server_id))
    }

    /// Returns the owner's virtual servers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_for_user(&self, owner: &UserId) -> ComposerResult<Vec<VirtualServer>> {
        Ok(self.repository.list_virtual_servers_for_user(owner).await?)
    }

    /// Returns the attached tools in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers.
    pub async fn list_tools(&self, server_id: VirtualServerId) -> ComposerResult<Vec<Tool>> {
        self.get(server_id).await?;
        Ok(self.repository.list_attached_tools(server_id).await?)
    }

    /// Replaces every attachment with `tool_ids`.
    ///
    /// Duplicates are dropped keeping the first occurrence, then the list is
    /// truncated to the cap in input order. Returns the ids actually attached.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers,
    /// [`ComposerError::ToolNotVisible`] for a tool the server's owner may
    /// not see, and [`RegistryError::ToolNotFound`] through
    /// [`ComposerError::Repository`] when an id does not resolve; attachments
    /// are unchanged on any error.
    pub async fn replace_tools(
        &self,
        server_id: VirtualServerId,
        tool_ids: &[ToolId],
    ) -> ComposerResult<Vec<ToolId>> {
        let server = self.get(server_id).await?;
        let mut attached = dedupe_tool_ids(tool_ids);
        if attached.len() > self.max_tools {
            debug!(
                requested = attached.len(),
                max = self.max_tools,
                "truncating tool list to cap"
            );
            attached.truncate(self.max_tools);
        }
        self.ensure_visible(server.user_id(), &attached).await?;
        self.repository
            .replace_attached_tools(server_id, &attached)
            .await?;
        Ok(attached)
    }

    async fn ensure_visible(&self, owner: &UserId, tool_ids: &[ToolId]) -> ComposerResult<()> {
        if tool_ids.is_empty() {
            return Ok(());
        }
        let visible: HashSet<ToolId> = self
            .repository
            .list_tools_visible_to(owner)
            .await?
            .iter()
            .map(Tool::id)
            .collect();
        for &tool_id in tool_ids {
            if visible.contains(&tool_id) {
                continue;
            }
            return match self.repository.find_tool(tool_id).await? {
                Some(_) => Err(ComposerError::ToolNotVisible(tool_id)),
                None => Err(RegistryError::ToolNotFound(tool_id).into()),
            };
        }
        Ok(())
    }

    /// Detaches one tool. Detaching a tool that is not attached succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers.
    pub async fn remove_tool(
        &self,
        server_id: VirtualServerId,
        tool_id: ToolId,
    ) -> ComposerResult<()> {
        self.get(server_id).await?;
        Ok(self.repository.detach_tool(server_id, tool_id).await?)
    }

    /// Changes a virtual server's status.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers.
    pub async fn set_status(
        &self,
        server_id: VirtualServerId,
        status: RecordStatus,
    ) -> ComposerResult<VirtualServer> {
        let mut server = self.get(server_id).await?;
        server.set_status(status, &*self.clock);
        self.repository.update_virtual_server(&server).await?;
        Ok(server)
    }

    /// Deletes a virtual server and its attachments, never the tools.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::NotFound`] for unknown servers.
    pub async fn delete(&self, server_id: VirtualServerId) -> ComposerResult<()> {
        self.repository
            .delete_virtual_server(server_id)
            .await
            .map_err(|err| match err {
                RegistryError::VirtualServerNotFound(_) => ComposerError::NotFound(server_id),
                other => ComposerError::Repository(other),
            })?;
        info!(virtual_server_id = %server_id, "virtual server deleted");
        Ok(())
    }
}
