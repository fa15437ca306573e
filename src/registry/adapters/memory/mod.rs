//! Thread-safe in-memory implementation of every registry port.
//!
//! One [`InMemoryRegistry`] holds catalog servers, hub bindings, tools, and
//! virtual servers behind a single lock, so multi-row writes validate first
//! and then mutate under one write guard. That gives the same all-or-nothing
//! behaviour the `PostgreSQL` adapter gets from transactions.

mod catalog;
mod hub;
mod tool;
mod virtual_server;

use crate::registry::{
    domain::{
        CatalogServer, CatalogServerId, HubServer, HubServerId, HubWithServer, Tool, ToolId,
        UserId, VirtualServer, VirtualServerId,
    },
    ports::{RegistryError, RegistryResult},
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<RegistryState>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    catalog: HashMap<CatalogServerId, CatalogServer>,
    hubs: HashMap<HubServerId, HubServer>,
    tools: HashMap<ToolId, Tool>,
    virtual_servers: HashMap<VirtualServerId, VirtualServer>,
    attachments: HashMap<VirtualServerId, Vec<ToolId>>,
    pending_failure: Option<String>,
}

impl InMemoryRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write operation fail with a persistence error before it
    /// changes anything.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the lock is poisoned.
    pub fn fail_next_write(&self, message: impl Into<String>) -> RegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.pending_failure = Some(message.into());
        Ok(())
    }

    /// Returns the number of stored tool rows across all scopes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the lock is poisoned.
    pub fn tool_count(&self) -> RegistryResult<usize> {
        Ok(self.read()?.tools.len())
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.state.read().map_err(lock_error)
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(message) = state.pending_failure.take() {
            return Err(RegistryError::persistence(std::io::Error::other(message)));
        }
        Ok(state)
    }
}

fn lock_error<E: std::fmt::Display>(err: E) -> RegistryError {
    RegistryError::persistence(std::io::Error::other(err.to_string()))
}

impl RegistryState {
    /// Rejects inserts whose modified name collides inside its owner scope,
    /// treating rows in `deleting` as already gone.
    fn check_tool_names(&self, insert: &[Tool], deleting: &HashSet<ToolId>) -> RegistryResult<()> {
        let mut taken: HashSet<(Option<&UserId>, &str)> = self
            .tools
            .values()
            .filter(|tool| !deleting.contains(&tool.id()))
            .map(|tool| (tool.user_id(), tool.modified_name()))
            .collect();
        for tool in insert {
            if !taken.insert((tool.user_id(), tool.modified_name())) {
                return Err(RegistryError::DuplicateToolName(
                    tool.modified_name().to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn insert_tools(&mut self, tools: &[Tool]) {
        for tool in tools {
            self.tools.insert(tool.id(), tool.clone());
        }
    }

    /// Deletes tool rows and detaches them from every virtual server.
    fn remove_tools(&mut self, tool_ids: &HashSet<ToolId>) {
        self.tools.retain(|id, _| !tool_ids.contains(id));
        for attached in self.attachments.values_mut() {
            attached.retain(|id| !tool_ids.contains(id));
        }
    }

    fn join_hub(&self, hub: &HubServer) -> RegistryResult<HubWithServer> {
        let server = self
            .catalog
            .get(&hub.catalog_server_id())
            .cloned()
            .ok_or(RegistryError::CatalogServerNotFound(hub.catalog_server_id()))?;
        Ok(HubWithServer {
            hub: hub.clone(),
            server,
        })
    }
}
