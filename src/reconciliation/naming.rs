//! Gateway names for discovered tools.

use crate::{
    registry::{
        domain::{CatalogServer, CatalogServerId, RegistryDomainError, Tool, ToolDraft, ToolScope},
        ports::{RegistryResult, ToolRepository},
    },
    upstream::UpstreamTool,
};
use mockable::Clock;
use std::collections::HashSet;

/// Separator between the base name and a collision counter.
pub const COLLISION_SEPARATOR: &str = "__";

/// Returns `<server>-<tool>`, the name a tool gets when nothing collides.
#[must_use]
pub fn base_name(server_name: &str, original_name: &str) -> String {
    format!("{server_name}-{original_name}")
}

/// Assigns one gateway name per upstream tool, in upstream order.
///
/// `reserved` holds names other servers already stored under the same
/// owner. The first free occurrence of a base name keeps it; later or
/// colliding occurrences get `__2`, `__3` and so on, skipping any candidate
/// already taken.
#[must_use]
pub fn assign_modified_names<'a, I>(
    server_name: &str,
    original_names: I,
    reserved: HashSet<String>,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken = reserved;
    let mut assigned = Vec::new();
    for original in original_names {
        let base = base_name(server_name, original);
        let mut candidate = base.clone();
        let mut counter = 2_u32;
        while taken.contains(&candidate) {
            candidate = format!("{base}{COLLISION_SEPARATOR}{counter}");
            counter += 1;
        }
        taken.insert(candidate.clone());
        assigned.push(candidate);
    }
    assigned
}

/// Loads the names other catalog servers hold under the owner of `scope`.
///
/// # Errors
///
/// Returns repository errors.
pub async fn reserved_names<R>(
    repository: &R,
    scope: &ToolScope,
    server_id: CatalogServerId,
) -> RegistryResult<HashSet<String>>
where
    R: ToolRepository + ?Sized,
{
    let names = repository
        .list_tool_names_owned_by_others(scope, server_id)
        .await?;
    Ok(names.into_iter().collect())
}

/// Builds the tool rows a server's discovery would store in `scope`,
/// avoiding the names in `reserved`.
///
/// # Errors
///
/// Returns [`RegistryDomainError::EmptyToolName`] when an upstream tool has a
/// blank name.
pub fn materialize(
    server: &CatalogServer,
    scope: &ToolScope,
    discovered: &[UpstreamTool],
    reserved: HashSet<String>,
    clock: &impl Clock,
) -> Result<Vec<Tool>, RegistryDomainError> {
    let names = assign_modified_names(
        server.name().as_str(),
        discovered.iter().map(|tool| tool.name.as_str()),
        reserved,
    );
    discovered
        .iter()
        .zip(names)
        .map(|(tool, modified_name)| {
            Tool::new(
                ToolDraft {
                    scope: scope.clone(),
                    catalog_server_id: server.id(),
                    original_name: tool.name.clone(),
                    modified_name,
                    description: tool.description.clone(),
                    input_schema: tool.input_schema.clone(),
                    annotations: tool.annotations.clone(),
                },
                clock,
            )
        })
        .collect()
}
