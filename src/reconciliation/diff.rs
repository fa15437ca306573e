//! Set difference between upstream tools and stored tools.

use crate::registry::domain::{Tool, ToolId};
use serde::Serialize;
use std::collections::HashSet;

/// Inserts and deletes that bring a stored scope in line with upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDiff {
    /// Desired tools with no stored counterpart, in upstream order.
    pub to_insert: Vec<Tool>,
    /// Stored tools upstream no longer advertises, in stored order.
    pub to_delete: Vec<Tool>,
}

impl ToolDiff {
    /// Compares `desired` against `current` by modified name.
    #[must_use]
    pub fn compute(desired: Vec<Tool>, current: Vec<Tool>) -> Self {
        let desired_names: HashSet<String> = desired
            .iter()
            .map(|tool| tool.modified_name().to_owned())
            .collect();
        let current_names: HashSet<String> = current
            .iter()
            .map(|tool| tool.modified_name().to_owned())
            .collect();
        Self {
            to_insert: desired
                .into_iter()
                .filter(|tool| !current_names.contains(tool.modified_name()))
                .collect(),
            to_delete: current
                .into_iter()
                .filter(|tool| !desired_names.contains(tool.modified_name()))
                .collect(),
        }
    }

    /// Returns `true` when nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    /// Identifiers of the rows to delete.
    #[must_use]
    pub fn delete_ids(&self) -> Vec<ToolId> {
        self.to_delete.iter().map(Tool::id).collect()
    }
}

/// Tools a refresh added and deleted, reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    /// Newly stored tools.
    pub added: Vec<Tool>,
    /// Removed tools.
    pub deleted: Vec<Tool>,
}

impl From<ToolDiff> for RefreshOutcome {
    fn from(diff: ToolDiff) -> Self {
        Self {
            added: diff.to_insert,
            deleted: diff.to_delete,
        }
    }
}
