//! Tool Reconciliation Orchestrator.
//!
//! Keeps stored tool rows consistent with what upstream servers advertise.
//! Every workflow discovers first and writes afterwards, so no database
//! transaction is ever held across network I/O and a failed discovery
//! leaves no trace.

mod catalog;
mod diff;
mod error;
mod hub;
pub mod naming;

pub use catalog::{AddCatalogServerRequest, CatalogOrchestrator, RegisteredCatalogServer};
pub use diff::{RefreshOutcome, ToolDiff};
pub use error::{ReconciliationError, ReconciliationResult};
pub use hub::{AddHubRequest, HubOrchestrator, RegisteredHub};
