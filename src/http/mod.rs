//! Administrative REST surface and router composition.
//!
//! Identity is consumed, never produced: the authentication layer in front of
//! the gateway supplies `X-User-Id` and `X-User-Role`, and handlers trust
//! them. Catalog mutations require the `ADMIN` role; everything else is
//! scoped to the calling tenant.

pub mod dto;
mod error;
pub mod handlers;
mod principal;
mod routes;
mod state;

pub use error::HttpError;
pub use principal::{Principal, Role, USER_ID_HEADER, USER_ROLE_HEADER};
pub use routes::{admin_routes, build_router};
pub use state::{AppContext, AppState};
