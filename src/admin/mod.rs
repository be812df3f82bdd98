//! Admin interface
//!
//! A JSON back office over every entity, served with axum behind staff
//! HTTP Basic authentication.

pub mod dispatch;
pub mod response;
pub mod routes;
pub mod site;

pub use routes::{router, AppState};
pub use site::{AdminSite, Entity, ListParams, ModelAdmin};
