//! Domain types and rules for the thesis-management client.
//!
//! Nothing here performs I/O; the HTTP layer lives in `tesis-client`.

pub mod bitacora;
pub mod defense;
pub mod deliverable;
pub mod error;
pub mod notification;
pub mod prerequisite;
pub mod proposal;
pub mod reconcile;
pub mod roles;
pub mod search;
pub mod tutoring;
pub mod types;
pub mod user;
pub mod workflow;
