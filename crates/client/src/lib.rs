//! `tesis-client` library crate.
//!
//! HTTP access to the thesis-management backend plus the page controllers
//! ("boards") built on top of it. The notifier binary lives in `main.rs`.

pub mod api;
pub mod boards;
pub mod config;
pub mod download;
pub mod error;
pub mod poller;
pub mod ports;
pub mod services;
pub mod session;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use services::Backend;
pub use session::{Session, SessionHandle, SessionStore};
