//! Backend — adapter for the hosted auth + row store.

pub mod config;
pub mod http;
pub mod types;

pub use config::BackendConfig;
pub use http::HttpBackend;
pub use types::{Backend, BackendError, Message, Role, Session, SessionEvent, same_session};
