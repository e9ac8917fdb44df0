//! amoCRM API v4 client.
//!
//! Wires the entity mapping engine of `amocrm-model` to the REST API:
//! - [`entities`]: Contact, Company, Lead, Task, Note, Tag, User, Pipeline
//! - [`HttpTransport`]: blocking `reqwest` transport with bearer auth
//! - [`ClientConfig`]: account subdomain, API root, timeouts
//! - [`AmoApi`]: one typed gateway per collection over a shared session
//!
//! ```no_run
//! use amocrm_client::{AmoApi, ClientConfig, StaticToken};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = AmoApi::new(ClientConfig::for_subdomain("acme"), StaticToken::new("token"))?;
//! let mut contact = api.contacts().build([("name", "Jon Snow")])?;
//! contact.set("phone", "+100")?;
//! contact.save()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod http;
pub mod token;

pub use api::AmoApi;
pub use config::ClientConfig;
pub use entities::{Company, Contact, Lead, Note, NoteType, Pipeline, Status, Tag, Task, TaskList, User};
pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use token::{StaticToken, TokenProvider};

pub use amocrm_model::{EntityId, FieldValue, ListQuery, ModelError, ModelResult};
