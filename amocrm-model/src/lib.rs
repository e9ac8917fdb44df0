//! Entity mapping engine for the amoCRM API.
//!
//! Remote records are represented as [`Entity`] values whose attributes are
//! described by a static [`EntitySchema`]: an ordered registry of [`Field`]
//! descriptors, each mapping one attribute to a location in the wire JSON.
//!
//! The engine covers:
//! - decode/encode of scalar, link, nested and custom-field attributes
//! - dirty tracking so updates send only changed wire paths
//! - lazy fetch of a partially built record on first missing read
//! - per-account custom-field schema resolution, memoized per [`Session`]
//!
//! Network access goes through the [`Transport`] trait. The HTTP
//! implementation lives in `amocrm-client`; [`transport::mock`] provides an
//! in-memory one for tests.

pub mod custom_field;
pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod link;
pub mod manager;
pub mod raw;
pub mod repository;
pub mod schema;
pub mod transport;
pub mod value;

pub use custom_field::{CustomField, CustomFieldDef, CustomFieldSchema, CustomFieldType, EnumOption};
pub use entity::Entity;
pub use error::{ModelError, ModelResult, TransportError, TransportResult};
pub use field::{Field, FieldKind, LinkSpec};
pub use filter::{Filter, ListQuery, SortDirection};
pub use link::LinkedEntities;
pub use manager::{Entities, Manager, Session};
pub use raw::RawData;
pub use repository::{Model, Objects};
pub use schema::{EntitySchema, SchemaBuilder, SchemaRef, Timestamps};
pub use transport::{LinkTarget, Page, Transport};
pub use value::{Choice, FieldValue};

pub use amocrm_types::{EntityId, EpochSeconds};
