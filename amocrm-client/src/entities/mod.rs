//! The CRM's entity types.
//!
//! Each type is a thin [`Model`](amocrm_model::Model) wrapper around an
//! [`Entity`](amocrm_model::Entity) with a static schema. Wrappers deref to
//! the entity, so the untyped `get`/`set`/`save` API stays available next to
//! the typed accessors.

/// Declares a model wrapper bound to a schema function.
macro_rules! entity_model {
    ($(#[$meta:meta])* $name:ident => $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(amocrm_model::Entity);

        impl amocrm_model::Model for $name {
            fn schema() -> &'static amocrm_model::EntitySchema {
                $schema()
            }

            fn from_entity(entity: amocrm_model::Entity) -> Self {
                Self(entity)
            }

            fn entity(&self) -> &amocrm_model::Entity {
                &self.0
            }

            fn entity_mut(&mut self) -> &mut amocrm_model::Entity {
                &mut self.0
            }

            fn into_entity(self) -> amocrm_model::Entity {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = amocrm_model::Entity;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for amocrm_model::FieldValue {
            fn from(value: $name) -> Self {
                value.0.into()
            }
        }
    };
}

pub(crate) use entity_model;

pub mod company;
pub mod contact;
pub mod lead;
pub mod note;
pub mod pipeline;
pub mod tag;
pub mod task;
pub mod user;

pub use company::Company;
pub use contact::Contact;
pub use lead::Lead;
pub use note::{Note, NoteType};
pub use pipeline::{Pipeline, Status};
pub use tag::Tag;
pub use task::{Task, TaskList};
pub use user::User;
