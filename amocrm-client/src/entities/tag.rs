//! Tags.
//!
//! Each taggable collection has its own tag dictionary at
//! `{collection}/tags`.

use std::sync::LazyLock;

use amocrm_model::{EntitySchema, Field};

use super::entity_model;

static TAG: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Tag", "tags")
        .main_field("name")
        .fields([Field::plain("name").required(), Field::plain("color").blank()])
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &TAG
}

entity_model!(Tag => schema);

/// Collection path of the tag dictionary of `collection`.
pub fn collection_of(collection: &str) -> String {
    format!("{collection}/tags")
}
