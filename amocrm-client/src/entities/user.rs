//! Account users.

use std::sync::LazyLock;

use amocrm_model::{EntitySchema, Field, ModelResult};

use super::entity_model;

static USER: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("User", "users")
        .main_field("name")
        .fields([
            Field::plain("name"),
            Field::plain("email").blank(),
            Field::plain("lang").blank(),
            Field::boolean("is_admin").at(&["rights"]).blank(),
            Field::boolean("is_free").at(&["rights"]).blank(),
            Field::boolean("is_active").at(&["rights"]).blank(),
            Field::plain("group_id").at(&["rights"]).blank(),
        ])
        .not_searchable()
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &USER
}

entity_model!(
    /// A user of the account. Users are managed in the CRM UI; the API
    /// lists them but does not search them.
    User => schema
);

impl User {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }

    pub fn email(&mut self) -> ModelResult<Option<String>> {
        self.get_text("email")
    }

    pub fn is_admin(&mut self) -> ModelResult<bool> {
        Ok(self.get_bool("is_admin")?.unwrap_or(false))
    }
}
