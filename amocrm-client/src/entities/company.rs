//! Companies.

use std::sync::LazyLock;

use amocrm_model::{CustomField, EntitySchema, Field, Manager, ModelResult, Objects};

use super::task::TaskList;
use super::{contact, entity_model, lead, note, user, Note};

static COMPANY: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Company", "companies")
        .main_field("name")
        .timestamps("created_at", "updated_at")
        .fields([
            Field::plain("name").required(),
            Field::link("responsible_user", "responsible_user_id", user::schema),
            Field::plain("group_id").blank(),
            Field::read_only("created_by").blank(),
            Field::read_only("updated_by").blank(),
            Field::datetime("created_at"),
            Field::datetime("updated_at"),
            Field::read_only_datetime("closest_task_at"),
            Field::read_only("account_id").blank(),
            Field::tag_list("tags"),
            Field::embedded_list("contacts", "contacts", contact::schema),
            Field::embedded_list("leads", "leads", lead::schema),
            Field::custom("phone", CustomField::phone("Phone", "WORK")),
            Field::custom("email", CustomField::email("Email", "WORK")),
            Field::custom("web", CustomField::named("Web").code("WEB")),
            Field::custom("address", CustomField::named("Address").code("ADDRESS")),
        ])
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &COMPANY
}

entity_model!(
    /// An organisation in the CRM.
    Company => schema
);

impl Company {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }

    pub fn notes(&self) -> ModelResult<Objects<Note>> {
        let id = self.require_id()?;
        let manager = Manager::new(note::schema(), self.manager().session().clone())
            .at(note::collection_of(self.manager().collection(), id));
        Ok(Objects::with_manager(manager))
    }

    pub fn tasks(&self) -> ModelResult<TaskList> {
        TaskList::of(self)
    }
}
