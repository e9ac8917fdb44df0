//! Contacts.

use std::sync::LazyLock;

use amocrm_model::{CustomField, EntitySchema, Field, Manager, ModelResult, Objects};

use super::task::TaskList;
use super::{company, entity_model, lead, note, user, Company, Note};

static CONTACT: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Contact", "contacts")
        .main_field("name")
        .timestamps("created_at", "updated_at")
        .fields([
            Field::plain("name").required(),
            Field::plain("first_name").blank(),
            Field::plain("last_name").blank(),
            Field::link("responsible_user", "responsible_user_id", user::schema),
            Field::plain("group_id").blank(),
            Field::read_only("created_by").blank(),
            Field::read_only("updated_by").blank(),
            Field::datetime("created_at"),
            Field::datetime("updated_at"),
            Field::read_only_datetime("closest_task_at"),
            Field::boolean("is_deleted").blank(),
            Field::read_only("account_id").blank(),
            Field::tag_list("tags"),
            Field::embedded_link("company", "companies", company::schema),
            Field::embedded_list("leads", "leads", lead::schema),
            Field::custom("phone", CustomField::phone("Phone", "WORK")),
            Field::custom("mobile", CustomField::phone("Phone", "MOB")),
            Field::custom("email", CustomField::email("Email", "WORK")),
            Field::custom("position", CustomField::named("Position").code("POSITION")),
        ])
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &CONTACT
}

entity_model!(
    /// A person in the CRM.
    Contact => schema
);

impl Contact {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }

    pub fn phone(&mut self) -> ModelResult<Option<String>> {
        self.get_text("phone")
    }

    pub fn email(&mut self) -> ModelResult<Option<String>> {
        self.get_text("email")
    }

    pub fn tags(&mut self) -> ModelResult<Vec<String>> {
        Ok(self
            .get("tags")?
            .as_tags()
            .map(<[String]>::to_vec)
            .unwrap_or_default())
    }

    /// The company the contact belongs to, if linked.
    pub fn company(&mut self) -> ModelResult<Option<Company>> {
        Ok(self
            .get_entity("company")?
            .map(<Company as amocrm_model::Model>::from_entity))
    }

    /// Links the contact to `company`, creating the company first if needed.
    pub fn set_company(&mut self, company: Company) -> ModelResult<()> {
        self.set("company", company)
    }

    /// Notes of this contact. The contact must be saved.
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
