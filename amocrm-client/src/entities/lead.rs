//! Leads (deals).

use std::sync::LazyLock;

use amocrm_model::{EntityId, EntitySchema, Field, Model, ModelResult};

use super::pipeline::{self, Pipeline, Status};
use super::task::TaskList;
use super::{company, contact, entity_model, user};

static LEAD: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Lead", "leads")
        .main_field("name")
        .timestamps("created_at", "updated_at")
        .fields([
            Field::plain("name").required(),
            Field::plain("price").blank(),
            Field::link("responsible_user", "responsible_user_id", user::schema),
            Field::read_only("group_id").blank(),
            Field::plain("status_id").blank(),
            Field::link("pipeline", "pipeline_id", pipeline::schema),
            Field::plain("loss_reason_id").blank(),
            Field::read_only("score").blank(),
            Field::boolean("is_deleted").blank(),
            Field::read_only("created_by").blank(),
            Field::read_only("updated_by").blank(),
            Field::datetime("created_at"),
            Field::datetime("updated_at"),
            Field::datetime("closed_at"),
            Field::read_only_datetime("closest_task_at"),
            Field::read_only("account_id").blank(),
            Field::tag_list("tags"),
            Field::embedded_list("contacts", "contacts", contact::schema),
            Field::embedded_list("companies", "companies", company::schema),
        ])
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &LEAD
}

entity_model!(
    /// A deal moving through a pipeline.
    Lead => schema
);

impl Lead {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }

    pub fn price(&mut self) -> ModelResult<Option<i64>> {
        self.get_i64("price")
    }

    pub fn pipeline(&mut self) -> ModelResult<Option<Pipeline>> {
        Ok(self.get_entity("pipeline")?.map(Pipeline::from_entity))
    }

    /// Current status, looked up among the statuses of the lead's pipeline.
    pub fn status(&mut self) -> ModelResult<Option<Status>> {
        let Some(status_id) = self.get_i64("status_id")? else {
            return Ok(None);
        };
        let Ok(status_id) = EntityId::try_from(status_id) else {
            return Ok(None);
        };
        match self.pipeline()? {
            Some(mut pipeline) => pipeline.status(status_id),
            None => Ok(None),
        }
    }

    /// Moves the lead to `status` and its pipeline.
    pub fn set_status(&mut self, status: &Status) -> ModelResult<()> {
        let id = status.require_id()?;
        self.set("status_id", id)?;
        if let Some(pipeline_id) = status.raw().get("pipeline_id").and_then(EntityId::from_json) {
            self.set("pipeline", pipeline_id)?;
        }
        Ok(())
    }

    pub fn tasks(&self) -> ModelResult<TaskList> {
        TaskList::of(self)
    }
}
