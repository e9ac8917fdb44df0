//! Lead pipelines and their statuses.

use std::sync::LazyLock;

use amocrm_model::{EntityId, EntitySchema, Field, ModelResult};

use super::entity_model;

static PIPELINE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Pipeline", "leads/pipelines")
        .main_field("name")
        .fields([
            Field::plain("name").required(),
            Field::plain("sort").blank(),
            Field::boolean("is_main").blank(),
            Field::boolean("is_unsorted_on").blank(),
            Field::boolean("is_archive").blank(),
            Field::read_only("account_id").blank(),
            Field::object("statuses", status_schema, true)
                .at(&["_embedded"])
                .blank(),
        ])
        .not_searchable()
        .build()
});

static STATUS: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Status", "statuses")
        .main_field("name")
        .fields([
            Field::plain("name").required(),
            Field::plain("sort").blank(),
            Field::boolean("is_editable").blank(),
            Field::plain("color").blank(),
            Field::plain("type").blank(),
            Field::read_only("pipeline_id").blank(),
        ])
        .not_searchable()
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &PIPELINE
}

pub fn status_schema() -> &'static EntitySchema {
    &STATUS
}

entity_model!(
    /// A sales pipeline. Its statuses come embedded in the pipeline payload.
    Pipeline => schema
);

entity_model!(
    /// One stage of a pipeline.
    Status => status_schema
);

impl Pipeline {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }

    pub fn statuses(&mut self) -> ModelResult<Vec<Status>> {
        Ok(self
            .get_entities("statuses")?
            .into_iter()
            .map(|entity| <Status as amocrm_model::Model>::from_entity(entity))
            .collect())
    }

    pub fn status(&mut self, id: EntityId) -> ModelResult<Option<Status>> {
        Ok(self.statuses()?.into_iter().find(|s| s.id() == Some(id)))
    }

    /// Collection path of this pipeline's statuses.
    pub fn statuses_collection(&self) -> ModelResult<String> {
        Ok(format!("leads/pipelines/{}/statuses", self.require_id()?))
    }
}

impl Status {
    pub fn name(&mut self) -> ModelResult<Option<String>> {
        self.get_text("name")
    }
}
