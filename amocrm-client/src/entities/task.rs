//! Tasks and the task list of a record.

use std::sync::LazyLock;

use amocrm_model::{
    Entity, EntityId, EntitySchema, Field, Filter, ListQuery, Model, ModelResult, Objects,
};
use chrono::{DateTime, Utc};

use super::{entity_model, user};

static TASK: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Task", "tasks")
        .main_field("text")
        .timestamps("created_at", "updated_at")
        .fields([
            Field::plain("text").required(),
            Field::plain("entity_id").blank(),
            Field::plain("entity_type").blank(),
            Field::plain("task_type_id").blank(),
            Field::boolean("is_completed").blank(),
            Field::plain("duration").blank(),
            Field::datetime("complete_till"),
            Field::link("responsible_user", "responsible_user_id", user::schema),
            Field::read_only("created_by").blank(),
            Field::datetime("created_at"),
            Field::datetime("updated_at"),
            Field::plain("result").key("text").at(&["result"]).blank(),
        ])
        .not_searchable()
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &TASK
}

entity_model!(Task => schema);

impl Task {
    pub fn text(&mut self) -> ModelResult<Option<String>> {
        self.get_text("text")
    }

    pub fn is_completed(&mut self) -> ModelResult<bool> {
        Ok(self.get_bool("is_completed")?.unwrap_or(false))
    }

    /// Deadline of the task.
    pub fn complete_till(&mut self) -> ModelResult<Option<DateTime<Utc>>> {
        Ok(self.get("complete_till")?.as_datetime())
    }

    pub fn set_complete_till(&mut self, at: DateTime<Utc>) -> ModelResult<()> {
        self.set("complete_till", at)
    }

    /// Marks the task done with a result note. Saved on the next `save`.
    pub fn complete(&mut self, result: impl Into<String>) -> ModelResult<()> {
        self.set("is_completed", true)?;
        self.set("result", result.into())
    }
}

/// The tasks bound to one record.
#[derive(Debug, Clone)]
pub struct TaskList {
    tasks: Objects<Task>,
    entity_type: String,
    entity_id: EntityId,
}

impl TaskList {
    pub fn new(tasks: Objects<Task>, entity_type: impl Into<String>, entity_id: EntityId) -> Self {
        Self {
            tasks,
            entity_type: entity_type.into(),
            entity_id,
        }
    }

    /// Tasks of `owner`, which must be saved.
    pub fn of(owner: &Entity) -> ModelResult<Self> {
        let id = owner.require_id()?;
        let tasks = Objects::new(owner.manager().session().clone());
        Ok(Self::new(tasks, owner.manager().collection(), id))
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn query(&self) -> ListQuery {
        ListQuery::new()
            .filter(Filter::single("entity_type", &self.entity_type))
            .filter(Filter::single("entity_id", self.entity_id))
    }

    pub fn all(&self) -> impl Iterator<Item = ModelResult<Task>> + use<> {
        self.tasks.filter(self.query())
    }

    /// Binds `task` to the owner and saves it.
    pub fn add(&self, task: &mut Task) -> ModelResult<()> {
        let entity = task.entity_mut();
        entity.set("entity_type", self.entity_type.as_str())?;
        entity.set("entity_id", self.entity_id)?;
        entity.save()
    }

    /// A new task for the owner, saved immediately.
    pub fn create(&self, text: impl Into<String>) -> ModelResult<Task> {
        let mut task = self.tasks.build([("text", text.into())])?;
        self.add(&mut task)?;
        Ok(task)
    }
}
