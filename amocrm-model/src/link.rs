//! Mutable views over embedded relations.

use amocrm_types::EntityId;
use serde_json::{Value, json};

use crate::entity::Entity;
use crate::error::ModelResult;
use crate::field::Field;
use crate::manager::Manager;
use crate::raw;
use crate::transport::LinkTarget;

/// The related records of one embedded-list field of an owner entity.
///
/// Changes go straight to the server as link/unlink calls. The owner's
/// local copy of the id list is kept in step, but the owner is not marked
/// dirty: link state lives outside its own payload.
pub struct LinkedEntities<'a> {
    owner: &'a mut Entity,
    field: &'static Field,
    target: Manager,
}

impl<'a> LinkedEntities<'a> {
    pub(crate) fn new(owner: &'a mut Entity, field: &'static Field, target: Manager) -> Self {
        Self {
            owner,
            field,
            target,
        }
    }

    /// Ids currently linked, as last seen by the owner.
    pub fn ids(&self) -> Vec<EntityId> {
        raw::lookup(self.owner.raw(), &self.field.wire_path())
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(EntityId::from_json))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        entity.id().is_some_and(|id| self.ids().contains(&id))
    }

    /// Fetches each linked record, one request per id.
    pub fn iter(&self) -> impl Iterator<Item = ModelResult<Entity>> + '_ {
        self.ids().into_iter().map(move |id| self.target.get(id))
    }

    /// Links `entity`, creating it first if it has no id.
    pub fn append(&mut self, entity: &mut Entity) -> ModelResult<()> {
        self.attach(entity, false)
    }

    /// Links `entity` as the main record of this relation.
    pub fn append_main(&mut self, entity: &mut Entity) -> ModelResult<()> {
        self.attach(entity, true)
    }

    fn attach(&mut self, entity: &mut Entity, main: bool) -> ModelResult<()> {
        let owner = self.owner.require_id()?;
        if entity.id().is_none() {
            entity.save()?;
        }
        let id = entity.require_id()?;
        let mut target = LinkTarget::new(id, entity.manager().collection());
        if main {
            target = target.main();
        }
        self.owner.manager().link(owner, &target)?;
        self.owner.update_embedded(self.field, |items| {
            let entry = json!({ "id": id });
            if !items.iter().any(|item| item.get("id") == entry.get("id")) {
                items.push(entry);
            }
        });
        Ok(())
    }

    /// Unlinks `entity`. The record itself is not deleted.
    pub fn remove(&mut self, entity: &Entity) -> ModelResult<()> {
        let owner = self.owner.require_id()?;
        let id = entity.require_id()?;
        let target = LinkTarget::new(id, entity.manager().collection());
        self.owner.manager().unlink(owner, &target)?;
        self.owner.update_embedded(self.field, |items| {
            items.retain(|item| item.get("id").and_then(EntityId::from_json) != Some(id));
        });
        Ok(())
    }
}
