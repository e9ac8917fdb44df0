//! Typed access to a collection.
//!
//! [`Model`] wraps an [`Entity`] in a named type (`Contact`, `Lead`, ...).
//! [`Objects`] is the typed counterpart of [`Manager`].

use std::marker::PhantomData;
use std::sync::Arc;

use amocrm_types::EntityId;

use crate::custom_field::CustomFieldSchema;
use crate::entity::Entity;
use crate::error::ModelResult;
use crate::filter::ListQuery;
use crate::manager::{Manager, Session};
use crate::schema::EntitySchema;
use crate::value::FieldValue;

/// A named entity type backed by a static schema.
pub trait Model: Sized {
    fn schema() -> &'static EntitySchema;

    fn from_entity(entity: Entity) -> Self;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    fn into_entity(self) -> Entity;
}

/// Typed gateway to the collection of `T`.
pub struct Objects<T> {
    manager: Manager,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for Objects<T> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            _model: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Objects<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Objects").field(&self.manager).finish()
    }
}

impl<T: Model> Objects<T> {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_manager(Manager::new(T::schema(), session))
    }

    /// Wraps a manager, e.g. one re-rooted onto a sub-collection.
    pub fn with_manager(manager: Manager) -> Self {
        Self {
            manager,
            _model: PhantomData,
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn new_entity(&self) -> T {
        T::from_entity(self.manager.new_entity())
    }

    /// An unsaved instance with the given attributes.
    pub fn build<I, K, V>(&self, attrs: I) -> ModelResult<T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        self.manager.build(attrs).map(T::from_entity)
    }

    /// Builds and saves in one step.
    pub fn create<I, K, V>(&self, attrs: I) -> ModelResult<T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut entity = self.manager.build(attrs)?;
        entity.save()?;
        Ok(T::from_entity(entity))
    }

    pub fn get(&self, id: EntityId) -> ModelResult<T> {
        self.manager.get(id).map(T::from_entity)
    }

    pub fn filter(&self, query: ListQuery) -> impl Iterator<Item = ModelResult<T>> + use<T> {
        self.manager.filter(query).map(|r| r.map(T::from_entity))
    }

    pub fn all(&self) -> impl Iterator<Item = ModelResult<T>> + use<T> {
        self.filter(ListQuery::new())
    }

    pub fn first(&self, query: ListQuery) -> ModelResult<Option<T>> {
        Ok(self.manager.first(query)?.map(T::from_entity))
    }

    /// First free-text match. Unsupported for collections without search.
    pub fn search(&self, text: &str) -> ModelResult<Option<T>> {
        Ok(self.manager.search(text)?.map(T::from_entity))
    }

    pub fn custom_fields(&self) -> ModelResult<Arc<CustomFieldSchema>> {
        self.manager.custom_fields()
    }
}
