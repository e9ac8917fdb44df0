//! Per-collection gateway.
//!
//! A [`Manager`] binds an [`EntitySchema`] to a remote collection and turns
//! transport payloads into [`Entity`] instances. Managers are cheap to clone;
//! all of them created from one [`Session`] share its transport and its
//! custom-field schema memo.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use amocrm_types::EntityId;
use tracing::debug;

use crate::custom_field::CustomFieldSchema;
use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::filter::{Filter, ListQuery};
use crate::raw::RawData;
use crate::schema::EntitySchema;
use crate::transport::{LinkTarget, Transport};
use crate::value::FieldValue;

/// Transport plus per-account state shared by every manager.
pub struct Session {
    transport: Arc<dyn Transport>,
    custom_fields: Mutex<HashMap<String, Arc<CustomFieldSchema>>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            custom_fields: Mutex::new(HashMap::new()),
        })
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Custom-field schema of `collection`, fetched at most once.
    ///
    /// The memo lock is held across the fetch so concurrent first callers
    /// wait for one request instead of issuing their own.
    pub fn custom_fields(&self, collection: &str) -> ModelResult<Arc<CustomFieldSchema>> {
        let mut memo = self
            .custom_fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = memo.get(collection) {
            return Ok(Arc::clone(schema));
        }
        let fields = self.transport.custom_fields(collection)?;
        debug!(collection, count = fields.len(), "custom field schema loaded");
        let schema = Arc::new(CustomFieldSchema::new(fields));
        memo.insert(collection.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Drops memoized custom-field schemas so the next access refetches.
    pub fn forget_custom_fields(&self) {
        self.custom_fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Gateway between one entity type and one remote collection.
#[derive(Clone)]
pub struct Manager {
    schema: &'static EntitySchema,
    collection: String,
    session: Arc<Session>,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("entity", &self.schema.name())
            .field("collection", &self.collection)
            .finish()
    }
}

impl Manager {
    pub fn new(schema: &'static EntitySchema, session: Arc<Session>) -> Self {
        Self {
            schema,
            collection: schema.collection().to_string(),
            session,
        }
    }

    /// Same entity type, different collection path (e.g. the notes of one
    /// contact live under `contacts/{id}/notes`).
    pub fn at(&self, collection: impl Into<String>) -> Self {
        Self {
            schema: self.schema,
            collection: collection.into(),
            session: Arc::clone(&self.session),
        }
    }

    /// Manager for another entity type sharing this session.
    pub fn related(&self, schema: &'static EntitySchema) -> Self {
        Self::new(schema, Arc::clone(&self.session))
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.session.transport()
    }

    /// An empty, unsaved entity.
    pub fn new_entity(&self) -> Entity {
        Entity::new(self.clone(), RawData::new(), false)
    }

    /// An unsaved entity with the given attributes set (and marked dirty).
    pub fn build<I, K, V>(&self, attrs: I) -> ModelResult<Entity>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut entity = self.new_entity();
        for (name, value) in attrs {
            entity.set(name.as_ref(), value)?;
        }
        Ok(entity)
    }

    /// An entity from a complete server payload: loaded, nothing dirty.
    pub fn from_raw(&self, raw: RawData) -> Entity {
        Entity::new(self.clone(), raw, true)
    }

    /// An entity from partial data: not loaded, nothing dirty. Reads of
    /// missing attributes fetch the record when it has an id.
    pub fn partial(&self, raw: RawData) -> Entity {
        Entity::new(self.clone(), raw, false)
    }

    /// A stub carrying only the id.
    pub fn proxy(&self, id: EntityId) -> Entity {
        let mut raw = RawData::new();
        raw.insert("id".into(), id.to_json());
        self.partial(raw)
    }

    pub(crate) fn fetch_raw(&self, id: EntityId) -> ModelResult<RawData> {
        let include = self.schema.embedded_includes();
        self.transport()
            .get(&self.collection, id, &include)?
            .ok_or_else(|| ModelError::NotFound {
                collection: self.collection.clone(),
                id,
            })
    }

    /// Fetches one record. A missing record is [`ModelError::NotFound`].
    pub fn get(&self, id: EntityId) -> ModelResult<Entity> {
        self.fetch_raw(id).map(|raw| self.from_raw(raw))
    }

    /// Lazily paged listing.
    pub fn filter(&self, query: ListQuery) -> Entities {
        let query = query.include(self.schema.embedded_includes());
        Entities {
            manager: self.clone(),
            query,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn all(&self) -> Entities {
        self.filter(ListQuery::new())
    }

    pub fn first(&self, query: ListQuery) -> ModelResult<Option<Entity>> {
        self.filter(query).next().transpose()
    }

    /// Free-text search returning the first hit.
    pub fn search(&self, text: &str) -> ModelResult<Option<Entity>> {
        if !self.schema.is_searchable() {
            return Err(ModelError::Unsupported {
                operation: "search",
                entity: self.schema.name(),
            });
        }
        self.first(ListQuery::new().search(text))
    }

    /// Finds a record whose main field equals `value` exactly.
    pub fn find_by_main_field(&self, value: &str) -> ModelResult<Option<Entity>> {
        if !self.schema.is_searchable() {
            return Err(ModelError::Unsupported {
                operation: "search",
                entity: self.schema.name(),
            });
        }
        for entity in self.filter(ListQuery::new().search(value)) {
            let entity = entity?;
            if entity.display().as_deref() == Some(value) {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    /// Records matching a single `filter[name]=value`.
    pub fn filter_by(&self, name: &str, value: impl ToString) -> Entities {
        self.filter(ListQuery::new().filter(Filter::single(name, value)))
    }

    pub(crate) fn create(&self, data: &RawData) -> ModelResult<RawData> {
        debug!(collection = %self.collection, "create");
        Ok(self.transport().create(&self.collection, data)?)
    }

    pub(crate) fn update(&self, id: EntityId, diff: &RawData) -> ModelResult<RawData> {
        debug!(collection = %self.collection, %id, keys = diff.len(), "update");
        Ok(self.transport().update(&self.collection, id, diff)?)
    }

    pub(crate) fn delete(&self, id: EntityId) -> ModelResult<()> {
        if !self.schema.is_deletable() {
            return Err(ModelError::Unsupported {
                operation: "delete",
                entity: self.schema.name(),
            });
        }
        debug!(collection = %self.collection, %id, "delete");
        Ok(self.transport().delete(&self.collection, id)?)
    }

    pub(crate) fn link(&self, id: EntityId, target: &LinkTarget) -> ModelResult<()> {
        debug!(collection = %self.collection, %id, to = %target.to_entity_type, "link");
        Ok(self.transport().link(&self.collection, id, target)?)
    }

    pub(crate) fn unlink(&self, id: EntityId, target: &LinkTarget) -> ModelResult<()> {
        debug!(collection = %self.collection, %id, to = %target.to_entity_type, "unlink");
        Ok(self.transport().unlink(&self.collection, id, target)?)
    }

    /// Custom-field schema of this entity type's collection.
    pub fn custom_fields(&self) -> ModelResult<Arc<CustomFieldSchema>> {
        self.session.custom_fields(self.schema.collection())
    }
}

/// Iterator over a listing, fetching pages on demand.
///
/// Stops after the first page without a `next` link, or after yielding an
/// error.
#[derive(Debug)]
pub struct Entities {
    manager: Manager,
    query: ListQuery,
    buffer: VecDeque<RawData>,
    exhausted: bool,
}

impl Iterator for Entities {
    type Item = ModelResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.buffer.pop_front() {
                return Some(Ok(self.manager.from_raw(raw)));
            }
            if self.exhausted {
                return None;
            }
            let page = match self
                .manager
                .transport()
                .list(self.manager.collection(), &self.query)
            {
                Ok(page) => page,
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err.into()));
                }
            };
            debug!(
                collection = %self.manager.collection(),
                page = self.query.page,
                items = page.items.len(),
                "page fetched"
            );
            self.exhausted = !page.has_next || page.items.is_empty();
            self.query.page += 1;
            self.buffer.extend(page.items);
        }
    }
}
