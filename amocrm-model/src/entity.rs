//! Entity instances and their lifecycle.
//!
//! An [`Entity`] is one remote record: its wire data, whether that data came
//! from a complete server response, which wire paths changed locally, and a
//! cache of decoded attribute values. Every attribute access goes through
//! the [`Field`] registry of the entity's schema.
//!
//! Lifecycle: unbound (no id) → persisted (`save` assigned an id) → mutated
//! (dirty paths pending) → persisted again, or deleted (terminal).
//!
//! An instance is not synchronized. Share it across threads only behind
//! your own lock.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use amocrm_types::{EntityId, EpochSeconds};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{ModelError, ModelResult, TransportError};
use crate::field::{Field, FieldKind, LinkSpec};
use crate::link::LinkedEntities;
use crate::manager::Manager;
use crate::raw::{self, RawData, WirePath};
use crate::schema::{EntitySchema, SchemaRef};
use crate::transport::LinkTarget;
use crate::value::FieldValue;

/// Wire key stamped on creation by older API versions; never copied.
const LEGACY_CREATED_KEY: &str = "date_create";

/// One remote record.
#[derive(Clone)]
pub struct Entity {
    manager: Manager,
    raw: RawData,
    loaded: bool,
    dirty: BTreeSet<WirePath>,
    cache: HashMap<&'static str, FieldValue>,
    missed: HashSet<&'static str>,
    pending: BTreeMap<&'static str, Entity>,
    deleted: bool,
}

impl Entity {
    pub(crate) fn new(manager: Manager, raw: RawData, loaded: bool) -> Self {
        Self {
            manager,
            raw,
            loaded,
            dirty: BTreeSet::new(),
            cache: HashMap::new(),
            missed: HashSet::new(),
            pending: BTreeMap::new(),
            deleted: false,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.manager.schema()
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Server-assigned id, once persisted.
    pub fn id(&self) -> Option<EntityId> {
        self.raw.get("id").and_then(EntityId::from_json)
    }

    /// Built from a complete server response.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Wire data, exactly as it would be sent.
    pub fn raw(&self) -> &RawData {
        &self.raw
    }

    pub fn into_raw(self) -> RawData {
        self.raw
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    /// Dot-joined wire paths changed since load or last save.
    pub fn dirty_fields(&self) -> BTreeSet<String> {
        self.dirty.iter().map(|p| raw::display_path(p)).collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty() || !self.pending.is_empty()
    }

    /// Value of the main field as a string, if any.
    pub fn display(&self) -> Option<String> {
        let field = self.schema().main_field()?;
        match raw::lookup(&self.raw, &field.wire_path())? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn ensure_live(&self) -> ModelResult<()> {
        if self.deleted {
            return Err(ModelError::Deleted {
                entity: self.schema().name(),
            });
        }
        Ok(())
    }

    /// The id, or [`ModelError::NotPersisted`] for an unsaved entity.
    pub fn require_id(&self) -> ModelResult<EntityId> {
        self.id().ok_or(ModelError::NotPersisted {
            entity: self.schema().name(),
        })
    }

    fn field(&self, name: &str) -> ModelResult<&'static Field> {
        let schema = self.schema();
        schema.field(name).ok_or_else(|| ModelError::UnknownField {
            entity: schema.name(),
            field: name.to_string(),
        })
    }

    // ── Reading ──────────────────────────────────────────────────

    /// Reads an attribute.
    ///
    /// When the attribute decodes to nothing on a partially built instance
    /// that has an id, the record is fetched once and the read retried.
    pub fn get(&mut self, name: &str) -> ModelResult<FieldValue> {
        self.ensure_live()?;
        let field = self.field(name)?;
        if let Some(value) = self.cache.get(field.name()) {
            return Ok(value.clone());
        }
        let value = match self.decode(field) {
            Ok(FieldValue::Null) | Err(ModelError::NoData { .. }) if self.should_fetch(field) => {
                self.fetch_on_miss(field)?;
                self.decode(field)?
            }
            other => other?,
        };
        self.cache.insert(field.name(), value.clone());
        Ok(value)
    }

    pub fn get_text(&mut self, name: &str) -> ModelResult<Option<String>> {
        self.get(name).map(FieldValue::into_text)
    }

    pub fn get_i64(&mut self, name: &str) -> ModelResult<Option<i64>> {
        self.get(name).map(|v| v.as_i64())
    }

    pub fn get_f64(&mut self, name: &str) -> ModelResult<Option<f64>> {
        self.get(name).map(|v| v.as_f64())
    }

    pub fn get_bool(&mut self, name: &str) -> ModelResult<Option<bool>> {
        self.get(name).map(|v| v.as_bool())
    }

    pub fn get_entity(&mut self, name: &str) -> ModelResult<Option<Entity>> {
        self.get(name).map(FieldValue::into_entity)
    }

    pub fn get_entities(&mut self, name: &str) -> ModelResult<Vec<Entity>> {
        self.get(name).map(|v| v.into_entities().unwrap_or_default())
    }

    fn should_fetch(&self, field: &Field) -> bool {
        !self.loaded
            && self.id().is_some()
            && !matches!(field.kind(), FieldKind::Constant(_))
            && !self.missed.contains(field.name())
            && !self.pending.contains_key(field.name())
            && !self.dirty.contains(&field.wire_path())
    }

    fn fetch_on_miss(&mut self, field: &'static Field) -> ModelResult<()> {
        let id = self.require_id()?;
        self.missed.insert(field.name());
        debug!(
            entity = self.schema().name(),
            %id,
            field = field.name(),
            "lazy fetch on miss"
        );
        let fresh = self.manager.fetch_raw(id)?;
        self.absorb(fresh);
        Ok(())
    }

    // Replaces the wire data with a fresh copy, keeping local edits on top.
    fn absorb(&mut self, mut fresh: RawData) {
        for path in &self.dirty {
            match raw::lookup(&self.raw, path) {
                Some(value) => raw::write(&mut fresh, path, value.clone()),
                None => {
                    raw::remove(&mut fresh, path);
                }
            }
        }
        self.raw = fresh;
        self.loaded = true;
        self.cache.clear();
    }

    fn decode(&self, field: &'static Field) -> ModelResult<FieldValue> {
        let wire = raw::lookup(&self.raw, &field.wire_path());
        match field.kind() {
            FieldKind::Link(spec) => Ok(self.decode_link(field, spec, wire)),
            FieldKind::ManyLink(spec) => self.decode_many_link(field, spec, wire),
            FieldKind::EmbeddedLink(target) => Ok(self
                .embedded_stubs(*target, wire)
                .into_iter()
                .next()
                .map_or(FieldValue::Null, FieldValue::from)),
            FieldKind::EmbeddedList(target) => match wire {
                None | Some(Value::Null) => Ok(FieldValue::Null),
                Some(_) => Ok(FieldValue::Entities(self.embedded_stubs(*target, wire))),
            },
            FieldKind::Object { target, many } => self.decode_object(field, *target, *many, wire),
            FieldKind::Custom(decl) => {
                let schema = self.manager.custom_fields()?;
                let def = schema.resolve(decl)?;
                decl.read(def, wire)
            }
            _ => field.decode(self.schema().name(), wire),
        }
    }

    fn decode_link(&self, field: &Field, spec: &LinkSpec, wire: Option<&Value>) -> FieldValue {
        if let Some(pending) = self.pending.get(field.name()) {
            return pending.clone().into();
        }
        let carried: Vec<(&'static str, Value)> = spec
            .side_channels
            .iter()
            .filter_map(|(attr, key)| {
                self.raw
                    .get(*key)
                    .filter(|v| !v.is_null())
                    .map(|v| (*attr, v.clone()))
            })
            .collect();
        let target = self.manager.related((spec.target)());
        // The API uses 0 for "no record" on some foreign keys.
        let mut linked = match wire.and_then(EntityId::from_json).filter(|id| id.get() != 0) {
            Some(id) => target.proxy(id),
            None if !carried.is_empty() => target.new_entity(),
            None => return FieldValue::Null,
        };
        let unsaved = linked.id().is_none();
        for (attr, value) in carried {
            linked.seed(attr, value, unsaved);
        }
        linked.into()
    }

    fn decode_many_link(
        &self,
        field: &Field,
        spec: &LinkSpec,
        wire: Option<&Value>,
    ) -> ModelResult<FieldValue> {
        let ids: Vec<EntityId> = match wire {
            None | Some(Value::Null) => return Ok(FieldValue::Null),
            Some(Value::Array(items)) => items.iter().filter_map(EntityId::from_json).collect(),
            Some(other) => return Err(ModelError::invalid(field.name(), "list of ids", other)),
        };
        // A partial owner hands back bare ids rather than fetching targets
        // for an instance that may only exist to express a write.
        if !self.loaded {
            return Ok(FieldValue::Ids(ids));
        }
        let target = self.manager.related((spec.target)());
        ids.into_iter()
            .map(|id| target.get(id))
            .collect::<ModelResult<Vec<_>>>()
            .map(FieldValue::Entities)
    }

    fn embedded_stubs(&self, target: SchemaRef, wire: Option<&Value>) -> Vec<Entity> {
        let related = self.manager.related(target());
        wire.and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter(|obj| obj.get("id").and_then(EntityId::from_json).is_some())
                    .map(|obj| related.partial(obj.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn decode_object(
        &self,
        field: &Field,
        target: SchemaRef,
        many: bool,
        wire: Option<&Value>,
    ) -> ModelResult<FieldValue> {
        let related = self.manager.related(target());
        match wire {
            None | Some(Value::Null) if field.is_blank() => Ok(FieldValue::Null),
            None | Some(Value::Null) => Err(ModelError::NoData {
                entity: self.schema().name(),
                field: field.name().to_string(),
            }),
            Some(Value::Array(items)) if many => Ok(FieldValue::Entities(
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|obj| related.from_raw(obj.clone()))
                    .collect(),
            )),
            Some(Value::Object(obj)) if !many => Ok(related.from_raw(obj.clone()).into()),
            Some(other) => Err(ModelError::invalid(field.name(), "nested object", other)),
        }
    }

    /// Wire value of `attr`, if set.
    fn attr_value(&self, attr: &str) -> Option<Value> {
        let field = self.schema().field(attr)?;
        raw::lookup(&self.raw, &field.wire_path())
            .filter(|v| !v.is_null())
            .cloned()
    }

    // Writes a wire value without going through the field's encode step.
    // Used for values that are already in wire form.
    pub(crate) fn seed(&mut self, attr: &str, value: Value, dirty: bool) {
        let Some(field) = self.schema().field(attr) else {
            return;
        };
        let path = field.wire_path();
        raw::write(&mut self.raw, &path, value);
        self.invalidate(&path);
        if dirty {
            self.dirty.insert(path);
        }
    }

    // ── Writing ──────────────────────────────────────────────────

    /// Assigns an attribute.
    ///
    /// The value is encoded immediately. The wire path is marked dirty only
    /// when the encoded value differs from what is stored.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> ModelResult<()> {
        self.ensure_live()?;
        let field = self.field(name)?;
        let value = value.into();
        if !field.is_writable() {
            warn!(
                entity = self.schema().name(),
                field = name,
                "rejected write to read-only field"
            );
            return Err(ModelError::ReadOnlyField {
                entity: self.schema().name(),
                field: name.to_string(),
            });
        }
        match field.kind() {
            FieldKind::Constant(_) => {
                debug!(
                    entity = self.schema().name(),
                    field = name,
                    "write to constant field ignored"
                );
            }
            FieldKind::Link(spec) => self.set_link(field, spec, value)?,
            FieldKind::ManyLink(_) => self.set_many_link(field, value)?,
            FieldKind::EmbeddedLink(target) => self.set_embedded_link(field, *target, value)?,
            FieldKind::Custom(decl) => {
                let schema = self.manager.custom_fields()?;
                let def = schema.resolve(decl)?;
                let path = field.wire_path();
                let container = decl.write(def, raw::lookup(&self.raw, &path), &value)?;
                self.write_wire(path, container);
            }
            FieldKind::NoteParam { note_type } => {
                let encoded = field.encode(&value)?;
                self.write_wire(vec!["note_type".to_string()], Value::from(*note_type));
                self.write_wire(field.wire_path(), encoded);
            }
            _ => {
                let encoded = field.encode(&value)?;
                self.write_wire(field.wire_path(), encoded);
            }
        }
        Ok(())
    }

    /// [`Entity::set`] for chaining on construction.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> ModelResult<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    fn write_wire(&mut self, path: WirePath, value: Value) -> bool {
        let current = raw::lookup(&self.raw, &path);
        if current == Some(&value) || (value.is_null() && current.is_none()) {
            return false;
        }
        raw::write(&mut self.raw, &path, value);
        self.invalidate(&path);
        self.dirty.insert(path);
        true
    }

    // Drops cached values of every field reading from the same top-level key,
    // including links that carry it as a side channel.
    fn invalidate(&mut self, path: &[String]) {
        let Some(head) = path.first() else {
            return;
        };
        let schema = self.schema();
        self.cache.retain(|name, _| {
            let Some(field) = schema.field(name) else {
                return false;
            };
            let reads_head = field.wire_path().first() == Some(head);
            let carries_head = match field.kind() {
                FieldKind::Link(spec) | FieldKind::ManyLink(spec) => {
                    spec.side_channels.iter().any(|(_, key)| key == head)
                }
                _ => false,
            };
            !reads_head && !carries_head
        });
    }

    fn set_link(&mut self, field: &'static Field, spec: &LinkSpec, value: FieldValue) -> ModelResult<()> {
        let path = field.wire_path();
        match value {
            FieldValue::Entity(target) if target.id().is_none() => {
                for (attr, key) in &spec.side_channels {
                    if let Some(carried) = target.attr_value(attr) {
                        self.write_wire(vec![(*key).to_string()], carried);
                    }
                }
                self.write_wire(path, Value::Null);
                self.pending.insert(field.name(), *target);
                self.cache.remove(field.name());
            }
            FieldValue::Null => {
                self.pending.remove(field.name());
                self.write_wire(path, Value::Null);
                self.cache.remove(field.name());
            }
            other => {
                let id = other
                    .as_id()
                    .ok_or_else(|| ModelError::invalid(field.name(), "entity or id", &other))?;
                self.pending.remove(field.name());
                self.write_wire(path, id.to_json());
                self.cache.remove(field.name());
            }
        }
        Ok(())
    }

    fn set_many_link(&mut self, field: &'static Field, value: FieldValue) -> ModelResult<()> {
        let ids: Vec<Value> = match value {
            FieldValue::Null => {
                self.write_wire(field.wire_path(), Value::Null);
                return Ok(());
            }
            FieldValue::Ids(ids) => ids.into_iter().map(EntityId::to_json).collect(),
            FieldValue::Entities(entities) => entities
                .iter()
                .map(|e| e.require_id().map(EntityId::to_json))
                .collect::<ModelResult<_>>()?,
            FieldValue::Entity(entity) => vec![entity.require_id()?.to_json()],
            other => return Err(ModelError::invalid(field.name(), "list of ids", &other)),
        };
        self.write_wire(field.wire_path(), Value::Array(ids));
        Ok(())
    }

    // Embedded links live server-side: the change is a link call, and the
    // owner's own payload is updated without marking it dirty.
    fn set_embedded_link(
        &mut self,
        field: &'static Field,
        target: SchemaRef,
        value: FieldValue,
    ) -> ModelResult<()> {
        let owner = self.require_id()?;
        let path = field.wire_path();
        let related = self.manager.related(target());

        if value.is_null() {
            for current in self.embedded_stubs(target, raw::lookup(&self.raw, &path)) {
                let id = current.require_id()?;
                self.manager
                    .unlink(owner, &LinkTarget::new(id, related.collection()))?;
            }
            raw::write(&mut self.raw, &path, Value::Array(Vec::new()));
            self.invalidate(&path);
            return Ok(());
        }

        let mut linked = match value {
            FieldValue::Entity(entity) => *entity,
            other => {
                let id = other
                    .as_id()
                    .ok_or_else(|| ModelError::invalid(field.name(), "entity or id", &other))?;
                related.proxy(id)
            }
        };
        if linked.id().is_none() {
            linked.save()?;
        }
        let linked_id = linked.require_id()?;
        self.manager.link(
            owner,
            &LinkTarget::new(linked_id, linked.manager().collection()),
        )?;
        raw::write(&mut self.raw, &path, json!([{ "id": linked_id }]));
        self.invalidate(&path);
        Ok(())
    }

    /// Applies `change` to the id list of an embedded field without marking
    /// anything dirty.
    pub(crate) fn update_embedded(&mut self, field: &Field, change: impl FnOnce(&mut Vec<Value>)) {
        let path = field.wire_path();
        let mut items = raw::lookup(&self.raw, &path)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        change(&mut items);
        raw::write(&mut self.raw, &path, Value::Array(items));
        self.invalidate(&path);
    }

    /// Mutable view of an embedded link list. `append` and `remove` on the
    /// view issue link calls immediately.
    pub fn linked(&mut self, name: &str) -> ModelResult<LinkedEntities<'_>> {
        self.ensure_live()?;
        let field = self.field(name)?;
        let FieldKind::EmbeddedList(target) = field.kind() else {
            return Err(ModelError::Unsupported {
                operation: "linked",
                entity: self.schema().name(),
            });
        };
        if !raw::is_present(&self.raw, &field.wire_path()) && self.should_fetch(field) {
            self.fetch_on_miss(field)?;
        }
        let related = self.manager.related(target());
        Ok(LinkedEntities::new(self, field, related))
    }

    // ── Persistence ──────────────────────────────────────────────

    /// Creates the record, or sends the changed fields of a persisted one.
    pub fn save(&mut self) -> ModelResult<()> {
        self.save_with(false)
    }

    /// Like [`Entity::save`]. With `update_if_exists`, a new entity first
    /// looks for a record with the same main field value and updates it
    /// instead of creating a duplicate.
    ///
    /// On failure the entity is left exactly as it was before the call.
    pub fn save_with(&mut self, update_if_exists: bool) -> ModelResult<()> {
        self.ensure_live()?;
        let before = self.clone();
        let result = self.persist(update_if_exists);
        if let Err(err) = &result {
            warn!(entity = self.schema().name(), error = %err, "save failed");
            *self = before;
        }
        result
    }

    fn persist(&mut self, update_if_exists: bool) -> ModelResult<()> {
        let unbound = self.id().is_none();
        if !unbound && !self.is_dirty() {
            return Ok(());
        }
        if unbound {
            self.validate_required()?;
        }
        self.resolve_links()?;

        let existing = match self.id() {
            Some(id) => Some(id),
            None if update_if_exists => self.find_existing()?,
            None => None,
        };
        self.stamp_timestamps(existing.is_none());

        let id = match existing {
            Some(id) => {
                // A new entity matched to an existing record carries all of
                // its data, not just the dirty paths.
                let payload = if unbound {
                    let mut full = self.raw.clone();
                    full.insert("id".into(), id.to_json());
                    full
                } else {
                    self.update_payload(id)
                };
                self.manager.update(id, &payload)?;
                id
            }
            None => {
                let created = self.manager.create(&self.raw)?;
                let id = created
                    .get("id")
                    .and_then(EntityId::from_json)
                    .ok_or_else(|| TransportError::Decode("create response has no id".into()))?;
                // Server-computed keys fill in; local values win.
                for (key, value) in created {
                    self.raw.entry(key).or_insert(value);
                }
                id
            }
        };
        self.raw.insert("id".into(), id.to_json());
        self.dirty.clear();
        self.cache.clear();
        self.pending.clear();
        self.missed.clear();
        info!(entity = self.schema().name(), %id, "saved");
        Ok(())
    }

    fn validate_required(&self) -> ModelResult<()> {
        for field in self.schema().fields().filter(|f| f.is_required()) {
            let present = self.pending.contains_key(field.name())
                || match field.kind() {
                    FieldKind::Custom(decl) => {
                        decl.is_set_in(raw::lookup(&self.raw, &field.wire_path()))
                    }
                    _ => raw::is_present(&self.raw, &field.wire_path()),
                };
            if !present {
                return Err(ModelError::RequiredField {
                    entity: self.schema().name(),
                    field: field.name().to_string(),
                });
            }
        }
        Ok(())
    }

    // Auto-created link targets are looked up by main field or created, so
    // the owner can carry their ids.
    fn resolve_links(&mut self) -> ModelResult<()> {
        let pending = std::mem::take(&mut self.pending);
        for (name, mut target) in pending {
            let auto = self.schema().field(name).and_then(|field| match field.kind() {
                FieldKind::Link(spec) if spec.auto_created => Some(field),
                _ => None,
            });
            let Some(field) = auto else {
                self.pending.insert(name, target);
                continue;
            };
            target.save_with(true)?;
            let id = target.require_id()?;
            self.write_wire(field.wire_path(), id.to_json());
        }
        Ok(())
    }

    fn find_existing(&self) -> ModelResult<Option<EntityId>> {
        let Some(value) = self.display() else {
            return Ok(None);
        };
        Ok(self
            .manager
            .find_by_main_field(&value)?
            .and_then(|found| found.id()))
    }

    fn stamp_timestamps(&mut self, creating: bool) {
        let Some(stamps) = self.schema().timestamps() else {
            return;
        };
        let now = EpochSeconds::now();
        if creating && !raw::is_present(&self.raw, &[stamps.created]) {
            self.write_wire(vec![stamps.created.to_string()], now.to_json());
        }
        let previous = self
            .raw
            .get(stamps.modified)
            .and_then(|v| EpochSeconds::from_json(v).ok().flatten());
        let next = EpochSeconds::advance(previous, now);
        self.write_wire(vec![stamps.modified.to_string()], next.to_json());
    }

    /// Changed paths plus required fields, plus the id.
    fn update_payload(&self, id: EntityId) -> RawData {
        let mut payload = RawData::new();
        let required = self
            .schema()
            .fields()
            .filter(|f| f.is_required())
            .map(Field::wire_path);
        for path in self.dirty.iter().cloned().chain(required) {
            if let Some(sub) = raw::subtree(&self.raw, &path) {
                raw::merge(&mut payload, sub);
            }
        }
        payload.insert("id".into(), id.to_json());
        payload
    }

    /// Deletes the remote record. The instance is unusable afterwards.
    pub fn delete(&mut self) -> ModelResult<()> {
        self.ensure_live()?;
        let id = self.require_id()?;
        self.manager.delete(id)?;
        self.deleted = true;
        info!(entity = self.schema().name(), %id, "deleted");
        Ok(())
    }

    /// Replaces all local state with a fresh copy of the record. Local
    /// changes are discarded.
    pub fn refresh(&mut self) -> ModelResult<()> {
        self.ensure_live()?;
        let id = self.require_id()?;
        self.raw = self.manager.fetch_raw(id)?;
        self.loaded = true;
        self.dirty.clear();
        self.cache.clear();
        self.missed.clear();
        self.pending.clear();
        Ok(())
    }

    /// A new unsaved entity with the same data, minus identity and creation
    /// stamp. Every copied key is dirty, so saving it creates a new record.
    pub fn get_copy(&self) -> Entity {
        let mut raw = self.raw.clone();
        raw.remove("id");
        raw.remove(LEGACY_CREATED_KEY);
        if let Some(stamps) = self.schema().timestamps() {
            raw.remove(stamps.created);
        }
        let mut copy = Entity::new(self.manager.clone(), raw, false);
        copy.dirty = copy.raw.keys().map(|k| vec![k.clone()]).collect();
        copy.pending = self.pending.clone();
        copy
    }

    /// True when both sides carry the same id. No display-field fallback.
    pub fn same_record(&self, other: &Entity) -> bool {
        self.schema().name() == other.schema().name()
            && matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

/// Identity by id. Two unsaved entities compare by main field value.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        if self.schema().name() != other.schema().name() {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => matches!((self.display(), other.display()), (Some(a), Some(b)) if a == b),
            _ => false,
        }
    }
}

/// Convenience comparison against the main field value.
impl PartialEq<str> for Entity {
    fn eq(&self, other: &str) -> bool {
        self.display().as_deref() == Some(other)
    }
}

impl PartialEq<&str> for Entity {
    fn eq(&self, other: &&str) -> bool {
        self.display().as_deref() == Some(*other)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.schema().name())
            .field("id", &self.id())
            .field("loaded", &self.loaded)
            .field("dirty", &self.dirty_fields())
            .field("raw", &self.raw)
            .finish()
    }
}
