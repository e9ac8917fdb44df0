//! Transport abstraction.
//!
//! The mapping layer talks to the remote API only through [`Transport`].
//! Implementations own connection handling, authentication, pagination
//! mechanics and retries; this crate never retries a failed call.

use amocrm_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::custom_field::CustomFieldDef;
use crate::error::TransportResult;
use crate::filter::ListQuery;
use crate::raw::RawData;

/// One page of a collection listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawData>,
    /// The server advertised a following page.
    pub has_next: bool,
}

/// Body of a link or unlink call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub to_entity_id: EntityId,
    /// Collection of the target, e.g. `"companies"`.
    pub to_entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl LinkTarget {
    pub fn new(to_entity_id: EntityId, to_entity_type: impl Into<String>) -> Self {
        Self {
            to_entity_id,
            to_entity_type: to_entity_type.into(),
            metadata: None,
        }
    }

    /// Marks the link as the target's main one (e.g. main contact of a lead).
    pub fn main(mut self) -> Self {
        let mut metadata = match self.metadata.take() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        metadata.insert("main".into(), json!(true));
        self.metadata = Some(Value::Object(metadata));
        self
    }
}

/// Remote collection access used by managers and entities.
///
/// `collection` is an API path relative to the API root: `"contacts"`,
/// `"leads/pipelines"`, `"contacts/12/notes"`.
pub trait Transport: Send + Sync {
    /// Fetches one record. `Ok(None)` when it does not exist.
    fn get(&self, collection: &str, id: EntityId, include: &[String]) -> TransportResult<Option<RawData>>;

    /// Fetches one page of records.
    fn list(&self, collection: &str, query: &ListQuery) -> TransportResult<Page>;

    /// Creates a record and returns the server's view of it, id included.
    fn create(&self, collection: &str, data: &RawData) -> TransportResult<RawData>;

    /// Applies a partial update.
    fn update(&self, collection: &str, id: EntityId, diff: &RawData) -> TransportResult<RawData>;

    fn delete(&self, collection: &str, id: EntityId) -> TransportResult<()>;

    /// The account's custom-field schema for a collection.
    fn custom_fields(&self, collection: &str) -> TransportResult<Vec<CustomFieldDef>>;

    /// Links record `id` of `collection` to `target`.
    fn link(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()>;

    fn unlink(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()>;
}

/// An in-memory transport for testing.
pub mod mock {
    use super::*;
    use crate::error::TransportError;
    use crate::filter::{Filter, MAX_LIMIT};
    use crate::raw;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// A call received by [`MockTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Get { collection: String, id: EntityId },
        List { collection: String, query: ListQuery },
        Create { collection: String, data: RawData },
        Update { collection: String, id: EntityId, diff: RawData },
        Delete { collection: String, id: EntityId },
        CustomFields { collection: String },
        Link { collection: String, id: EntityId, target: LinkTarget },
        Unlink { collection: String, id: EntityId, target: LinkTarget },
    }

    impl Call {
        /// True for calls that change remote state.
        pub fn is_write(&self) -> bool {
            matches!(
                self,
                Self::Create { .. }
                    | Self::Update { .. }
                    | Self::Delete { .. }
                    | Self::Link { .. }
                    | Self::Unlink { .. }
            )
        }

        pub fn collection(&self) -> &str {
            match self {
                Self::Get { collection, .. }
                | Self::List { collection, .. }
                | Self::Create { collection, .. }
                | Self::Update { collection, .. }
                | Self::Delete { collection, .. }
                | Self::CustomFields { collection }
                | Self::Link { collection, .. }
                | Self::Unlink { collection, .. } => collection,
            }
        }
    }

    #[derive(Debug, Default)]
    struct MockState {
        records: BTreeMap<String, BTreeMap<EntityId, RawData>>,
        custom_fields: HashMap<String, Vec<CustomFieldDef>>,
        calls: Vec<Call>,
        last_id: u64,
        page_size: Option<usize>,
        failure: Option<TransportError>,
    }

    impl MockState {
        fn fail(&mut self) -> TransportResult<()> {
            match self.failure.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn record_mut(&mut self, collection: &str, id: EntityId) -> TransportResult<&mut RawData> {
            self.records
                .get_mut(collection)
                .and_then(|records| records.get_mut(&id))
                .ok_or_else(|| TransportError::Status {
                    status: 404,
                    body: format!("{collection}/{id}"),
                })
        }
    }

    /// In-memory collections with a call log.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        state: Mutex<MockState>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Caps every page at `size` records regardless of the query limit.
        pub fn with_page_size(self, size: usize) -> Self {
            self.state().page_size = Some(size.max(1));
            self
        }

        fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Seeds a record. Uses its `id` if present, else assigns one.
        pub fn insert(&self, collection: &str, record: Value) -> EntityId {
            let mut state = self.state();
            let mut data = match record {
                Value::Object(map) => map,
                _ => RawData::new(),
            };
            let id = match data.get("id").and_then(EntityId::from_json) {
                Some(id) => {
                    state.last_id = state.last_id.max(id.get());
                    id
                }
                None => {
                    state.last_id += 1;
                    EntityId::new(state.last_id)
                }
            };
            data.insert("id".into(), id.to_json());
            state
                .records
                .entry(collection.to_string())
                .or_default()
                .insert(id, data);
            id
        }

        /// Current stored state of a record.
        pub fn record(&self, collection: &str, id: EntityId) -> Option<RawData> {
            self.state()
                .records
                .get(collection)
                .and_then(|records| records.get(&id))
                .cloned()
        }

        pub fn records(&self, collection: &str) -> Vec<RawData> {
            self.state()
                .records
                .get(collection)
                .map(|records| records.values().cloned().collect())
                .unwrap_or_default()
        }

        pub fn set_custom_fields(&self, collection: &str, fields: Vec<CustomFieldDef>) {
            self.state()
                .custom_fields
                .insert(collection.to_string(), fields);
        }

        /// Makes the next call fail with `error`.
        pub fn fail_next(&self, error: TransportError) {
            self.state().failure = Some(error);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state().calls.clone()
        }

        pub fn clear_calls(&self) {
            self.state().calls.clear();
        }

        pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
            self.state().calls.iter().filter(|c| predicate(c)).count()
        }

        /// Number of single-record fetches.
        pub fn gets(&self) -> usize {
            self.count(|c| matches!(c, Call::Get { .. }))
        }

        /// Number of calls that changed remote state.
        pub fn writes(&self) -> usize {
            self.count(Call::is_write)
        }
    }

    fn text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn matches_filter(record: &RawData, filter: &Filter) -> bool {
        let actual = record.get(filter.name()).and_then(text);
        match filter {
            Filter::Single { value, .. } | Filter::SingleList { value, .. } => {
                actual.as_deref() == Some(value.as_str())
            }
            Filter::Multi { values, .. } => actual.is_some_and(|a| values.contains(&a)),
            Filter::Range { from, to, .. } => {
                let parse = |s: &str| s.parse::<f64>().ok();
                match (actual.as_deref().and_then(parse), parse(from), parse(to)) {
                    (Some(a), Some(lo), Some(hi)) => a >= lo && a <= hi,
                    _ => false,
                }
            }
        }
    }

    fn matches_query(record: &RawData, query: &str) -> bool {
        let needle = query.to_lowercase();
        record
            .values()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(&needle))
    }

    impl Transport for MockTransport {
        fn get(&self, collection: &str, id: EntityId, _include: &[String]) -> TransportResult<Option<RawData>> {
            let mut state = self.state();
            state.calls.push(Call::Get {
                collection: collection.to_string(),
                id,
            });
            state.fail()?;
            Ok(state
                .records
                .get(collection)
                .and_then(|records| records.get(&id))
                .cloned())
        }

        fn list(&self, collection: &str, query: &ListQuery) -> TransportResult<Page> {
            let mut state = self.state();
            state.calls.push(Call::List {
                collection: collection.to_string(),
                query: query.clone(),
            });
            state.fail()?;
            let matching: Vec<RawData> = state
                .records
                .get(collection)
                .map(|records| {
                    records
                        .values()
                        .filter(|r| query.query.as_deref().is_none_or(|q| matches_query(r, q)))
                        .filter(|r| query.filters.iter().all(|f| matches_filter(r, f)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            let size = state
                .page_size
                .unwrap_or(MAX_LIMIT as usize)
                .min(query.limit.max(1) as usize);
            let skip = (query.page.max(1) as usize - 1) * size;
            let items: Vec<RawData> = matching.iter().skip(skip).take(size).cloned().collect();
            Ok(Page {
                has_next: matching.len() > skip + size,
                items,
            })
        }

        fn create(&self, collection: &str, data: &RawData) -> TransportResult<RawData> {
            let mut state = self.state();
            state.calls.push(Call::Create {
                collection: collection.to_string(),
                data: data.clone(),
            });
            state.fail()?;
            state.last_id += 1;
            let id = EntityId::new(state.last_id);
            let mut stored = data.clone();
            stored.insert("id".into(), id.to_json());
            state
                .records
                .entry(collection.to_string())
                .or_default()
                .insert(id, stored.clone());
            Ok(stored)
        }

        fn update(&self, collection: &str, id: EntityId, diff: &RawData) -> TransportResult<RawData> {
            let mut state = self.state();
            state.calls.push(Call::Update {
                collection: collection.to_string(),
                id,
                diff: diff.clone(),
            });
            state.fail()?;
            let record = state.record_mut(collection, id)?;
            raw::merge(record, diff.clone());
            Ok(record.clone())
        }

        fn delete(&self, collection: &str, id: EntityId) -> TransportResult<()> {
            let mut state = self.state();
            state.calls.push(Call::Delete {
                collection: collection.to_string(),
                id,
            });
            state.fail()?;
            state.record_mut(collection, id)?;
            if let Some(records) = state.records.get_mut(collection) {
                records.remove(&id);
            }
            Ok(())
        }

        fn custom_fields(&self, collection: &str) -> TransportResult<Vec<CustomFieldDef>> {
            let mut state = self.state();
            state.calls.push(Call::CustomFields {
                collection: collection.to_string(),
            });
            state.fail()?;
            Ok(state.custom_fields.get(collection).cloned().unwrap_or_default())
        }

        fn link(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()> {
            let mut state = self.state();
            state.calls.push(Call::Link {
                collection: collection.to_string(),
                id,
                target: target.clone(),
            });
            state.fail()?;
            let record = state.record_mut(collection, id)?;
            let path = ["_embedded", target.to_entity_type.as_str()];
            let mut linked = raw::lookup(record, &path)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let entry = json!({ "id": target.to_entity_id });
            if !linked.contains(&entry) {
                linked.push(entry);
            }
            raw::write(record, &path, Value::Array(linked));
            Ok(())
        }

        fn unlink(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()> {
            let mut state = self.state();
            state.calls.push(Call::Unlink {
                collection: collection.to_string(),
                id,
                target: target.clone(),
            });
            state.fail()?;
            let record = state.record_mut(collection, id)?;
            let path = ["_embedded", target.to_entity_type.as_str()];
            if let Some(Value::Array(linked)) = raw::remove(record, &path) {
                let kept: Vec<Value> = linked
                    .into_iter()
                    .filter(|v| v.get("id").and_then(EntityId::from_json) != Some(target.to_entity_id))
                    .collect();
                raw::write(record, &path, Value::Array(kept));
            }
            Ok(())
        }
    }
}
