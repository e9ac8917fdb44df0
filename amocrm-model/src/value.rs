//! Decoded attribute values.

use amocrm_types::{EntityId, EpochSeconds};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Entity;

/// One option of a select, radio or multiselect custom field.
///
/// The enum id is kept next to the text because the server needs it to
/// store the value unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    pub id: Option<u64>,
    pub value: String,
}

impl Choice {
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            value: value.into(),
        }
    }

    /// A choice known only by its text; the id is resolved on encode.
    pub fn named(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
        }
    }
}

/// The domain value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Id(EntityId),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Tags(Vec<String>),
    Choice(Choice),
    Choices(Vec<Choice>),
    Ids(Vec<EntityId>),
    Entity(Box<Entity>),
    Entities(Vec<Entity>),
    Json(Value),
}

impl FieldValue {
    /// Generic JSON to value conversion used by plain fields.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Json(value.clone()), Self::Float),
            },
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Json(other.clone()),
        }
    }

    /// Generic value to JSON conversion used by plain fields.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Text(s) => Value::String(s.clone()),
            Self::Id(id) => id.to_json(),
            Self::DateTime(dt) => EpochSeconds::from_datetime(dt).to_json(),
            Self::Date(d) => EpochSeconds::from_date(*d).to_json(),
            Self::Tags(tags) => Value::from(tags.clone()),
            Self::Choice(c) => Value::String(c.value.clone()),
            Self::Choices(cs) => cs.iter().map(|c| Value::String(c.value.clone())).collect(),
            Self::Ids(ids) => ids.iter().map(|id| id.to_json()).collect(),
            Self::Entity(e) => e.id().map_or(Value::Null, EntityId::to_json),
            Self::Entities(es) => es
                .iter()
                .map(|e| e.id().map_or(Value::Null, EntityId::to_json))
                .collect(),
            Self::Json(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Id(_) => "id",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Tags(_) => "tags",
            Self::Choice(_) => "choice",
            Self::Choices(_) => "choices",
            Self::Ids(_) => "ids",
            Self::Entity(_) => "entity",
            Self::Entities(_) => "entities",
            Self::Json(_) => "json",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Choice(c) => Some(&c.value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Id(id) => i64::try_from(id.get()).ok(),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Interprets the value as a reference to a record.
    pub fn as_id(&self) -> Option<EntityId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Int(i) => EntityId::try_from(*i).ok(),
            Self::Text(s) => s.parse().ok(),
            Self::Entity(e) => e.id(),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            Self::Tags(tags) => Some(tags),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&Choice> {
        match self {
            Self::Choice(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[Choice]> {
        match self {
            Self::Choices(cs) => Some(cs),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[EntityId]> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_entities(&self) -> Option<&[Entity]> {
        match self {
            Self::Entities(es) => Some(es),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            Self::Choice(c) => Some(c.value),
            _ => None,
        }
    }

    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(e) => Some(*e),
            _ => None,
        }
    }

    pub fn into_entities(self) -> Option<Vec<Entity>> {
        match self {
            Self::Entities(es) => Some(es),
            Self::Entity(e) => Some(vec![*e]),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<EntityId> for FieldValue {
    fn from(value: EntityId) -> Self {
        Self::Id(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Tags(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::Tags(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Choice> for FieldValue {
    fn from(value: Choice) -> Self {
        Self::Choice(value)
    }
}

impl From<Vec<Choice>> for FieldValue {
    fn from(value: Vec<Choice>) -> Self {
        Self::Choices(value)
    }
}

impl From<Vec<EntityId>> for FieldValue {
    fn from(value: Vec<EntityId>) -> Self {
        Self::Ids(value)
    }
}

impl From<Entity> for FieldValue {
    fn from(value: Entity) -> Self {
        Self::Entity(Box::new(value))
    }
}

impl From<Vec<Entity>> for FieldValue {
    fn from(value: Vec<Entity>) -> Self {
        Self::Entities(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
