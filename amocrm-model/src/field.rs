//! Field descriptors.
//!
//! A [`Field`] maps one entity attribute to a location in the wire data and
//! knows how to convert between the wire form and a [`FieldValue`]. Fields
//! are declared once per entity type (see [`EntitySchema`](crate::EntitySchema))
//! and shared by every instance.
//!
//! Scalar kinds are decoded and encoded here. Kinds that need the owning
//! entity or the network (links, custom fields, nested objects) are handled
//! by [`Entity`](crate::Entity).

use amocrm_types::EpochSeconds;
use serde_json::Value;

use crate::custom_field::CustomField;
use crate::error::{ModelError, ModelResult};
use crate::raw::{self, WirePath};
use crate::schema::SchemaRef;
use crate::value::FieldValue;

/// Delimiter used when tag names travel as one string.
pub const TAG_DELIMITER: &str = ", ";

/// Wire key holding every custom-field value of a record.
pub const CUSTOM_FIELDS_KEY: &str = "custom_fields_values";

/// Key under which the API nests related records.
pub const EMBEDDED_KEY: &str = "_embedded";

/// How a relation to another entity type is stored and resolved.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub target: SchemaRef,
    /// `(target attribute, owner wire key)` pairs carried alongside the id.
    pub side_channels: Vec<(&'static str, &'static str)>,
    /// Save resolves or creates the target before the owner.
    pub auto_created: bool,
}

impl LinkSpec {
    fn new(target: SchemaRef) -> Self {
        Self {
            target,
            side_channels: Vec::new(),
            auto_created: false,
        }
    }
}

/// The mapping rule of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Value passed through as-is.
    Plain,
    /// Server-assigned; writes fail.
    ReadOnly,
    /// Always the given value; writes are ignored.
    Constant(Value),
    /// Epoch seconds on the wire, UTC datetime in code.
    DateTime { read_only: bool },
    /// `"1"`/`"0"`, `1`/`0` or native bool on the wire.
    Boolean,
    /// Tag names, either joined into one string or as a list of
    /// `{"name": ...}` objects.
    Tags { joined: bool },
    /// Foreign id of one related record.
    Link(LinkSpec),
    /// List of foreign ids.
    ManyLink(LinkSpec),
    /// One related record under `_embedded`, changed through link calls.
    EmbeddedLink(SchemaRef),
    /// Related records under `_embedded`, changed through link calls.
    EmbeddedList(SchemaRef),
    /// Read-only nested object (or list of them) decoded as entities.
    Object { target: SchemaRef, many: bool },
    /// Per-account custom field.
    Custom(CustomField),
    /// Type-specific note parameter; writing it stamps `note_type`.
    NoteParam { note_type: &'static str },
}

/// One mapped attribute of an entity type.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    key: &'static str,
    path: &'static [&'static str],
    blank: bool,
    required: bool,
    kind: FieldKind,
}

impl Field {
    fn simple(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            key: name,
            path: &[],
            blank: false,
            required: false,
            kind,
        }
    }

    /// Read/write pass-through field.
    pub fn plain(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Plain)
    }

    /// Server-assigned field.
    pub fn read_only(name: &'static str) -> Self {
        Self::simple(name, FieldKind::ReadOnly)
    }

    /// Discriminator that always reads as `value`.
    pub fn constant(name: &'static str, value: impl Into<Value>) -> Self {
        Self::simple(name, FieldKind::Constant(value.into())).blank()
    }

    pub fn datetime(name: &'static str) -> Self {
        Self::simple(name, FieldKind::DateTime { read_only: false })
    }

    pub fn read_only_datetime(name: &'static str) -> Self {
        Self::simple(name, FieldKind::DateTime { read_only: true })
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Boolean)
    }

    /// Tags stored as one delimiter-joined string.
    pub fn tags(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Tags { joined: true }).blank()
    }

    /// Tags stored as `_embedded.tags`, a list of `{"name": ...}` objects.
    pub fn tag_list(name: &'static str) -> Self {
        Self::simple(name, FieldKind::Tags { joined: false })
            .key("tags")
            .at(&[EMBEDDED_KEY])
            .blank()
    }

    /// Foreign id stored under `key`.
    pub fn link(name: &'static str, key: &'static str, target: SchemaRef) -> Self {
        Self::simple(name, FieldKind::Link(LinkSpec::new(target)))
            .key(key)
            .blank()
    }

    /// List of foreign ids stored under `key`.
    pub fn many_link(name: &'static str, key: &'static str, target: SchemaRef) -> Self {
        Self::simple(name, FieldKind::ManyLink(LinkSpec::new(target)))
            .key(key)
            .blank()
    }

    /// Single related record at `_embedded.<key>`.
    pub fn embedded_link(name: &'static str, key: &'static str, target: SchemaRef) -> Self {
        Self::simple(name, FieldKind::EmbeddedLink(target))
            .key(key)
            .at(&[EMBEDDED_KEY])
            .blank()
    }

    /// Related records at `_embedded.<key>`.
    pub fn embedded_list(name: &'static str, key: &'static str, target: SchemaRef) -> Self {
        Self::simple(name, FieldKind::EmbeddedList(target))
            .key(key)
            .at(&[EMBEDDED_KEY])
            .blank()
    }

    /// Nested object decoded as a loaded entity of `target`.
    pub fn object(name: &'static str, target: SchemaRef, many: bool) -> Self {
        Self::simple(name, FieldKind::Object { target, many })
    }

    pub fn custom(name: &'static str, declaration: CustomField) -> Self {
        Self::simple(name, FieldKind::Custom(declaration)).blank()
    }

    /// Note parameter at `params.<name>` belonging to `note_type`.
    pub fn note_param(name: &'static str, note_type: &'static str) -> Self {
        Self::simple(name, FieldKind::NoteParam { note_type })
            .at(&["params"])
            .blank()
    }

    /// Overrides the wire key (defaults to the attribute name).
    pub fn key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    /// Places the field inside nested objects.
    pub fn at(mut self, path: &'static [&'static str]) -> Self {
        self.path = path;
        self
    }

    /// A missing wire value is a legitimate absence.
    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Must be set before a new record is created.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares an owner wire key that carries a target attribute inline.
    /// Only meaningful on link fields.
    pub fn side_channel(mut self, target_attr: &'static str, owner_key: &'static str) -> Self {
        if let FieldKind::Link(spec) | FieldKind::ManyLink(spec) = &mut self.kind {
            spec.side_channels.push((target_attr, owner_key));
        }
        self
    }

    /// Save resolves or creates the target first. Only meaningful on links.
    pub fn auto_created(mut self) -> Self {
        if let FieldKind::Link(spec) | FieldKind::ManyLink(spec) = &mut self.kind {
            spec.auto_created = true;
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wire_key(&self) -> &'static str {
        self.key
    }

    pub fn path(&self) -> &'static [&'static str] {
        self.path
    }

    pub fn is_blank(&self) -> bool {
        self.blank
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// True for fields living under `_embedded`.
    pub fn is_embedded(&self) -> bool {
        self.path.first() == Some(&EMBEDDED_KEY)
    }

    /// Whether `Entity::set` accepts this field at all.
    pub fn is_writable(&self) -> bool {
        !matches!(
            self.kind,
            FieldKind::ReadOnly
                | FieldKind::DateTime { read_only: true }
                | FieldKind::Object { .. }
                | FieldKind::EmbeddedList(_)
        )
    }

    /// Where the field's value lives in the wire data. Custom fields all
    /// share one container and therefore one path.
    pub fn wire_path(&self) -> WirePath {
        match self.kind {
            FieldKind::Custom(_) => vec![CUSTOM_FIELDS_KEY.to_string()],
            _ => raw::wire_path(self.path, self.key),
        }
    }

    /// Decodes a scalar wire value.
    ///
    /// `None` and `null` are both "absent". Absence on a non-blank field is
    /// [`ModelError::NoData`], except for datetimes, which may legitimately
    /// not exist yet on a new record.
    pub fn decode(&self, entity: &'static str, wire: Option<&Value>) -> ModelResult<FieldValue> {
        if let FieldKind::Constant(value) = &self.kind {
            return Ok(FieldValue::from_json(value));
        }
        let value = match wire {
            None | Some(Value::Null) => {
                return match self.kind {
                    FieldKind::DateTime { .. } => Ok(FieldValue::Null),
                    _ if self.blank => Ok(FieldValue::Null),
                    _ => Err(ModelError::NoData {
                        entity,
                        field: self.name.to_string(),
                    }),
                };
            }
            Some(value) => value,
        };
        match &self.kind {
            FieldKind::DateTime { .. } => {
                let secs = EpochSeconds::from_json(value)
                    .map_err(|_| ModelError::invalid(self.name, "epoch seconds", value))?;
                Ok(secs
                    .and_then(EpochSeconds::to_datetime)
                    .map_or(FieldValue::Null, FieldValue::DateTime))
            }
            FieldKind::Boolean => decode_bool(value)
                .map(FieldValue::Bool)
                .ok_or_else(|| ModelError::invalid(self.name, "\"1\"/\"0\" or bool", value)),
            FieldKind::Tags { .. } => decode_tags(value)
                .map(FieldValue::Tags)
                .ok_or_else(|| ModelError::invalid(self.name, "tag string or list", value)),
            _ => Ok(FieldValue::from_json(value)),
        }
    }

    /// Encodes a value for a scalar field.
    pub fn encode(&self, value: &FieldValue) -> ModelResult<Value> {
        match &self.kind {
            FieldKind::Constant(constant) => Ok(constant.clone()),
            FieldKind::DateTime { .. } => match value {
                FieldValue::Null => Ok(Value::Null),
                FieldValue::DateTime(dt) => Ok(EpochSeconds::from_datetime(dt).to_json()),
                FieldValue::Date(d) => Ok(EpochSeconds::from_date(*d).to_json()),
                FieldValue::Int(secs) => Ok(Value::from(*secs)),
                other => Err(ModelError::invalid(self.name, "datetime", other)),
            },
            FieldKind::Boolean => match value {
                FieldValue::Null => Ok(Value::Null),
                FieldValue::Bool(b) => Ok(Value::Bool(*b)),
                other => decode_bool(&other.to_json())
                    .map(Value::Bool)
                    .ok_or_else(|| ModelError::invalid(self.name, "bool", other)),
            },
            FieldKind::Tags { joined } => {
                let tags: Vec<String> = match value {
                    FieldValue::Null => return Ok(Value::Null),
                    FieldValue::Tags(tags) => tags.clone(),
                    FieldValue::Text(s) => split_tags(s),
                    other => return Err(ModelError::invalid(self.name, "tags", other)),
                };
                if *joined {
                    Ok(Value::String(tags.join(TAG_DELIMITER)))
                } else {
                    Ok(tags
                        .into_iter()
                        .map(|name| serde_json::json!({ "name": name }))
                        .collect())
                }
            }
            _ => Ok(value.to_json()),
        }
    }
}

fn decode_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.as_str() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Older API versions join names into one string, newer ones send objects.
fn decode_tags(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(split_tags(s)),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
