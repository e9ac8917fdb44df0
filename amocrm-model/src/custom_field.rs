//! Per-account custom fields.
//!
//! Each account defines its own custom fields. Entity types declare them by
//! name or stable code ([`CustomField`]); the account schema
//! ([`CustomFieldSchema`]) supplies the id, type and enum table at runtime.
//!
//! All values of a record share one wire container:
//!
//! ```json
//! "custom_fields_values": [
//!   {"field_id": 3, "field_name": "Phone", "field_code": "PHONE",
//!    "values": [{"value": "+1", "enum_code": "WORK"}]}
//! ]
//! ```

use amocrm_types::EpochSeconds;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ModelError, ModelResult};
use crate::value::{Choice, FieldValue};

/// Sub-kind used by multi-value fields when none is declared.
pub const DEFAULT_SUB_KIND: &str = "WORK";

/// Server-side type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomFieldType {
    Text,
    Numeric,
    Checkbox,
    Select,
    Multiselect,
    Date,
    Url,
    Textarea,
    Radiobutton,
    Streetaddress,
    DateTime,
    Birthday,
    /// Composite multi-value field (phones, emails), one entry per sub-kind.
    Multitext,
    /// Types this client treats as text.
    #[serde(other)]
    Other,
}

/// One entry of a choice field's enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: u64,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
}

/// A custom field as the account schema describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldDef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub enums: Option<Vec<EnumOption>>,
    #[serde(default)]
    pub sort: Option<i64>,
    #[serde(default)]
    pub is_api_only: bool,
}

impl CustomFieldDef {
    pub fn new(id: u64, name: impl Into<String>, field_type: CustomFieldType) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            field_type,
            enums: None,
            sort: None,
            is_api_only: false,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Adds enum options given as `(id, value)` pairs.
    pub fn with_enums<S: Into<String>>(mut self, options: impl IntoIterator<Item = (u64, S)>) -> Self {
        self.enums = Some(
            options
                .into_iter()
                .map(|(id, value)| EnumOption {
                    id,
                    value: value.into(),
                    sort: None,
                })
                .collect(),
        );
        self
    }

    fn options(&self) -> &[EnumOption] {
        self.enums.as_deref().unwrap_or(&[])
    }
}

/// The custom fields of one collection in one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFieldSchema {
    fields: Vec<CustomFieldDef>,
}

impl CustomFieldSchema {
    pub fn new(fields: Vec<CustomFieldDef>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomFieldDef> {
        self.fields.iter()
    }

    pub fn by_id(&self, id: u64) -> Option<&CustomFieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Binds a declaration to its schema entry.
    ///
    /// A pinned id wins. Otherwise an exact name match is tried first, then
    /// the declaration's code. No match is a hard error.
    pub fn resolve(&self, decl: &CustomField) -> ModelResult<&CustomFieldDef> {
        let found = match decl.field_id {
            Some(id) => self.by_id(id),
            None => self
                .fields
                .iter()
                .find(|f| f.name == decl.name)
                .or_else(|| {
                    let code = decl.code?;
                    self.fields.iter().find(|f| f.code.as_deref() == Some(code))
                }),
        };
        found.ok_or_else(|| ModelError::FieldNotInSchema {
            field: decl.label(),
        })
    }
}

/// Compile-time declaration of a custom field on an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    name: &'static str,
    code: Option<&'static str>,
    field_id: Option<u64>,
    sub_kind: Option<&'static str>,
}

impl CustomField {
    /// Declares a field by its display name.
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            code: None,
            field_id: None,
            sub_kind: None,
        }
    }

    /// Stable server code, used when the name does not match.
    pub const fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Pins the schema id; name and code are then only used for display.
    pub const fn id(mut self, field_id: u64) -> Self {
        self.field_id = Some(field_id);
        self
    }

    /// Binds a multi-value field to one sub-kind (`WORK`, `MOB`, ...).
    pub const fn sub_kind(mut self, enum_code: &'static str) -> Self {
        self.sub_kind = Some(enum_code);
        self
    }

    /// The account's phone field, one sub-kind of it.
    pub const fn phone(name: &'static str, sub_kind: &'static str) -> Self {
        Self::named(name).code("PHONE").sub_kind(sub_kind)
    }

    /// The account's email field, one sub-kind of it.
    pub const fn email(name: &'static str, sub_kind: &'static str) -> Self {
        Self::named(name).code("EMAIL").sub_kind(sub_kind)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_code(&self) -> Option<&'static str> {
        self.code
    }

    pub fn field_id(&self) -> Option<u64> {
        self.field_id
    }

    pub fn enum_code(&self) -> Option<&'static str> {
        self.sub_kind
    }

    fn label(&self) -> String {
        match (self.code, self.field_id) {
            (_, Some(id)) => format!("{} (id {id})", self.name),
            (Some(code), None) => format!("{} ({code})", self.name),
            (None, None) => self.name.to_string(),
        }
    }

    fn matches_entry(&self, def: &CustomFieldDef, entry: &Value) -> bool {
        if entry.get("field_id").and_then(Value::as_u64) == Some(def.id) {
            return true;
        }
        if entry.get("field_name").and_then(Value::as_str) == Some(self.name) {
            return true;
        }
        self.code
            .is_some_and(|code| entry.get("field_code").and_then(Value::as_str) == Some(code))
    }

    /// Whether the container holds a non-empty entry for this field.
    ///
    /// Matches on the pinned id, name or code only, so it needs no schema.
    pub fn is_set_in(&self, container: Option<&Value>) -> bool {
        let Some(entries) = container.and_then(Value::as_array) else {
            return false;
        };
        entries.iter().any(|entry| {
            let by_id = self.field_id.is_some()
                && entry.get("field_id").and_then(Value::as_u64) == self.field_id;
            let by_name = entry.get("field_name").and_then(Value::as_str) == Some(self.name);
            let by_code = self
                .code
                .is_some_and(|code| entry.get("field_code").and_then(Value::as_str) == Some(code));
            (by_id || by_name || by_code)
                && entry
                    .get("values")
                    .and_then(Value::as_array)
                    .is_some_and(|values| !values.is_empty())
        })
    }

    /// Reads this field out of a record's custom-field container.
    ///
    /// A container without an entry for the field reads as `Null`.
    pub fn read(&self, def: &CustomFieldDef, container: Option<&Value>) -> ModelResult<FieldValue> {
        let Some(entries) = container.and_then(Value::as_array) else {
            return Ok(FieldValue::Null);
        };
        let Some(entry) = entries.iter().find(|e| self.matches_entry(def, e)) else {
            return Ok(FieldValue::Null);
        };
        let values = entry
            .get("values")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.decode(def, values)
    }

    /// Returns a new container with this field set to `value`.
    ///
    /// Other fields in the container are untouched. A missing entry is
    /// created first, tagged with the field's name and code.
    pub fn write(
        &self,
        def: &CustomFieldDef,
        container: Option<&Value>,
        value: &FieldValue,
    ) -> ModelResult<Value> {
        let mut entries = container
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let index = match entries.iter().position(|e| self.matches_entry(def, e)) {
            Some(index) => index,
            None => {
                entries.push(self.new_entry(def));
                entries.len() - 1
            }
        };
        let existing = entries[index]
            .get("values")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let values = self.encode(def, existing, value)?;
        if let Value::Object(entry) = &mut entries[index] {
            entry.insert("values".into(), Value::Array(values));
        }
        Ok(Value::Array(entries))
    }

    fn new_entry(&self, def: &CustomFieldDef) -> Value {
        let mut entry = Map::new();
        entry.insert("field_id".into(), Value::from(def.id));
        entry.insert("field_name".into(), Value::from(def.name.clone()));
        if let Some(code) = def.code.as_deref().or(self.code) {
            entry.insert("field_code".into(), Value::from(code));
        }
        entry.insert("values".into(), Value::Array(Vec::new()));
        Value::Object(entry)
    }

    /// Decodes the `values` list of a container entry.
    pub fn decode(&self, def: &CustomFieldDef, values: &[Value]) -> ModelResult<FieldValue> {
        if def.field_type == CustomFieldType::Multitext {
            return Ok(self.decode_multitext(values));
        }
        let Some(first) = values.first() else {
            return Ok(FieldValue::Null);
        };
        let raw = first.get("value").unwrap_or(&Value::Null);
        if raw.is_null() && def.field_type != CustomFieldType::Multiselect {
            return Ok(FieldValue::Null);
        }
        match def.field_type {
            CustomFieldType::Numeric => parse_number(raw)
                .map(FieldValue::Float)
                .ok_or_else(|| ModelError::invalid(self.name, "number", raw)),
            CustomFieldType::Checkbox => parse_flag(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| ModelError::invalid(self.name, "checkbox", raw)),
            CustomFieldType::Date | CustomFieldType::Birthday => Ok(self
                .epoch(raw)?
                .and_then(EpochSeconds::to_date)
                .map_or(FieldValue::Null, FieldValue::Date)),
            CustomFieldType::DateTime => Ok(self
                .epoch(raw)?
                .and_then(EpochSeconds::to_datetime)
                .map_or(FieldValue::Null, FieldValue::DateTime)),
            CustomFieldType::Select | CustomFieldType::Radiobutton => {
                Ok(FieldValue::Choice(choice_of(first)))
            }
            CustomFieldType::Multiselect => {
                Ok(FieldValue::Choices(values.iter().map(choice_of).collect()))
            }
            _ => Ok(FieldValue::Text(text_of(raw))),
        }
    }

    fn decode_multitext(&self, values: &[Value]) -> FieldValue {
        let kind = self.sub_kind.unwrap_or(DEFAULT_SUB_KIND);
        values
            .iter()
            .find(|v| v.get("enum_code").and_then(Value::as_str) == Some(kind))
            .and_then(|v| v.get("value"))
            .filter(|v| !v.is_null())
            .map_or(FieldValue::Null, |v| FieldValue::Text(text_of(v)))
    }

    fn epoch(&self, raw: &Value) -> ModelResult<Option<EpochSeconds>> {
        EpochSeconds::from_json(raw).map_err(|_| ModelError::invalid(self.name, "epoch seconds", raw))
    }

    /// Encodes `value` into a new `values` list. `existing` is the current
    /// list; only multi-value fields look at it.
    pub fn encode(
        &self,
        def: &CustomFieldDef,
        existing: Vec<Value>,
        value: &FieldValue,
    ) -> ModelResult<Vec<Value>> {
        if def.field_type == CustomFieldType::Multitext {
            return self.encode_multitext(def, existing, value);
        }
        if value.is_null() {
            return Ok(Vec::new());
        }
        let encoded = match def.field_type {
            CustomFieldType::Numeric => {
                let number = match value {
                    FieldValue::Float(f) => f.to_string(),
                    FieldValue::Int(i) => i.to_string(),
                    FieldValue::Text(s) if s.trim().parse::<f64>().is_ok() => s.trim().to_string(),
                    other => return Err(ModelError::invalid(self.name, "number", other)),
                };
                vec![json!({ "value": number })]
            }
            CustomFieldType::Checkbox => {
                let flag = match value {
                    FieldValue::Bool(b) => *b,
                    FieldValue::Int(i) => *i != 0,
                    FieldValue::Text(s) if s == "1" || s == "0" => s == "1",
                    other => return Err(ModelError::invalid(self.name, "checkbox", other)),
                };
                vec![json!({ "value": flag })]
            }
            CustomFieldType::Date | CustomFieldType::Birthday | CustomFieldType::DateTime => {
                let secs = match value {
                    FieldValue::Date(d) => EpochSeconds::from_date(*d),
                    FieldValue::DateTime(dt) => EpochSeconds::from_datetime(dt),
                    FieldValue::Int(secs) => EpochSeconds::new(*secs),
                    other => return Err(ModelError::invalid(self.name, "date", other)),
                };
                vec![json!({ "value": secs.get() })]
            }
            CustomFieldType::Select | CustomFieldType::Radiobutton => {
                let choice = match value {
                    FieldValue::Choice(c) => c.clone(),
                    FieldValue::Text(s) => Choice::named(s.clone()),
                    other => return Err(ModelError::invalid(self.name, "choice", other)),
                };
                vec![self.resolve_choice(def, &choice)?]
            }
            CustomFieldType::Multiselect => {
                let choices: Vec<Choice> = match value {
                    FieldValue::Choices(cs) => cs.clone(),
                    FieldValue::Choice(c) => vec![c.clone()],
                    FieldValue::Tags(names) => names.iter().cloned().map(Choice::named).collect(),
                    FieldValue::Text(s) => vec![Choice::named(s.clone())],
                    other => return Err(ModelError::invalid(self.name, "choices", other)),
                };
                choices
                    .iter()
                    .map(|c| self.resolve_choice(def, c))
                    .collect::<ModelResult<_>>()?
            }
            _ => {
                let text = match value {
                    FieldValue::Text(s) => s.clone(),
                    FieldValue::Int(i) => i.to_string(),
                    FieldValue::Float(f) => f.to_string(),
                    FieldValue::Choice(c) => c.value.clone(),
                    other => return Err(ModelError::invalid(self.name, "text", other)),
                };
                vec![json!({ "value": text })]
            }
        };
        Ok(encoded)
    }

    // Rewrites only the entry of this field's sub-kind; siblings stay as they are.
    fn encode_multitext(
        &self,
        def: &CustomFieldDef,
        mut values: Vec<Value>,
        value: &FieldValue,
    ) -> ModelResult<Vec<Value>> {
        let kind = self.sub_kind.unwrap_or(DEFAULT_SUB_KIND);
        let option = def.options().iter().find(|o| o.value == kind);
        if option.is_none() && !def.options().is_empty() {
            return Err(ModelError::MissingEnum {
                field: self.label(),
                value: kind.to_string(),
            });
        }
        let position = values
            .iter()
            .position(|v| v.get("enum_code").and_then(Value::as_str) == Some(kind));

        let text = match value {
            FieldValue::Null => {
                if let Some(index) = position {
                    values.remove(index);
                }
                return Ok(values);
            }
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            other => return Err(ModelError::invalid(self.name, "text", other)),
        };

        match position.and_then(|index| values.get_mut(index)) {
            Some(Value::Object(item)) => {
                item.insert("value".into(), Value::String(text));
            }
            _ => {
                let mut item = Map::new();
                item.insert("value".into(), Value::String(text));
                item.insert("enum_code".into(), Value::from(kind));
                if let Some(option) = option {
                    item.insert("enum_id".into(), Value::from(option.id));
                }
                values.push(Value::Object(item));
            }
        }
        Ok(values)
    }

    fn resolve_choice(&self, def: &CustomFieldDef, choice: &Choice) -> ModelResult<Value> {
        let options = def.options();
        let found = match choice.id {
            Some(id) => options.iter().find(|o| o.id == id),
            None => options.iter().find(|o| o.value == choice.value),
        };
        let option = found.ok_or_else(|| ModelError::MissingEnum {
            field: self.label(),
            value: choice
                .id
                .map_or_else(|| choice.value.clone(), |id| id.to_string()),
        })?;
        Ok(json!({ "value": option.value, "enum_id": option.id }))
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) if s == "1" => Some(true),
        Value::String(s) if s == "0" || s.is_empty() => Some(false),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn choice_of(item: &Value) -> Choice {
    Choice {
        id: item.get("enum_id").and_then(Value::as_u64),
        value: item.get("value").map(text_of).unwrap_or_default(),
    }
}
