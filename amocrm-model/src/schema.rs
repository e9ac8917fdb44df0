//! Entity type descriptions.
//!
//! An [`EntitySchema`] is the ordered field registry of one entity type plus
//! the collection it lives in. Schemas are built once, usually in a
//! `static LazyLock`, and referenced by `&'static` from every instance.

use crate::field::{Field, FieldKind};

/// Deferred reference to a schema. Lets entity types refer to each other
/// (contact to company and back) without initialization cycles.
pub type SchemaRef = fn() -> &'static EntitySchema;

/// Wire keys stamped on save when the collection tracks write times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    /// Set once, on create.
    pub created: &'static str,
    /// Advanced on every save, never backward.
    pub modified: &'static str,
}

/// Field registry and collection binding of an entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: &'static str,
    collection: &'static str,
    main_field: Option<&'static str>,
    fields: Vec<Field>,
    timestamps: Option<Timestamps>,
    searchable: bool,
    deletable: bool,
}

impl EntitySchema {
    pub fn builder(name: &'static str, collection: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name,
                collection,
                main_field: None,
                fields: vec![Field::read_only("id").blank()],
                timestamps: None,
                searchable: true,
                deletable: false,
            },
        }
    }

    /// Entity type name, e.g. `"Contact"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default API collection path, e.g. `"contacts"`.
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Display field used for equality fallback and search-or-create.
    pub fn main_field(&self) -> Option<&Field> {
        self.main_field.and_then(|name| self.field(name))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_deletable(&self) -> bool {
        self.deletable
    }

    /// Related collections to request with `with=` so embedded links decode
    /// without extra calls.
    pub fn embedded_includes(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| {
                matches!(
                    f.kind(),
                    FieldKind::EmbeddedLink(_) | FieldKind::EmbeddedList(_)
                )
            })
            .map(|f| f.wire_key().to_string())
            .collect()
    }
}

/// Builder for [`EntitySchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: EntitySchema,
}

impl SchemaBuilder {
    /// Adds a field. A field with the same name replaces the earlier one,
    /// which lets callers extend a stock schema.
    pub fn field(mut self, field: Field) -> Self {
        match self.schema.fields.iter_mut().find(|f| f.name() == field.name()) {
            Some(existing) => *existing = field,
            None => self.schema.fields.push(field),
        }
        self
    }

    pub fn fields(self, fields: impl IntoIterator<Item = Field>) -> Self {
        fields.into_iter().fold(self, Self::field)
    }

    pub fn main_field(mut self, name: &'static str) -> Self {
        self.schema.main_field = Some(name);
        self
    }

    pub fn timestamps(mut self, created: &'static str, modified: &'static str) -> Self {
        self.schema.timestamps = Some(Timestamps { created, modified });
        self
    }

    /// The collection has no free-text search.
    pub fn not_searchable(mut self) -> Self {
        self.schema.searchable = false;
        self
    }

    /// Records of the collection can be deleted through the API.
    pub fn deletable(mut self) -> Self {
        self.schema.deletable = true;
        self
    }

    /// Changes the entity type name, for schemas derived from a stock one.
    pub fn rename(mut self, name: &'static str) -> Self {
        self.schema.name = name;
        self
    }

    pub fn build(self) -> EntitySchema {
        self.schema
    }
}

impl EntitySchema {
    /// A builder seeded with this schema's fields and settings.
    pub fn extend(&self) -> SchemaBuilder {
        SchemaBuilder {
            schema: self.clone(),
        }
    }
}
