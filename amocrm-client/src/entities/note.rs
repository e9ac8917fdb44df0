//! Notes attached to contacts, companies and leads.
//!
//! Notes live under the owner's collection: `contacts/{id}/notes`. The
//! payload of a note is its `params` object, whose keys depend on
//! `note_type`; assigning a parameter stamps the matching type.

use std::sync::LazyLock;

use amocrm_model::{EntityId, EntitySchema, Field, ModelResult};
use serde::{Deserialize, Serialize};

use super::{entity_model, user};

/// The note types this client writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Common,
    CallIn,
    CallOut,
    ServiceMessage,
    Geolocation,
}

impl NoteType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::CallIn => "call_in",
            Self::CallOut => "call_out",
            Self::ServiceMessage => "service_message",
            Self::Geolocation => "geolocation",
        }
    }
}

static NOTE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Note", "notes")
        .fields([
            Field::plain("note_type"),
            Field::read_only("entity_id").blank(),
            Field::read_only("created_by").blank(),
            Field::link("responsible_user", "responsible_user_id", user::schema),
            Field::datetime("created_at"),
            Field::datetime("updated_at"),
            Field::note_param("text", NoteType::Common.as_str()),
            Field::note_param("uniq", NoteType::CallIn.as_str()),
            Field::note_param("duration", NoteType::CallIn.as_str()),
            Field::note_param("source", NoteType::CallIn.as_str()),
            Field::note_param("link", NoteType::CallIn.as_str()),
            Field::note_param("phone", NoteType::CallIn.as_str()),
            Field::note_param("service", NoteType::ServiceMessage.as_str()),
            Field::note_param("address", NoteType::Geolocation.as_str()),
            Field::note_param("longitude", NoteType::Geolocation.as_str()),
            Field::note_param("latitude", NoteType::Geolocation.as_str()),
        ])
        .not_searchable()
        .build()
});

pub fn schema() -> &'static EntitySchema {
    &NOTE
}

entity_model!(Note => schema);

/// Collection path of the notes of record `id` in `collection`.
pub fn collection_of(collection: &str, id: EntityId) -> String {
    format!("{collection}/{id}/notes")
}

impl Note {
    pub fn note_type(&mut self) -> ModelResult<Option<String>> {
        self.get_text("note_type")
    }

    pub fn text(&mut self) -> ModelResult<Option<String>> {
        self.get_text("text")
    }

    /// Sets the text of a plain note.
    pub fn set_text(&mut self, text: impl Into<String>) -> ModelResult<()> {
        self.set("text", text.into())
    }

    /// Records an incoming call: phone number and duration in seconds.
    pub fn set_call_in(&mut self, phone: impl Into<String>, duration: i64) -> ModelResult<()> {
        self.set("phone", phone.into())?;
        self.set("duration", duration)
    }
}
