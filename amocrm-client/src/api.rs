//! Top-level API object.

use std::sync::Arc;

use amocrm_model::{EntityId, Manager, Objects, Session, Transport};
use tracing::info;

use crate::config::ClientConfig;
use crate::entities::{Company, Contact, Lead, Note, Pipeline, Tag, Task, TaskList, User};
use crate::entities::{note, tag};
use crate::error::ClientResult;
use crate::http::HttpTransport;
use crate::token::TokenProvider;

/// One account: a shared session plus a typed gateway per collection.
#[derive(Debug, Clone)]
pub struct AmoApi {
    session: Arc<Session>,
}

impl AmoApi {
    /// Connects to the account described by `config` over HTTP.
    pub fn new(config: ClientConfig, tokens: impl TokenProvider + 'static) -> ClientResult<Self> {
        let api_root = config.api_root();
        let transport = HttpTransport::new(config, Arc::new(tokens))?;
        info!(%api_root, "amoCRM client ready");
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Uses any transport, e.g. an in-memory one in tests.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            session: Session::new(transport),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn objects<T: amocrm_model::Model>(&self) -> Objects<T> {
        Objects::new(Arc::clone(&self.session))
    }

    pub fn contacts(&self) -> Objects<Contact> {
        self.objects()
    }

    pub fn companies(&self) -> Objects<Company> {
        self.objects()
    }

    pub fn leads(&self) -> Objects<Lead> {
        self.objects()
    }

    pub fn tasks(&self) -> Objects<Task> {
        self.objects()
    }

    pub fn users(&self) -> Objects<User> {
        self.objects()
    }

    pub fn pipelines(&self) -> Objects<Pipeline> {
        self.objects()
    }

    /// Notes of record `id` in `collection` (`"contacts"`, `"leads"`, ...).
    pub fn notes_of(&self, collection: &str, id: EntityId) -> Objects<Note> {
        let manager = Manager::new(note::schema(), Arc::clone(&self.session))
            .at(note::collection_of(collection, id));
        Objects::with_manager(manager)
    }

    /// Tag dictionary of `collection`.
    pub fn tags(&self, collection: &str) -> Objects<Tag> {
        let manager =
            Manager::new(tag::schema(), Arc::clone(&self.session)).at(tag::collection_of(collection));
        Objects::with_manager(manager)
    }

    /// Tasks bound to record `id` in `collection`.
    pub fn tasks_of(&self, collection: &str, id: EntityId) -> TaskList {
        TaskList::new(self.tasks(), collection, id)
    }
}
