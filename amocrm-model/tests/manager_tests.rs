mod common;

use amocrm_model::transport::mock::{Call, MockTransport};
use amocrm_model::{
    Entity, EntityId, EntitySchema, Filter, ListQuery, Model, ModelError, ModelResult, Objects,
    SortDirection, TransportError,
};
use common::{fixture, fixture_with};
use pretty_assertions::assert_eq;
use serde_json::json;

fn list_calls(fx: &common::Fixture) -> Vec<ListQuery> {
    fx.transport
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::List { query, .. } => Some(query),
            _ => None,
        })
        .collect()
}

// ── Listing ──────────────────────────────────────────────────────

#[test]
fn listing_follows_pages() {
    let fx = fixture_with(MockTransport::new().with_page_size(2));
    for n in 1..=5 {
        fx.transport
            .insert("contacts", json!({"name": format!("Contact {n}")}));
    }

    let all: Vec<Entity> = fx.contacts().all().collect::<ModelResult<_>>().unwrap();

    assert_eq!(all.len(), 5);
    assert!(all.iter().all(Entity::is_loaded));
    let pages: Vec<u32> = list_calls(&fx).iter().map(|q| q.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[test]
fn listing_stops_on_last_full_page() {
    let fx = fixture_with(MockTransport::new().with_page_size(2));
    for n in 1..=4 {
        fx.transport.insert("contacts", json!({"name": format!("C{n}")}));
    }
    assert_eq!(fx.contacts().all().count(), 4);
    assert_eq!(list_calls(&fx).len(), 2);
}

#[test]
fn listing_is_lazy() {
    let fx = fixture_with(MockTransport::new().with_page_size(2));
    for n in 1..=5 {
        fx.transport.insert("contacts", json!({"name": format!("C{n}")}));
    }
    let first_two: Vec<_> = fx.contacts().all().take(2).collect();
    assert_eq!(first_two.len(), 2);
    assert_eq!(list_calls(&fx).len(), 1);
}

#[test]
fn empty_listing_makes_one_call() {
    let fx = fixture();
    assert_eq!(fx.contacts().all().count(), 0);
    assert_eq!(list_calls(&fx).len(), 1);
}

#[test]
fn listing_error_ends_iteration() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"name": "Jon"}));
    fx.transport.fail_next(TransportError::Unauthorized);

    let mut all = fx.contacts().all();

    assert!(matches!(
        all.next(),
        Some(Err(ModelError::Transport(TransportError::Unauthorized)))
    ));
    assert!(all.next().is_none());
}

#[test]
fn listing_requests_embedded_relations() {
    let fx = fixture();
    fx.contacts().all().count();
    let query = &list_calls(&fx)[0];
    assert_eq!(query.include, vec!["companies".to_string(), "leads".to_string()]);
}

#[test]
fn filter_by_matches_field_value() {
    let fx = fixture();
    fx.transport
        .insert("contacts", json!({"name": "Jon", "responsible_user_id": 5}));
    fx.transport
        .insert("contacts", json!({"name": "Ann", "responsible_user_id": 6}));

    let found: Vec<_> = fx
        .contacts()
        .filter_by("responsible_user_id", 5)
        .map(|r| r.unwrap().display().unwrap())
        .collect();

    assert_eq!(found, vec!["Jon"]);
}

#[test]
fn first_returns_none_when_empty() {
    let fx = fixture();
    assert!(fx.contacts().first(ListQuery::new()).unwrap().is_none());
}

// ── Query parameters ─────────────────────────────────────────────

#[test]
fn query_renders_all_parameters() {
    let query = ListQuery::new()
        .page(2)
        .limit(50)
        .search("jon")
        .order("created_at", SortDirection::Desc)
        .filter(Filter::single("responsible_user_id", 5))
        .filter(Filter::multi("id", [1, 2]))
        .filter(Filter::range("price", 10, 20))
        .filter(Filter::single_list("tag", "vip"))
        .include(["contacts".to_string(), "contacts".to_string()]);

    let params: Vec<(String, String)> = query.as_params();
    let expected: Vec<(String, String)> = [
        ("page", "2"),
        ("limit", "50"),
        ("query", "jon"),
        ("order[created_at]", "desc"),
        ("filter[responsible_user_id]", "5"),
        ("filter[id][0]", "1"),
        ("filter[id][1]", "2"),
        ("filter[price][from]", "10"),
        ("filter[price][to]", "20"),
        ("filter[tag][]", "vip"),
        ("with", "contacts"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(params, expected);
}

#[test]
fn limit_is_clamped() {
    assert_eq!(ListQuery::new().limit(10_000).limit, 250);
    assert_eq!(ListQuery::new().limit(0).limit, 1);
    assert_eq!(ListQuery::new().page(0).page, 1);
    assert_eq!(
        ListQuery::new().as_params(),
        vec![
            ("page".to_string(), "1".to_string()),
            ("limit".to_string(), "250".to_string()),
        ]
    );
}

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn get_missing_record_is_not_found() {
    let fx = fixture();
    let err = fx.contacts().get(EntityId::new(99)).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ModelError::NotFound { ref collection, .. } if collection == "contacts"));
}

#[test]
fn search_returns_first_hit() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"name": "Jon Snow"}));
    fx.transport.insert("contacts", json!({"name": "Arya"}));

    let hit = fx.contacts().search("snow").unwrap().unwrap();

    assert!(hit == "Jon Snow");
    let query = &list_calls(&fx)[0];
    assert_eq!(query.query.as_deref(), Some("snow"));
}

#[test]
fn search_unsupported_for_collection() {
    let fx = fixture();
    let err = fx.users().search("ann").unwrap_err();
    assert!(matches!(err, ModelError::Unsupported { operation: "search", entity: "User" }));
    assert!(fx.transport.calls().is_empty());
}

#[test]
fn find_by_main_field_requires_exact_match() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"name": "Jonathan"}));
    let jon = fx.transport.insert("contacts", json!({"name": "Jon"}));

    let found = fx.contacts().find_by_main_field("Jon").unwrap().unwrap();

    assert_eq!(found.id(), Some(jon));
    assert!(fx.contacts().find_by_main_field("Jo").unwrap().is_none());
}

// ── Collections ──────────────────────────────────────────────────

#[test]
fn manager_can_be_rerooted() {
    let fx = fixture();
    let notes = fx.notes().at("contacts/1/notes");
    assert_eq!(notes.collection(), "contacts/1/notes");
    assert_eq!(notes.schema().name(), "Note");

    let mut note = notes.new_entity().with("text", "Called back").unwrap();
    note.save().unwrap();

    assert_eq!(fx.transport.records("contacts/1/notes").len(), 1);
    assert!(fx.transport.records("notes").is_empty());
}

#[test]
fn note_params_stamp_note_type() {
    let fx = fixture();
    let mut note = fx.notes().new_entity();

    note.set("phone", "+100").unwrap();
    note.set("duration", 60).unwrap();

    assert_eq!(
        note.to_json(),
        json!({"note_type": "call_in", "params": {"phone": "+100", "duration": 60}})
    );
    assert_eq!(note.get_text("phone").unwrap().as_deref(), Some("+100"));
}

#[test]
fn custom_fields_memo_is_per_collection() {
    let fx = fixture();
    fx.contacts().custom_fields().unwrap();
    let companies = fx.companies().custom_fields().unwrap();
    assert!(companies.is_empty());
    let collections: Vec<String> = fx
        .transport
        .calls()
        .iter()
        .map(|c| c.collection().to_string())
        .collect();
    assert_eq!(collections, vec!["contacts", "companies"]);
}

// ── Typed access ─────────────────────────────────────────────────

struct Contact(Entity);

impl Model for Contact {
    fn schema() -> &'static EntitySchema {
        common::contact()
    }

    fn from_entity(entity: Entity) -> Self {
        Self(entity)
    }

    fn entity(&self) -> &Entity {
        &self.0
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.0
    }

    fn into_entity(self) -> Entity {
        self.0
    }
}

#[test]
fn objects_create_and_fetch() {
    let fx = fixture();
    let contacts: Objects<Contact> = Objects::new(fx.session.clone());

    let created = contacts.create([("name", "Jon")]).unwrap();
    let id = created.entity().id().unwrap();

    let mut fetched = contacts.get(id).unwrap();
    assert_eq!(
        fetched.entity_mut().get_text("name").unwrap().as_deref(),
        Some("Jon")
    );
    assert_eq!(contacts.all().count(), 1);
    assert!(contacts.search("jon").unwrap().is_some());
    assert_eq!(contacts.manager().collection(), "contacts");
}

#[test]
fn objects_build_does_not_save() {
    let fx = fixture();
    let contacts: Objects<Contact> = Objects::new(fx.session.clone());
    let draft = contacts.build([("name", "Draft")]).unwrap();
    assert!(draft.entity().is_dirty());
    assert!(draft.into_entity().id().is_none());
    assert!(fx.transport.calls().is_empty());
}
