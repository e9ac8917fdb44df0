mod common;

use amocrm_model::transport::mock::Call;
use amocrm_model::{EntityId, FieldValue, LinkTarget, ModelError};
use common::{fixture, raw};
use pretty_assertions::assert_eq;
use serde_json::json;

fn id(n: u64) -> EntityId {
    EntityId::new(n)
}

// ── Single links ─────────────────────────────────────────────────

#[test]
fn link_decodes_to_lazy_proxy() {
    let fx = fixture();
    fx.transport.insert("companies", json!({"id": 3, "name": "Acme"}));
    fx.transport
        .insert("contacts", json!({"id": 1, "name": "Jon", "company_id": 3}));
    let mut jon = fx.contacts().get(id(1)).unwrap();

    let mut acme = jon.get_entity("company").unwrap().unwrap();
    assert_eq!(acme.id(), Some(id(3)));
    assert!(!acme.is_loaded());
    assert_eq!(fx.transport.gets(), 1);

    assert_eq!(acme.get_text("name").unwrap().as_deref(), Some("Acme"));
    assert_eq!(fx.transport.gets(), 2);
}

#[test]
fn side_channel_seeds_target_without_fetch() {
    let fx = fixture();
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "company_id": 3, "company_name": "Acme"}),
    );
    let mut jon = fx.contacts().get(id(1)).unwrap();

    let mut acme = jon.get_entity("company").unwrap().unwrap();

    assert_eq!(acme.get_text("name").unwrap().as_deref(), Some("Acme"));
    assert!(!acme.is_dirty());
    assert_eq!(fx.transport.gets(), 1);
}

#[test]
fn side_channel_without_id_yields_unsaved_target() {
    let fx = fixture();
    let mut jon = fx
        .contacts()
        .partial(raw(json!({"name": "Jon", "company_name": "Acme"})));

    let acme = jon.get_entity("company").unwrap().unwrap();

    assert_eq!(acme.id(), None);
    assert!(acme == "Acme");
    assert!(acme.is_dirty());
}

#[test]
fn zero_foreign_key_means_no_link() {
    let fx = fixture();
    fx.transport
        .insert("contacts", json!({"id": 1, "name": "Jon", "responsible_user_id": 0}));
    let mut jon = fx.contacts().get(id(1)).unwrap();
    assert_eq!(jon.get("responsible_user").unwrap(), FieldValue::Null);
}

#[test]
fn link_set_by_id_and_cleared() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"id": 1, "name": "Jon"}));
    let mut jon = fx.contacts().get(id(1)).unwrap();

    jon.set("responsible_user", id(4)).unwrap();
    assert_eq!(jon.raw().get("responsible_user_id"), Some(&json!(4)));
    let user = jon.get_entity("responsible_user").unwrap().unwrap();
    assert_eq!(user.id(), Some(id(4)));
    assert_eq!(user.schema().name(), "User");

    jon.set("responsible_user", FieldValue::Null).unwrap();
    assert_eq!(jon.get("responsible_user").unwrap(), FieldValue::Null);
    assert!(jon.dirty_fields().contains("responsible_user_id"));
}

#[test]
fn link_set_by_saved_entity() {
    let fx = fixture();
    let mut jon = fx.contacts().new_entity();
    let ann = fx.users().proxy(id(9));
    jon.set("responsible_user", ann).unwrap();
    assert_eq!(jon.raw().get("responsible_user_id"), Some(&json!(9)));
}

#[test]
fn link_rejects_non_id_values() {
    let fx = fixture();
    let mut jon = fx.contacts().new_entity();
    assert!(matches!(
        jon.set("responsible_user", "ann"),
        Err(ModelError::InvalidValue { .. })
    ));
}

// ── Auto-created targets ─────────────────────────────────────────

#[test]
fn unsaved_target_is_pending_until_owner_saves() {
    let fx = fixture();
    let acme = fx.companies().new_entity().with("name", "Acme").unwrap();
    let mut jon = fx.contacts().new_entity().with("name", "Jon").unwrap();

    jon.set("company", acme).unwrap();

    assert_eq!(jon.raw().get("company_name"), Some(&json!("Acme")));
    assert!(jon.get_entity("company").unwrap().unwrap() == "Acme");
    assert!(fx.transport.calls().is_empty());
}

#[test]
fn auto_created_target_is_created_on_save() {
    let fx = fixture();
    let acme = fx.companies().new_entity().with("name", "Acme").unwrap();
    let mut jon = fx
        .contacts()
        .new_entity()
        .with("name", "Jon")
        .unwrap()
        .with("company", acme)
        .unwrap();

    jon.save().unwrap();

    let companies = fx.transport.records("companies");
    assert_eq!(companies.len(), 1);
    let company_id = companies[0]["id"].clone();
    let stored = fx.transport.record("contacts", jon.id().unwrap()).unwrap();
    assert_eq!(stored["company_id"], company_id);
    assert_eq!(stored["company_name"], json!("Acme"));
}

#[test]
fn auto_created_target_reuses_existing_record() {
    let fx = fixture();
    let existing = fx.transport.insert("companies", json!({"name": "Acme"}));
    let acme = fx.companies().new_entity().with("name", "Acme").unwrap();
    let mut jon = fx
        .contacts()
        .new_entity()
        .with("name", "Jon")
        .unwrap()
        .with("company", acme)
        .unwrap();

    jon.save().unwrap();

    assert_eq!(fx.transport.records("companies").len(), 1);
    let stored = fx.transport.record("contacts", jon.id().unwrap()).unwrap();
    assert_eq!(stored["company_id"], existing.to_json());
    assert_eq!(jon.get_entity("company").unwrap().unwrap().id(), Some(existing));
}

#[test]
fn auto_created_target_failure_rolls_back_owner() {
    let fx = fixture();
    let nameless = fx.companies().new_entity().with("city", "Riga").unwrap();
    let mut jon = fx
        .contacts()
        .new_entity()
        .with("name", "Jon")
        .unwrap()
        .with("company", nameless)
        .unwrap();

    let err = jon.save().unwrap_err();

    assert!(matches!(err, ModelError::RequiredField { entity: "Company", .. }));
    assert_eq!(jon.id(), None);
    assert!(jon.get_entity("company").unwrap().is_some());
    assert_eq!(fx.transport.writes(), 0);
}

// ── Many links ───────────────────────────────────────────────────

#[test]
fn many_link_on_partial_owner_returns_ids() {
    let fx = fixture();
    let mut jon = fx
        .contacts()
        .partial(raw(json!({"id": 1, "linked_leads_id": [7, "8"]})));

    assert_eq!(jon.get("leads").unwrap(), FieldValue::Ids(vec![id(7), id(8)]));
    assert!(fx.transport.calls().is_empty());
}

#[test]
fn many_link_on_loaded_owner_fetches_targets() {
    let fx = fixture();
    fx.transport.insert("leads", json!({"id": 7, "name": "First"}));
    fx.transport.insert("leads", json!({"id": 8, "name": "Second"}));
    fx.transport
        .insert("contacts", json!({"id": 1, "name": "Jon", "linked_leads_id": [7, 8]}));
    let mut jon = fx.contacts().get(id(1)).unwrap();

    let leads = jon.get_entities("leads").unwrap();

    let names: Vec<_> = leads.iter().filter_map(|l| l.display()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(fx.transport.gets(), 3);
}

#[test]
fn many_link_set_writes_id_list() {
    let fx = fixture();
    let mut jon = fx.contacts().new_entity();
    jon.set("leads", vec![id(7), id(8)]).unwrap();
    assert_eq!(jon.raw().get("linked_leads_id"), Some(&json!([7, 8])));

    let unsaved = fx.leads().new_entity();
    assert!(matches!(
        jon.set("leads", vec![unsaved]),
        Err(ModelError::NotPersisted { .. })
    ));
}

// ── Embedded links ───────────────────────────────────────────────

#[test]
fn embedded_link_needs_persisted_owner() {
    let fx = fixture();
    let mut jon = fx.contacts().new_entity().with("name", "Jon").unwrap();
    let err = jon.set("main_company", id(3)).unwrap_err();
    assert!(matches!(err, ModelError::NotPersisted { entity: "Contact" }));
    assert!(fx.transport.calls().is_empty());
}

#[test]
fn embedded_link_issues_link_call() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"id": 1, "name": "Jon"}));
    let mut jon = fx.contacts().get(id(1)).unwrap();

    jon.set("main_company", id(3)).unwrap();

    assert_eq!(
        fx.transport.calls().last(),
        Some(&Call::Link {
            collection: "contacts".into(),
            id: id(1),
            target: LinkTarget::new(id(3), "companies"),
        })
    );
    assert!(!jon.is_dirty());
    let linked = jon.get_entity("main_company").unwrap().unwrap();
    assert_eq!(linked.id(), Some(id(3)));
    let stored = fx.transport.record("contacts", id(1)).unwrap();
    assert_eq!(stored["_embedded"]["companies"], json!([{"id": 3}]));
}

#[test]
fn embedded_link_saves_new_target_first() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"id": 1, "name": "Jon"}));
    let mut jon = fx.contacts().get(id(1)).unwrap();
    let fresh = fx.companies().new_entity().with("name", "Fresh").unwrap();

    jon.set("main_company", fresh).unwrap();

    let calls = fx.transport.calls();
    let kinds: Vec<_> = calls
        .iter()
        .filter(|c| c.is_write())
        .map(|c| c.collection().to_string())
        .collect();
    assert_eq!(kinds, vec!["companies", "contacts"]);
    assert_eq!(fx.transport.records("companies").len(), 1);
}

#[test]
fn embedded_link_cleared_with_unlink() {
    let fx = fixture();
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "_embedded": {"companies": [{"id": 3}]}}),
    );
    let mut jon = fx.contacts().get(id(1)).unwrap();

    jon.set("main_company", FieldValue::Null).unwrap();

    assert_eq!(
        fx.transport.calls().last(),
        Some(&Call::Unlink {
            collection: "contacts".into(),
            id: id(1),
            target: LinkTarget::new(id(3), "companies"),
        })
    );
    assert_eq!(jon.get("main_company").unwrap(), FieldValue::Null);
    assert!(!jon.is_dirty());
}

// ── Embedded lists ───────────────────────────────────────────────

#[test]
fn embedded_list_decodes_partial_stubs() {
    let fx = fixture();
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "_embedded": {"leads": [{"id": 7}, {"id": 8}]}}),
    );
    let mut jon = fx.contacts().get(id(1)).unwrap();

    let deals = jon.get_entities("deals").unwrap();

    assert_eq!(deals.len(), 2);
    assert!(deals.iter().all(|d| !d.is_loaded()));
    assert_eq!(fx.transport.gets(), 1);
}

#[test]
fn embedded_list_append_and_remove() {
    let fx = fixture();
    fx.transport.insert("leads", json!({"id": 7, "name": "Old"}));
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "_embedded": {"leads": [{"id": 7}]}}),
    );
    let mut jon = fx.contacts().get(id(1)).unwrap();
    let mut fresh = fx.leads().new_entity().with("name", "Fresh").unwrap();
    let old = fx.leads().proxy(id(7));

    {
        let mut deals = jon.linked("deals").unwrap();
        assert_eq!(deals.ids(), vec![id(7)]);
        assert!(deals.contains(&old));

        deals.append(&mut fresh).unwrap();
        let fresh_id = fresh.id().unwrap();
        assert_eq!(deals.ids(), vec![id(7), fresh_id]);

        deals.remove(&old).unwrap();
        assert_eq!(deals.ids(), vec![fresh_id]);
        assert_eq!(deals.len(), 1);
    }

    assert!(!jon.is_dirty());
    let stored = fx.transport.record("contacts", id(1)).unwrap();
    assert_eq!(stored["_embedded"]["leads"], json!([{"id": fresh.id().unwrap()}]));
    assert_eq!(
        fx.transport
            .count(|c| matches!(c, Call::Link { .. } | Call::Unlink { .. })),
        2
    );
}

#[test]
fn embedded_list_append_main_sets_metadata() {
    let fx = fixture();
    fx.transport.insert("contacts", json!({"id": 1, "name": "Jon"}));
    let mut jon = fx.contacts().get(id(1)).unwrap();
    let mut lead = fx.leads().proxy(id(7));

    jon.linked("deals").unwrap().append_main(&mut lead).unwrap();

    let Some(Call::Link { target, .. }) = fx.transport.calls().pop() else {
        panic!("expected link call");
    };
    assert_eq!(target.metadata, Some(json!({"main": true})));
}

#[test]
fn embedded_list_iterates_with_one_fetch_per_record() {
    let fx = fixture();
    fx.transport.insert("leads", json!({"id": 7, "name": "A"}));
    fx.transport.insert("leads", json!({"id": 8, "name": "B"}));
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "_embedded": {"leads": [{"id": 7}, {"id": 8}]}}),
    );
    let mut jon = fx.contacts().get(id(1)).unwrap();
    fx.transport.clear_calls();

    let deals = jon.linked("deals").unwrap();
    let names: Vec<_> = deals
        .iter()
        .map(|r| r.unwrap().display().unwrap())
        .collect();

    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(fx.transport.gets(), 2);
}

#[test]
fn embedded_list_on_proxy_fetches_owner() {
    let fx = fixture();
    fx.transport.insert(
        "contacts",
        json!({"id": 1, "name": "Jon", "_embedded": {"leads": [{"id": 7}]}}),
    );
    let mut jon = fx.contacts().proxy(id(1));

    let deals = jon.linked("deals").unwrap();

    assert_eq!(deals.ids(), vec![id(7)]);
    assert_eq!(fx.transport.gets(), 1);
}

#[test]
fn linked_view_only_for_embedded_lists() {
    let fx = fixture();
    let mut jon = fx.contacts().proxy(id(1));
    assert!(matches!(jon.linked("name"), Err(ModelError::Unsupported { .. })));
}

#[test]
fn embedded_list_is_read_only_attribute() {
    let fx = fixture();
    let mut jon = fx.contacts().proxy(id(1));
    assert!(matches!(
        jon.set("deals", vec![id(7)]),
        Err(ModelError::ReadOnlyField { .. })
    ));
}

// ── Nested objects ───────────────────────────────────────────────

#[test]
fn nested_objects_decode_as_loaded_entities() {
    let fx = fixture();
    fx.transport.insert(
        "leads/pipelines",
        json!({
            "id": 1,
            "name": "Sales",
            "_embedded": {"statuses": [
                {"id": 10, "name": "New", "sort": 10},
                {"id": 11, "name": "Won", "sort": 20}
            ]}
        }),
    );
    let mut sales = fx.pipelines().get(id(1)).unwrap();

    let mut statuses = sales.get_entities("statuses").unwrap();

    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| s.is_loaded()));
    assert_eq!(statuses[1].get_text("name").unwrap().as_deref(), Some("Won"));
    assert_eq!(statuses[1].get_i64("sort").unwrap(), Some(20));
    assert!(matches!(
        sales.set("statuses", FieldValue::Null),
        Err(ModelError::ReadOnlyField { .. })
    ));
}
