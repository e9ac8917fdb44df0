#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use amocrm_model::transport::mock::MockTransport;
use amocrm_model::{
    CustomField, CustomFieldDef, CustomFieldType, EntitySchema, Field, Manager, RawData, Session,
};
use serde_json::Value;

pub static CONTACT: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Contact", "contacts")
        .main_field("name")
        .fields([
            Field::plain("name").required(),
            Field::plain("email").blank(),
            Field::plain("first_name").blank(),
            Field::plain("phone_hint"),
            Field::boolean("is_vip").blank(),
            Field::tags("tags"),
            Field::datetime("created_at"),
            Field::read_only("account_id").blank(),
            Field::constant("kind", "contact"),
            Field::plain("level").at(&["rights"]).blank(),
            Field::link("company", "company_id", company)
                .side_channel("name", "company_name")
                .auto_created(),
            Field::link("responsible_user", "responsible_user_id", user),
            Field::many_link("leads", "linked_leads_id", lead),
            Field::embedded_link("main_company", "companies", company),
            Field::embedded_list("deals", "leads", lead),
            Field::custom("phone", CustomField::phone("Phone", "WORK")),
            Field::custom("mobile", CustomField::phone("Phone", "MOB")),
            Field::custom("work_email", CustomField::email("Email", "WORK")),
            Field::custom("position", CustomField::named("Position")),
            Field::custom("budget", CustomField::named("Budget")),
            Field::custom("agreed", CustomField::named("Agreed")),
            Field::custom("birthday", CustomField::named("Birthday")),
            Field::custom("call_at", CustomField::named("Call at")),
            Field::custom("source", CustomField::named("Source")),
            Field::custom("interests", CustomField::named("Interests")),
            Field::custom("skype", CustomField::named("Old skype name").code("SKYPE")),
            Field::custom("pinned", CustomField::named("anything").id(77)),
            Field::custom("missing", CustomField::named("Not in account")),
        ])
        .deletable()
        .build()
});

pub static COMPANY: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Company", "companies")
        .main_field("name")
        .fields([
            Field::plain("name").required(),
            Field::plain("city").blank(),
            Field::embedded_list("contacts", "contacts", contact),
        ])
        .build()
});

pub static LEAD: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Lead", "leads")
        .main_field("name")
        .timestamps("date_create", "last_modified")
        .fields([
            Field::plain("name"),
            Field::plain("price").blank(),
            Field::datetime("date_create"),
            Field::datetime("last_modified"),
            Field::link("pipeline", "pipeline_id", pipeline),
        ])
        .build()
});

pub static USER: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("User", "users")
        .main_field("name")
        .fields([Field::plain("name"), Field::plain("email").blank()])
        .not_searchable()
        .build()
});

pub static PIPELINE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Pipeline", "leads/pipelines")
        .main_field("name")
        .fields([
            Field::plain("name"),
            Field::object("statuses", status, true)
                .key("statuses")
                .at(&["_embedded"]),
        ])
        .build()
});

pub static STATUS: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Status", "statuses")
        .main_field("name")
        .fields([Field::plain("name"), Field::plain("sort").blank()])
        .build()
});

pub static NOTE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("Note", "notes")
        .fields([
            Field::plain("note_type"),
            Field::note_param("text", "common"),
            Field::note_param("phone", "call_in"),
            Field::note_param("duration", "call_in"),
        ])
        .not_searchable()
        .build()
});

pub fn contact() -> &'static EntitySchema {
    &CONTACT
}

pub fn company() -> &'static EntitySchema {
    &COMPANY
}

pub fn lead() -> &'static EntitySchema {
    &LEAD
}

pub fn user() -> &'static EntitySchema {
    &USER
}

pub fn pipeline() -> &'static EntitySchema {
    &PIPELINE
}

pub fn status() -> &'static EntitySchema {
    &STATUS
}

pub fn note() -> &'static EntitySchema {
    &NOTE
}

/// Custom fields of the `contacts` collection in the test account.
pub fn contact_fields() -> Vec<CustomFieldDef> {
    use CustomFieldType::*;
    vec![
        CustomFieldDef::new(1, "Phone", Multitext)
            .with_code("PHONE")
            .with_enums([(10, "WORK"), (11, "MOB"), (12, "HOME")]),
        CustomFieldDef::new(2, "Email", Multitext)
            .with_code("EMAIL")
            .with_enums([(20, "WORK"), (21, "PRIV")]),
        CustomFieldDef::new(3, "Position", Text),
        CustomFieldDef::new(4, "Budget", Numeric),
        CustomFieldDef::new(5, "Agreed", Checkbox),
        CustomFieldDef::new(6, "Birthday", Date),
        CustomFieldDef::new(7, "Call at", DateTime),
        CustomFieldDef::new(8, "Source", Select).with_enums([(80, "Web"), (81, "Referral")]),
        CustomFieldDef::new(9, "Interests", Multiselect)
            .with_enums([(90, "Rust"), (91, "Go"), (92, "Zig")]),
        CustomFieldDef::new(13, "Skype", Text).with_code("SKYPE"),
        CustomFieldDef::new(77, "Pinned", Text),
    ]
}

pub struct Fixture {
    pub transport: Arc<MockTransport>,
    pub session: Arc<Session>,
}

impl Fixture {
    pub fn contacts(&self) -> Manager {
        Manager::new(contact(), Arc::clone(&self.session))
    }

    pub fn companies(&self) -> Manager {
        Manager::new(company(), Arc::clone(&self.session))
    }

    pub fn leads(&self) -> Manager {
        Manager::new(lead(), Arc::clone(&self.session))
    }

    pub fn users(&self) -> Manager {
        Manager::new(user(), Arc::clone(&self.session))
    }

    pub fn pipelines(&self) -> Manager {
        Manager::new(pipeline(), Arc::clone(&self.session))
    }

    pub fn notes(&self) -> Manager {
        Manager::new(note(), Arc::clone(&self.session))
    }
}

pub fn fixture() -> Fixture {
    fixture_with(MockTransport::new())
}

pub fn fixture_with(transport: MockTransport) -> Fixture {
    let transport = Arc::new(transport);
    transport.set_custom_fields("contacts", contact_fields());
    let session = Session::new(transport.clone());
    Fixture { transport, session }
}

pub fn raw(value: Value) -> RawData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Routes `tracing` output to the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
