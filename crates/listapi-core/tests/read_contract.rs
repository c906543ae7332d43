//! Contract Test: Reads
//!
//! Constraints verified:
//! - A read nests its rows under the list's collection key
//! - A cursor is always drained before the outcome is decided
//! - A failure reported at the end of iteration discards every row
//! - Every opened cursor is finalized exactly once, on every path
//! - Group memberships are rebuilt from the store's aggregate
//!
//! If this test fails, clients can receive partial or stale lists.

mod common;

use common::*;
use listapi_core::{
    Kind, ListStore, ListVariant, RowWrite, Scope, StoreError, TableRow, WriteMode,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn drained_failure_discards_all_rows() {
    let rows = vec![
        domain_row(1, "a.example", "deny/exact", None),
        domain_row(2, "b.example", "deny/exact", Some("1")),
    ];
    let store = Arc::new(ScriptedStore::failing_after(
        rows,
        StoreError::new("disk I/O error"),
    ));
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/domains/deny/exact"));

    assert_eq!(response.status, 400);
    let error = error_of(&response);
    assert_eq!(error["key"], "database_error");
    assert_eq!(error["message"], "Could not read from database table");
    assert_eq!(error["data"], json!({ "argument": null, "sql_msg": "disk I/O error" }));
    assert!(body(&response).get("domains").is_none());

    assert_eq!(store.counts.cursors_opened(), 1);
    assert_eq!(store.counts.cursors_finalized(), 1);
}

#[test]
fn failure_without_diagnostic_has_null_sql_msg() {
    let store = Arc::new(ScriptedStore::failing_after(Vec::new(), StoreError::unspecified()));
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/clients/10.0.0.1"));

    assert_eq!(response.status, 400);
    assert_eq!(
        error_of(&response)["data"],
        json!({ "argument": "10.0.0.1", "sql_msg": null })
    );
    assert_eq!(store.counts.cursors_finalized(), 1);
}

#[test]
fn open_failure_is_a_database_error() {
    let store = Arc::new(ScriptedStore::failing_open(StoreError::new("no such table: adlist")));
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/adlists"));

    assert_eq!(response.status, 400);
    assert_eq!(error_of(&response)["data"]["sql_msg"], "no such table: adlist");
    // Nothing was opened, so nothing is finalized
    assert_eq!(store.counts.cursors_finalized(), 0);
}

#[test]
fn group_aggregate_is_rebuilt_as_an_array() {
    let rows = vec![
        domain_row(1, "a.example", "allow/exact", Some("1,2,3")),
        domain_row(2, "b.example", "allow/exact", None),
        domain_row(3, "c.example", "allow/exact", Some("0")),
    ];
    let store = Arc::new(ScriptedStore::with_rows(rows));
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/domains/allow/exact"));

    assert_eq!(response.status, 200);
    let domains = &body(&response)["domains"];
    assert_eq!(domains[0]["groups"], json!([1, 2, 3]));
    assert_eq!(domains[1]["groups"], json!([]));
    assert_eq!(domains[2]["groups"], json!([0]));
    assert_eq!(store.counts.cursors_finalized(), 1);
}

#[test]
fn malformed_group_aggregate_fails_the_whole_read() {
    let rows = vec![
        domain_row(1, "a.example", "allow/exact", Some("1")),
        domain_row(2, "b.example", "allow/exact", Some("1,,2")),
        domain_row(3, "c.example", "allow/exact", Some("3")),
    ];
    let store = Arc::new(ScriptedStore::with_rows(rows));
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/domains/allow/exact"));

    assert_eq!(response.status, 400);
    assert_eq!(error_of(&response)["key"], "database_error");
    assert_eq!(store.counts.cursors_finalized(), 1);
}

#[test]
fn rows_are_projected_per_list() {
    let group = TableRow {
        id: 4,
        name: Some("office".to_string()),
        description: None,
        enabled: false,
        date_added: 10,
        date_modified: 20,
        ..TableRow::default()
    };
    let store = Arc::new(ScriptedStore::with_rows(vec![group]));
    let dispatcher = open_dispatcher(store);

    let response = dispatcher.handle(&get("/api/groups/office"));

    assert_eq!(
        body(&response),
        &json!({
            "groups": [{
                "id": 4,
                "name": "office",
                "description": null,
                "enabled": false,
                "date_added": 10,
                "date_modified": 20
            }]
        })
    );
}

#[test]
fn clients_use_the_domain_projection() {
    let store = Arc::new(CountingStore::new());
    store
        .inner()
        .add_or_update(
            ListVariant::Clients,
            &RowWrite::new("192.168.1.20", true).with_comment("printer"),
            WriteMode::Create,
        )
        .unwrap();
    let dispatcher = open_dispatcher(store.clone());

    let response = dispatcher.handle(&get("/api/clients"));

    let client = &body(&response)["domains"][0];
    assert_eq!(client["domain"], "192.168.1.20");
    assert_eq!(client["comment"], "printer");
    assert_eq!(client["groups"], json!([]));
    assert_eq!(store.counts.cursors_opened(), store.counts.cursors_finalized());
}

#[test]
fn broad_lists_read_across_types() {
    let store = Arc::new(CountingStore::new());
    for (scope, kind, domain) in [
        (Scope::Allow, Kind::Exact, "a.example"),
        (Scope::Allow, Kind::Regex, "^a"),
        (Scope::Deny, Kind::Exact, "d.example"),
        (Scope::Deny, Kind::Regex, "^d"),
    ] {
        store
            .inner()
            .add_or_update(
                ListVariant::domains(scope, kind),
                &RowWrite::new(domain, true),
                WriteMode::Create,
            )
            .unwrap();
    }
    let dispatcher = open_dispatcher(store.clone());

    let count = |path: &str| {
        body(&dispatcher.handle(&get(path)))["domains"]
            .as_array()
            .map(Vec::len)
    };
    assert_eq!(count("/api/domains"), Some(4));
    assert_eq!(count("/api/domains/allow"), Some(2));
    assert_eq!(count("/api/domains/regex"), Some(2));
    assert_eq!(count("/api/domains/deny/regex"), Some(1));
    assert_eq!(count("/api/domains/deny/regex/%5Ed"), Some(1));
    assert_eq!(count("/api/domains/deny/regex/%5Ea"), Some(0));

    assert_eq!(store.counts.cursors_opened(), 6);
    assert_eq!(store.counts.cursors_finalized(), 6);
}
