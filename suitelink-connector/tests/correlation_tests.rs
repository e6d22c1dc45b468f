use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use suitelink_connector::client::mock::{
    MockSuiteClient, RecordedCall, child_record, empty_search, read_response,
    read_response_list, record, search_page,
};
use suitelink_connector::correlation::matrix::{
    discover_families, families_context, families_from_context, fetch_family,
};
use suitelink_connector::correlation::address::match_address;
use suitelink_connector::correlation::{
    AddressMatch, CorrelationState, MatrixFamily, Stage, drain_search, enrich_fulfillments,
    match_candidates,
};
use suitelink_connector::translate::{QueryKind, translate};
use suitelink_connector::{EnvironmentHints, SuiteError, TransportError};
use suitelink_types::{BusinessReference, DotPathExtractor, QueryDescriptor, RecordRef, RemoteRecord};

fn remote(body: Value) -> RemoteRecord {
    RemoteRecord::from_value(body).unwrap()
}

fn remotes(bodies: Vec<Value>) -> Vec<RemoteRecord> {
    bodies.into_iter().map(remote).collect()
}

fn fulfillment(id: &str, order_id: Option<&str>, ship_status: &str) -> Value {
    let mut body = json!({
        "$attributes": { "internalId": id },
        "shipStatus": ship_status,
    });
    if let Some(order_id) = order_id {
        body["createdFrom"] = json!({ "$attributes": { "internalId": order_id } });
    }
    body
}

fn sales_order(id: &str, tran_id: &str) -> Value {
    json!({ "$attributes": { "internalId": id }, "tranId": tran_id })
}

fn family(parent: &str, children: &[&str]) -> MatrixFamily {
    MatrixFamily {
        parent: parent.to_string(),
        children: children.iter().map(|c| c.to_string()).collect(),
    }
}

// ── Draining searches ───────────────────────────────────────────

#[tokio::test]
async fn drain_collects_every_page_in_order() {
    let client = MockSuiteClient::new();
    client
        .push_ok(search_page(vec![record("1"), record("2")], 1, 2, "S-1"))
        .push_ok(search_page(vec![record("3")], 2, 2, "S-1"));
    let criteria = translate(
        QueryKind::MatrixParents,
        &QueryDescriptor::exact_ids(["1", "2", "3"]).unwrap(),
        None,
    )
    .unwrap();

    let records = drain_search(&client, &criteria).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.remote_id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(client.pending(), 0);
}

// ── Matrix discovery state ──────────────────────────────────────

#[test]
fn stages_run_in_order() {
    let mut state = CorrelationState::new();
    assert_eq!(state.stage(), Stage::ParentScan);
    state.advance().unwrap();
    assert_eq!(state.stage(), Stage::ChildScan);
    state.advance().unwrap();
    assert_eq!(state.stage(), Stage::FullFetch);

    let err = state.advance().unwrap_err();
    assert!(matches!(err, SuiteError::CorrelationDefect(_)));
}

#[test]
fn overlapping_pages_do_not_duplicate() {
    let mut state = CorrelationState::new();
    state.absorb(&remotes(vec![record("A"), record("B")])).unwrap();
    state.absorb(&remotes(vec![record("B")])).unwrap();

    state.advance().unwrap();
    state
        .absorb(&remotes(vec![child_record("a1", "A"), child_record("c1", "C")]))
        .unwrap();
    assert_eq!(state.parent_ids(), ["A", "B", "C"]);

    state.advance().unwrap();
    let full = remotes(vec![
        record("A"),
        child_record("a1", "A"),
        child_record("a2", "A"),
        child_record("c1", "C"),
    ]);
    state.absorb(&full).unwrap();
    state.absorb(&full[1..2]).unwrap();

    assert_eq!(state.children_of("A"), ["a1", "a2"]);
    assert!(state.children_of("B").is_empty());
    assert_eq!(
        state.into_families(),
        vec![family("A", &["a1", "a2"]), family("B", &[]), family("C", &["c1"])]
    );
}

#[test]
fn child_without_parent_reference_is_a_defect() {
    let mut state = CorrelationState::new();
    state.advance().unwrap();
    let err = state.absorb(&remotes(vec![record("x")])).unwrap_err();
    assert!(matches!(err, SuiteError::CorrelationDefect(_)));
}

#[test]
fn child_of_undiscovered_parent_is_a_defect() {
    let mut state = CorrelationState::new();
    state.absorb(&remotes(vec![record("A")])).unwrap();
    state.advance().unwrap();
    state.advance().unwrap();

    let err = state.absorb(&remotes(vec![child_record("z1", "Z")])).unwrap_err();
    match err {
        SuiteError::CorrelationDefect(message) => assert!(message.contains("undiscovered parent Z")),
        other => panic!("expected correlation defect, got {other:?}"),
    }
}

// ── Matrix discovery against the remote ─────────────────────────

#[tokio::test]
async fn discovery_runs_three_scans() {
    let client = MockSuiteClient::new();
    client
        .push_ok(search_page(vec![record("A")], 1, 1, "P"))
        .push_ok(search_page(vec![child_record("b1", "B")], 1, 1, "C"))
        .push_ok(search_page(
            vec![
                record("A"),
                child_record("a1", "A"),
                record("B"),
                child_record("b1", "B"),
            ],
            1,
            1,
            "F",
        ));
    let descriptor = QueryDescriptor::exact_ids(["A", "b1"]).unwrap();

    let families = discover_families(&client, &descriptor, None, Some(5)).await.unwrap();
    assert_eq!(families, vec![family("A", &["a1"]), family("B", &["b1"])]);

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    let RecordedCall::Search(full) = &calls[2] else {
        panic!("expected a search, got {:?}", calls[2]);
    };
    assert_eq!(
        full["searchRecord"]["parentJoin"]["internalId"]["searchValue"],
        json!([
            { "$attributes": { "internalId": "A" } },
            { "$attributes": { "internalId": "B" } },
        ])
    );
    assert_eq!(full["searchPreferences"]["pageSize"], 5);
}

#[tokio::test]
async fn discovery_without_parents_stops_early() {
    let client = MockSuiteClient::new();
    client.push_ok(empty_search()).push_ok(empty_search());
    let descriptor = QueryDescriptor::exact_ids(["1"]).unwrap();

    let families = discover_families(&client, &descriptor, None, None).await.unwrap();
    assert!(families.is_empty());
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn fetch_family_attaches_children() {
    let client = MockSuiteClient::new();
    client.push_ok(read_response_list(vec![
        json!({ "$attributes": { "internalId": "A" }, "itemId": "SHIRT" }),
        child_record("a1", "A"),
        child_record("a2", "A"),
    ]));

    let parent = fetch_family(&client, &family("A", &["a1", "a2"])).await.unwrap();
    assert_eq!(parent.remote_id(), "A");
    let children = parent.body()["matrixChildren"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["record"]["$attributes"]["internalId"], "a1");

    assert_eq!(
        client.calls(),
        vec![RecordedCall::GetList(vec![
            RecordRef::new("A", "inventoryItem"),
            RecordRef::new("a1", "inventoryItem"),
            RecordRef::new("a2", "inventoryItem"),
        ])]
    );
}

#[tokio::test]
async fn fetch_family_without_parent_is_a_defect() {
    let client = MockSuiteClient::new();
    client.push_ok(read_response_list(vec![child_record("a1", "A")]));

    let err = fetch_family(&client, &family("A", &["a1"])).await.unwrap_err();
    assert!(matches!(err, SuiteError::CorrelationDefect(_)));
}

#[test]
fn family_worklist_survives_paging_context() {
    let families = vec![family("A", &["a1"]), family("B", &[])];
    let context = families_context(&families);
    assert_eq!(
        context,
        json!({ "parentObjects": [
            { "parent": "A", "children": ["a1"] },
            { "parent": "B", "children": [] },
        ] })
    );
    assert_eq!(families_from_context(&context).unwrap(), families);

    let err = families_from_context(&json!({ "searchId": "S" })).unwrap_err();
    assert!(matches!(err, SuiteError::Validation(_)));
}

// ── Fulfillment enrichment ──────────────────────────────────────

#[tokio::test]
async fn enrichment_preserves_order_and_skips_unlinked() {
    let client = MockSuiteClient::new();
    client
        .push_ok(read_response(sales_order("SO1", "SO-1001")))
        .push_ok(read_response(sales_order("SO3", "SO-1003")));
    let records = remotes(vec![
        fulfillment("F1", Some("SO1"), "_shipped"),
        fulfillment("F2", None, "_shipped"),
        fulfillment("F3", Some("SO3"), "_shipped"),
    ]);

    let enriched = enrich_fulfillments(&client, records, None).await.unwrap();
    let pairs: Vec<(&str, &str, &str)> = enriched
        .iter()
        .map(|e| (e.fulfillment.remote_id(), e.sales_order_id.as_str(), e.order_number.as_str()))
        .collect();
    assert_eq!(pairs, vec![("F1", "SO1", "SO-1001"), ("F3", "SO3", "SO-1003")]);
    assert_eq!(
        client.calls(),
        vec![
            RecordedCall::Get(RecordRef::new("SO1", "salesOrder")),
            RecordedCall::Get(RecordRef::new("SO3", "salesOrder")),
        ]
    );
}

#[tokio::test]
async fn ship_status_hint_filters_before_lookup() {
    let client = MockSuiteClient::new();
    client.push_ok(read_response(sales_order("SO2", "SO-1002")));
    let hints = EnvironmentHints {
        ship_status: Some("_shipped".into()),
        ..Default::default()
    };
    let records = remotes(vec![
        fulfillment("F1", Some("SO1"), "_picked"),
        fulfillment("F2", Some("SO2"), "_shipped"),
    ]);

    let enriched = enrich_fulfillments(&client, records, Some(&hints)).await.unwrap();
    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].fulfillment.remote_id(), "F2");
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn failed_lookup_fails_the_page() {
    let client = MockSuiteClient::new();
    client
        .push_ok(read_response(sales_order("SO1", "SO-1001")))
        .push_err(TransportError::network("connection reset"));
    let records = remotes(vec![
        fulfillment("F1", Some("SO1"), "_shipped"),
        fulfillment("F2", Some("SO2"), "_shipped"),
    ]);

    let err = enrich_fulfillments(&client, records, None).await.unwrap_err();
    assert!(matches!(err, SuiteError::RemoteFault(_)));
}

#[tokio::test]
async fn order_without_number_is_a_defect() {
    let client = MockSuiteClient::new();
    client.push_ok(read_response(json!({ "$attributes": { "internalId": "SO1" } })));
    let records = remotes(vec![fulfillment("F1", Some("SO1"), "_shipped")]);

    let err = enrich_fulfillments(&client, records, None).await.unwrap_err();
    assert!(matches!(err, SuiteError::CorrelationDefect(msg) if msg.contains("SO1")));
}

// ── Address matching ────────────────────────────────────────────

fn address(id: &str, addr1: &str, zip: &str) -> Value {
    json!({ "internalId": id, "addressbookAddress": { "addr1": addr1, "zip": zip } })
}

fn customer_with(addresses: Vec<Value>) -> Value {
    json!({ "record": { "email": "a@b.test", "addressbookList": { "addressbook": addresses } } })
}

fn address_paths() -> Vec<String> {
    vec![
        "record.addressbookList.addressbook.addressbookAddress.addr1".to_string(),
        "record.addressbookList.addressbook.addressbookAddress.zip".to_string(),
    ]
}

#[test]
fn candidates_resolve_by_match_count() {
    let target = BusinessReference::from_values(vec![json!("x")]);
    let reference_of = |v: &Value| BusinessReference::from_values(vec![v["key"].clone()]);

    assert_eq!(
        match_candidates(&target, vec![json!({ "key": "y" })], reference_of),
        AddressMatch::Empty
    );
    assert_eq!(
        match_candidates(&target, vec![json!({ "key": "x" }), json!({ "key": "y" })], reference_of),
        AddressMatch::Single(json!({ "key": "x" }), target.clone())
    );
    let AddressMatch::Conflict(all) = match_candidates(
        &target,
        vec![json!({ "key": "x", "n": 1 }), json!({ "key": "x", "n": 2 })],
        reference_of,
    ) else {
        panic!("expected a conflict");
    };
    assert_eq!(all.len(), 2);
}

#[test]
fn address_matches_projected_customer() {
    let target = customer_with(vec![address("", "1 Main St", "10001")]);
    let customer = customer_with(vec![
        address("7", "9 Side Rd", "10002"),
        address("8", "1 Main St", "10001"),
    ]);

    let AddressMatch::Single(found, reference) =
        match_address(&DotPathExtractor, &address_paths(), &target, &customer)
    else {
        panic!("expected a single match");
    };
    assert_eq!(found["internalId"], "8");
    assert_eq!(reference.key(), "1 Main St.10001");
}

#[test]
fn duplicate_addresses_conflict() {
    let target = customer_with(vec![address("", "1 Main St", "10001")]);
    let customer = customer_with(vec![
        address("7", "1 Main St", "10001"),
        address("8", "1 Main St", "10001"),
    ]);

    let result = match_address(&DotPathExtractor, &address_paths(), &target, &customer);
    assert!(matches!(result, AddressMatch::Conflict(ref all) if all.len() == 2));
}

#[test]
fn customer_without_addresses_is_empty() {
    let target = customer_with(vec![address("", "1 Main St", "10001")]);
    let customer = json!({ "record": { "email": "a@b.test" } });

    assert_eq!(
        match_address(&DotPathExtractor, &address_paths(), &target, &customer),
        AddressMatch::Empty
    );
}
