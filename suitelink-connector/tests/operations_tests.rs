use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use suitelink_connector::client::mock::{
    MockSuiteClient, RecordedCall, child_record, empty_search, read_response,
    read_response_list, search_page, write_response,
};
use suitelink_connector::{
    BusinessReferenceConfig, Connector, ConnectorConfig, EnvironmentHints, FunctionRequest,
    OPERATIONS, TransportError,
};
use suitelink_types::{RecordRef, StatusCategory};

fn config() -> ConnectorConfig {
    ConnectorConfig {
        business_references: BusinessReferenceConfig {
            product: vec!["record.itemId".into()],
            product_pricing: vec!["record.itemId".into()],
            fulfillment: Vec::new(),
            customer: vec!["record.email".into()],
            customer_address: vec![
                "record.addressbookList.addressbook.addressbookAddress.addr1".into(),
                "record.addressbookList.addressbook.addressbookAddress.zip".into(),
            ],
            sales_order: vec!["record.externalId".into()],
        },
        ..ConnectorConfig::default()
    }
}

fn setup() -> (Arc<MockSuiteClient>, Connector) {
    let client = Arc::new(MockSuiteClient::new());
    let connector = Connector::new(client.clone(), config());
    (client, connector)
}

fn item(id: &str, sku: &str) -> Value {
    json!({ "$attributes": { "internalId": id }, "itemId": sku })
}

fn search_doc(call: &RecordedCall) -> &Value {
    match call {
        RecordedCall::Search(doc) => doc,
        other => panic!("expected a search, got {other:?}"),
    }
}

fn address(id: &str, addr1: &str, zip: &str) -> Value {
    json!({ "internalId": id, "addressbookAddress": { "addr1": addr1, "zip": zip } })
}

fn customer(id: &str, addresses: Vec<Value>) -> Value {
    json!({
        "$attributes": { "internalId": id },
        "email": "a@b.test",
        "addressbookList": { "addressbook": addresses },
    })
}

fn customer_request() -> FunctionRequest {
    FunctionRequest::with_doc(json!({
        "record": {
            "email": "a@b.test",
            "addressbookList": { "addressbook": [address("", "1 Main St", "10001")] },
        }
    }))
}

// ── Product queries ─────────────────────────────────────────────

#[tokio::test]
async fn simple_product_by_id_is_found() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![item("100", "SKU-100")], 1, 1, "S-1"));

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["100"] })))
        .await;

    assert_eq!(response.nc_status_code, 200);
    assert_eq!(response.status_category, StatusCategory::Found);
    assert_eq!(
        response.payload,
        json!([{
            "doc": { "records": [{ "record": item("100", "SKU-100") }] },
            "productRemoteID": "100",
            "productBusinessReference": "SKU-100",
        }])
    );
    assert!(response.paging_context.is_none());

    let calls = client.calls();
    let search = search_doc(&calls[0]);
    assert_eq!(search["searchRecord"]["basic"]["matrix"], json!({ "searchValue": false }));
    assert_eq!(search["searchPreferences"]["pageSize"], 10);
}

#[tokio::test]
async fn multi_page_query_returns_partial_with_context() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![item("100", "A"), item("101", "B")], 1, 2, "S-1"));

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({
            "remoteIDs": ["100", "101", "102"],
            "pageSize": 2,
        })))
        .await;

    assert_eq!(response.nc_status_code, 206);
    assert_eq!(response.payload.as_array().unwrap().len(), 2);
    assert_eq!(response.paging_context, Some(json!({ "searchId": "S-1", "index": 2 })));
    assert_eq!(search_doc(&client.calls()[0])["searchPreferences"]["pageSize"], 2);
}

#[tokio::test]
async fn paging_context_resumes_exactly_one_page() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![item("102", "C")], 2, 2, "S-1"));

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({
            "remoteIDs": ["100", "101", "102"],
            "pagingContext": { "searchId": "S-1", "index": 2 },
        })))
        .await;

    assert_eq!(response.nc_status_code, 200);
    assert_eq!(response.payload[0]["productRemoteID"], "102");
    assert_eq!(
        client.calls(),
        vec![RecordedCall::SearchMoreWithId { search_id: "S-1".into(), page_index: 2 }]
    );
}

#[tokio::test]
async fn no_matches_is_not_found() {
    let (client, connector) = setup();
    client.push_ok(empty_search());

    let response = connector
        .get_product_pricing_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["1"] })))
        .await;
    assert_eq!(response.nc_status_code, 204);
    assert_eq!(response.payload, json!({}));
}

#[tokio::test]
async fn pricing_wraps_single_record() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![item("100", "SKU-100")], 1, 1, "S-1"));

    let response = connector
        .get_product_pricing_from_query(&FunctionRequest::with_doc(json!({
            "searchFields": [{ "searchField": "itemId", "searchValues": ["SKU-100"] }],
        })))
        .await;

    assert_eq!(
        response.payload[0],
        json!({
            "doc": { "record": item("100", "SKU-100") },
            "productPricingRemoteID": "100",
            "productPricingBusinessReference": "SKU-100",
        })
    );
    let calls = client.calls();
    let basic = &search_doc(&calls[0])["searchRecord"]["basic"];
    assert_eq!(basic["itemId"]["searchValue"], json!(["SKU-100"]));
}

#[tokio::test]
async fn virtual_matrix_query_ignores_hints() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![item("100", "VM")], 1, 1, "S-1"));
    let request = FunctionRequest::with_doc(json!({ "remoteIDs": ["100"] })).with_hints(
        EnvironmentHints {
            filter_field: Some("isInactive".into()),
            filter_criteria: Some(json!(false)),
            ..Default::default()
        },
    );

    let response = connector.get_product_virtual_matrix_from_query(&request).await;
    assert_eq!(response.nc_status_code, 200);

    let calls = client.calls();
    assert!(search_doc(&calls[0])["searchRecord"]["basic"].get("isInactive").is_none());
}

#[tokio::test]
async fn date_range_query_is_translated() {
    let (client, connector) = setup();
    client.push_ok(empty_search());

    connector
        .get_product_pricing_from_query(&FunctionRequest::with_doc(json!({
            "modifiedDateRange": { "startDateGMT": "2024-01-01T00:00:00Z" },
        })))
        .await;

    let calls = client.calls();
    assert_eq!(
        search_doc(&calls[0])["searchRecord"]["basic"]["lastModifiedDate"]["searchValue"],
        "2023-12-31T23:59:59.999Z"
    );
}

// ── Request validation ──────────────────────────────────────────

#[tokio::test]
async fn conflicting_modes_are_rejected_before_any_call() {
    let (client, connector) = setup();

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({
            "remoteIDs": ["1"],
            "searchFields": [{ "searchField": "itemId", "searchValues": ["A"] }],
        })))
        .await;

    assert_eq!(response.nc_status_code, 400);
    assert_eq!(response.status_category, StatusCategory::ValidationError);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn bad_timestamp_is_a_validation_error() {
    let (client, connector) = setup();

    let response = connector
        .get_product_pricing_from_query(&FunctionRequest::with_doc(json!({
            "modifiedDateRange": { "startDateGMT": "yesterday" },
        })))
        .await;

    assert_eq!(response.status_category, StatusCategory::ValidationError);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn colliding_hint_is_rejected_before_any_call() {
    let (client, connector) = setup();
    let hints = EnvironmentHints {
        filter_field: Some("matrix".into()),
        filter_criteria: Some(json!(true)),
        ..Default::default()
    };

    let fresh = FunctionRequest::with_doc(json!({ "remoteIDs": ["100"] })).with_hints(hints.clone());
    let response = connector.get_product_simple_from_query(&fresh).await;
    assert_eq!(response.nc_status_code, 400);
    assert!(response.payload["error"].as_str().unwrap().contains("'matrix'"));

    let resumed = FunctionRequest::with_doc(json!({
        "remoteIDs": ["100"],
        "pagingContext": { "searchId": "S-1", "index": 2 },
    }))
    .with_hints(hints.clone());
    let response = connector.get_product_simple_from_query(&resumed).await;
    assert_eq!(response.nc_status_code, 400);

    let matrix = FunctionRequest::with_doc(json!({ "remoteIDs": ["100"] })).with_hints(hints);
    let response = connector.get_product_matrix_from_query(&matrix).await;
    assert_eq!(response.nc_status_code, 400);

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn repeated_search_field_is_rejected_before_any_call() {
    let (client, connector) = setup();

    let response = connector
        .get_product_pricing_from_query(&FunctionRequest::with_doc(json!({
            "searchFields": [
                { "searchField": "itemId", "searchValues": ["A"] },
                { "searchField": "itemId", "searchValues": ["B"] },
            ],
        })))
        .await;

    assert_eq!(response.status_category, StatusCategory::ValidationError);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn missing_reference_paths_are_rejected() {
    let client = Arc::new(MockSuiteClient::new());
    let connector = Connector::new(client.clone(), ConnectorConfig::default());

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["1"] })))
        .await;

    assert_eq!(response.nc_status_code, 400);
    let message = response.payload["error"].as_str().unwrap();
    assert!(message.contains("productBusinessReferences is empty"), "{message}");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn invalid_requests_never_reach_the_remote() {
    let (client, connector) = setup();

    for name in OPERATIONS {
        let response = connector.call(name, &FunctionRequest::default()).await;
        assert_eq!(response.status_category, StatusCategory::ValidationError, "{name}");
        let message = response.payload["error"].as_str().unwrap();
        assert!(!message.contains("unknown function"), "{name}: {message}");
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn unknown_function_is_rejected() {
    let (_, connector) = setup();
    let response = connector.call("delete_everything", &FunctionRequest::default()).await;
    assert_eq!(response.nc_status_code, 400);
}

// ── Remote failures ─────────────────────────────────────────────

#[tokio::test]
async fn rate_limit_is_retriable() {
    let (client, connector) = setup();
    client.push_err(TransportError::with_body(
        "server error",
        Some(500),
        "<soapenv:Fault>platformFaults:exceededConcurrentRequestLimitFault</soapenv:Fault>",
    ));

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["1"] })))
        .await;

    assert_eq!(response.nc_status_code, 429);
    assert!(response.status_category.is_retriable());
}

#[tokio::test]
async fn network_failure_is_fatal() {
    let (client, connector) = setup();
    client.push_err(TransportError::network("connection refused"));

    let response = connector
        .get_product_simple_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["1"] })))
        .await;
    assert_eq!(response.nc_status_code, 500);
}

// ── Matrix products ─────────────────────────────────────────────

#[tokio::test]
async fn matrix_query_returns_one_family_per_call() {
    let (client, connector) = setup();
    client
        .push_ok(search_page(vec![item("A", "SHIRT")], 1, 1, "P"))
        .push_ok(search_page(vec![child_record("b1", "B")], 1, 1, "C"))
        .push_ok(search_page(
            vec![
                item("A", "SHIRT"),
                child_record("a1", "A"),
                item("B", "PANTS"),
                child_record("b1", "B"),
            ],
            1,
            1,
            "F",
        ))
        .push_ok(read_response_list(vec![item("A", "SHIRT"), child_record("a1", "A")]));

    let first = connector
        .get_product_matrix_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["A", "b1"] })))
        .await;

    assert_eq!(first.nc_status_code, 206);
    assert_eq!(first.payload[0]["productRemoteID"], "A");
    assert_eq!(first.payload[0]["productBusinessReference"], "SHIRT");
    assert_eq!(
        first.payload[0]["doc"]["record"]["matrixChildren"],
        json!([{ "record": child_record("a1", "A") }])
    );
    let context = first.paging_context.clone().unwrap();
    assert_eq!(
        context,
        json!({ "parentObjects": [{ "parent": "B", "children": ["b1"] }] })
    );
    assert_eq!(client.calls().len(), 4);

    client.push_ok(read_response_list(vec![item("B", "PANTS"), child_record("b1", "B")]));
    let second = connector
        .get_product_matrix_from_query(&FunctionRequest::with_doc(json!({
            "remoteIDs": ["A", "b1"],
            "pagingContext": context,
        })))
        .await;

    assert_eq!(second.nc_status_code, 200);
    assert_eq!(second.payload[0]["productRemoteID"], "B");
    assert!(second.paging_context.is_none());
    assert_eq!(
        client.calls()[4],
        RecordedCall::GetList(vec![
            RecordRef::new("B", "inventoryItem"),
            RecordRef::new("b1", "inventoryItem"),
        ])
    );
}

#[tokio::test]
async fn matrix_query_without_families_is_not_found() {
    let (client, connector) = setup();
    client.push_ok(empty_search()).push_ok(empty_search());

    let response = connector
        .get_product_matrix_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["1"] })))
        .await;
    assert_eq!(response.nc_status_code, 204);
}

#[tokio::test]
async fn matrix_orphan_child_is_fatal() {
    let (client, connector) = setup();
    client
        .push_ok(search_page(vec![item("A", "SHIRT")], 1, 1, "P"))
        .push_ok(empty_search())
        .push_ok(search_page(vec![child_record("z1", "Z")], 1, 1, "F"));

    let response = connector
        .get_product_matrix_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["A"] })))
        .await;
    assert_eq!(response.status_category, StatusCategory::Fatal);
}

// ── Fulfillments ────────────────────────────────────────────────

#[tokio::test]
async fn fulfillment_carries_order_number() {
    let (client, connector) = setup();
    let shipped = json!({
        "$attributes": { "internalId": "F1" },
        "shipStatus": "_shipped",
        "createdFrom": { "$attributes": { "internalId": "SO1" } },
    });
    client
        .push_ok(search_page(vec![shipped.clone()], 1, 1, "S-1"))
        .push_ok(read_response(json!({ "$attributes": { "internalId": "SO1" }, "tranId": "SO-1001" })));

    let response = connector
        .get_fulfillment_from_query(&FunctionRequest::with_doc(json!({ "remoteIDs": ["F1"] })))
        .await;

    assert_eq!(response.nc_status_code, 200);
    assert_eq!(
        response.payload,
        json!([{
            "fulfillmentRemoteID": "F1",
            "salesOrderRemoteID": "SO1",
            "salesOrderBusinessReference": "SO-1001",
            "doc": { "record": shipped },
        }])
    );
    let calls = client.calls();
    assert_eq!(
        search_doc(&calls[0])["searchRecord"]["basic"]["type"]["searchValue"],
        "itemFulfillment"
    );
}

// ── Customers ───────────────────────────────────────────────────

#[tokio::test]
async fn customer_lookup_by_reference() {
    let (client, connector) = setup();
    client.push_ok(search_page(vec![customer("C1", vec![])], 1, 1, "S-1"));

    let response = connector.check_for_customer(&customer_request()).await;

    assert_eq!(response.nc_status_code, 200);
    assert_eq!(
        response.payload,
        json!({ "customerRemoteID": "C1", "customerBusinessReference": "a@b.test" })
    );
    let calls = client.calls();
    let search = search_doc(&calls[0]);
    assert_eq!(search["searchRecord"]["$attributes"]["$xsiType"]["type"], "CustomerSearch");
    assert_eq!(
        search["searchRecord"]["basic"]["email"],
        json!({ "$attributes": { "operator": "is" }, "searchValue": "a@b.test" })
    );
}

#[tokio::test]
async fn customer_lookup_outcomes() {
    let (client, connector) = setup();
    client
        .push_ok(empty_search())
        .push_ok(search_page(vec![customer("C1", vec![]), customer("C2", vec![])], 1, 1, "S-1"));

    assert_eq!(connector.check_for_customer(&customer_request()).await.nc_status_code, 204);
    let ambiguous = connector.check_for_customer(&customer_request()).await;
    assert_eq!(ambiguous.status_category, StatusCategory::Ambiguous);
    assert_eq!(ambiguous.payload["candidates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn customer_address_match_is_found() {
    let (client, connector) = setup();
    client.push_ok(search_page(
        vec![customer(
            "C1",
            vec![address("7", "9 Side Rd", "10002"), address("8", "1 Main St", "10001")],
        )],
        1,
        1,
        "S-1",
    ));

    let response = connector.check_for_customer_address(&customer_request()).await;

    assert_eq!(response.nc_status_code, 200);
    assert_eq!(
        response.payload,
        json!({
            "customerRemoteID": "C1",
            "customerAddressBusinessReference": "1 Main St.10001",
            "customerAddressRemoteID": "8",
        })
    );
}

#[tokio::test]
async fn customer_address_outcomes() {
    let (client, connector) = setup();
    client
        .push_ok(search_page(vec![customer("C1", vec![address("7", "9 Side Rd", "10002")])], 1, 1, "S"))
        .push_ok(search_page(
            vec![customer(
                "C1",
                vec![address("7", "1 Main St", "10001"), address("8", "1 Main St", "10001")],
            )],
            1,
            1,
            "S",
        ))
        .push_ok(empty_search());

    let none = connector.check_for_customer_address(&customer_request()).await;
    assert_eq!(none.nc_status_code, 204);

    let conflict = connector.check_for_customer_address(&customer_request()).await;
    assert_eq!(conflict.nc_status_code, 409);

    let no_customer = connector.check_for_customer_address(&customer_request()).await;
    assert_eq!(no_customer.status_category, StatusCategory::ValidationError);
    assert_eq!(no_customer.payload["error"], "invalid request: No Customer Found");
}

#[tokio::test]
async fn customer_address_requires_an_address() {
    let (client, connector) = setup();
    let request = FunctionRequest::with_doc(json!({ "record": { "email": "a@b.test" } }));

    let response = connector.check_for_customer_address(&request).await;
    assert_eq!(response.nc_status_code, 400);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn update_customer_leaves_addresses_alone() {
    let (client, connector) = setup();
    client.push_ok(write_response("C1"));
    let mut request = customer_request();
    request.customer_remote_id = Some("C1".into());

    let response = connector.update_customer(&request).await;

    assert_eq!(response.status_category, StatusCategory::Updated);
    assert_eq!(response.nc_status_code, 200);
    assert_eq!(
        response.payload,
        json!({ "customerRemoteID": "C1", "customerBusinessReference": "a@b.test" })
    );
    assert_eq!(
        client.calls(),
        vec![RecordedCall::Update(json!({
            "record": { "email": "a@b.test", "$attributes": { "internalId": "C1" } }
        }))]
    );
}

#[tokio::test]
async fn update_customer_requires_remote_id() {
    let (client, connector) = setup();
    let response = connector.update_customer(&customer_request()).await;
    assert_eq!(response.nc_status_code, 400);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn update_customer_address_reads_back_the_address() {
    let (client, connector) = setup();
    client.push_ok(write_response("C1")).push_ok(read_response(customer(
        "C1",
        vec![address("7", "9 Side Rd", "10002"), address("8", "1 Main St", "10001")],
    )));
    let mut request = customer_request();
    request.customer_remote_id = Some("C1".into());
    request.customer_address_remote_id = Some("8".into());

    let response = connector.update_customer_address(&request).await;

    assert_eq!(response.status_category, StatusCategory::Updated);
    assert_eq!(
        response.payload,
        json!({
            "customerAddressRemoteID": "8",
            "customerAddressBusinessReference": "1 Main St.10001",
        })
    );
    let calls = client.calls();
    let RecordedCall::Update(update) = &calls[0] else {
        panic!("expected an update, got {:?}", calls[0]);
    };
    assert_eq!(
        update["record"]["$attributes"],
        json!({ "internalId": "C1", "$xsiType": { "type": "Customer" } })
    );
    assert_eq!(calls[1], RecordedCall::Get(RecordRef::new("C1", "customer")));
}

#[tokio::test]
async fn update_customer_address_missing_after_update_is_fatal() {
    let (client, connector) = setup();
    client
        .push_ok(write_response("C1"))
        .push_ok(read_response(customer("C1", vec![address("7", "9 Side Rd", "10002")])));
    let mut request = customer_request();
    request.customer_remote_id = Some("C1".into());
    request.customer_address_remote_id = Some("8".into());

    let response = connector.update_customer_address(&request).await;
    assert_eq!(response.nc_status_code, 500);
}

// ── Sales orders ────────────────────────────────────────────────

fn order_records() -> Value {
    json!({
        "records": [
            { "record": { "$attributes": { "$xsiType": { "type": "Customer" } }, "email": "a@b.test" } },
            { "record": { "$attributes": { "$xsiType": { "type": "SalesOrder" } }, "externalId": "EXT-1" } },
        ]
    })
}

#[tokio::test]
async fn insert_sales_order_applies_custom_form() {
    let (client, connector) = setup();
    client.push_ok(write_response("900"));
    let request: FunctionRequest = serde_json::from_value(json!({
        "doc": order_records(),
        "flowContext": { "customForm": "123" },
    }))
    .unwrap();

    let response = connector.insert_sales_order(&request).await;

    assert_eq!(response.nc_status_code, 201);
    assert_eq!(
        response.payload,
        json!({ "salesOrderRemoteID": "900", "salesOrderBusinessReference": "EXT-1" })
    );
    let calls = client.calls();
    let RecordedCall::Add(added) = &calls[0] else {
        panic!("expected an add, got {:?}", calls[0]);
    };
    assert_eq!(added["record"]["customForm"], json!({ "$attributes": { "internalId": "123" } }));
    assert_eq!(added["record"]["externalId"], "EXT-1");
}

#[tokio::test]
async fn insert_without_sales_order_is_rejected() {
    let (client, connector) = setup();

    let missing = connector
        .insert_sales_order(&FunctionRequest::with_doc(json!({
            "records": [{ "record": { "$attributes": { "$xsiType": { "type": "Customer" } } } }]
        })))
        .await;
    assert_eq!(missing.payload["error"], "invalid request: Sales Order Not Found");

    let empty = connector
        .insert_sales_order(&FunctionRequest::with_doc(json!({ "records": [] })))
        .await;
    assert_eq!(empty.nc_status_code, 400);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn rejected_insert_is_protocol_fault() {
    let (client, connector) = setup();
    client.push_ok(json!({
        "writeResponse": {
            "status": {
                "$attributes": { "isSuccess": "false" },
                "statusDetail": { "code": "INVALID_FLD_VALUE" },
            }
        }
    }));

    let response = connector
        .insert_sales_order(&FunctionRequest::with_doc(order_records()))
        .await;
    assert_eq!(response.status_category, StatusCategory::ProtocolFault);
    assert_eq!(response.payload["error"], json!({ "code": "INVALID_FLD_VALUE" }));
}

// ── Extraction ──────────────────────────────────────────────────

#[test]
fn customer_is_extracted_from_sales_order() {
    let (client, connector) = setup();

    let found = connector.extract_customer_from_sales_order(&FunctionRequest::with_doc(order_records()));
    assert_eq!(found.nc_status_code, 200);
    assert_eq!(found.payload["doc"]["record"]["email"], "a@b.test");

    let missing = connector.extract_customer_from_sales_order(&FunctionRequest::with_doc(json!({
        "records": [{ "record": { "$attributes": { "$xsiType": { "type": "SalesOrder" } } } }]
    })));
    assert_eq!(missing.nc_status_code, 204);
    assert!(client.calls().is_empty());
}

#[test]
fn address_book_is_extracted_from_customer() {
    let (_, connector) = setup();

    let found = connector.extract_customer_address_from_customer(&customer_request());
    assert_eq!(found.nc_status_code, 200);
    assert_eq!(found.payload["doc"]["addressbook"][0]["addressbookAddress"]["zip"], "10001");

    let missing = connector.extract_customer_address_from_customer(&FunctionRequest::with_doc(
        json!({ "record": { "email": "a@b.test" } }),
    ));
    assert_eq!(missing.nc_status_code, 204);
}

