use super::{Connector, FunctionRequest};
use crate::config::ReferenceSet;
use crate::correlation::address::{address_book, match_address, with_single_address};
use crate::correlation::AddressMatch;
use crate::criteria::{Operator, Predicate, SearchCriteria, SearchRecord, SearchValue};
use crate::envelope::{parse_read, parse_write};
use crate::error::{SuiteError, SuiteResult};
use crate::outcome::{Entity, FunctionResponse, Outcome, ResolvedDoc};
use crate::pagination::{SearchRequest, fetch_page};
use serde_json::{Value, json};
use suitelink_types::{RecordRef, RemoteRecord, internal_id_of};
use tracing::{info, warn};

/// Remote record type of customers.
const CUSTOMER_RECORD_TYPE: &str = "customer";

/// Internal ID of an address book entry: a plain `internalId` field, or the
/// attribute form.
fn address_id(address: &Value) -> Option<String> {
    match address.get("internalId") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => internal_id_of(address),
    }
}

fn require_record(doc: &Value) -> SuiteResult<&Value> {
    doc.get("record")
        .filter(|r| r.is_object())
        .ok_or_else(|| SuiteError::Validation("doc.record was not provided".to_string()))
}

fn require_id<'a>(value: &'a Option<String>, name: &str) -> SuiteResult<&'a str> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SuiteError::Validation(format!("{name} was not provided")))
}

impl Connector {
    /// Looks up a customer by its business reference values.
    pub async fn check_for_customer(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.customer_lookup(request).await)
    }

    /// Looks up a customer, then matches the request's first address
    /// against the customer's address book.
    pub async fn check_for_customer_address(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.customer_address_lookup(request).await)
    }

    /// Updates a customer's body fields. The address book is left alone.
    pub async fn update_customer(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.customer_update(request).await)
    }

    /// Updates a customer's address book and reports the updated address.
    pub async fn update_customer_address(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.customer_address_update(request).await)
    }

    /// Returns the address book of the customer in the request.
    pub fn extract_customer_address_from_customer(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(extract_address_book(request))
    }

    /// Customer search with one `is` predicate per business reference
    /// path. The remote field is the path's last segment.
    fn customer_criteria(&self, paths: &[String], doc: &Value) -> SearchCriteria {
        paths.iter().fold(SearchCriteria::new(SearchRecord::Customer), |criteria, path| {
            let field = path.rsplit('.').next().unwrap_or(path.as_str());
            let value = self
                .extractor
                .extract(std::slice::from_ref(path), doc)
                .pop()
                .unwrap_or(Value::Null);
            if value.is_null() || value.as_str() == Some("") {
                warn!("Customer business reference '{}' is missing or has no value.", path);
            }
            criteria.with_filter(Predicate::new(field, Some(Operator::Is), SearchValue::Raw(value)))
        })
    }

    async fn search_customers(&self, paths: &[String], doc: &Value) -> SuiteResult<Vec<RemoteRecord>> {
        info!("Searching for existing customer");
        let criteria = self.customer_criteria(paths, doc);
        let page = fetch_page(self.client(), SearchRequest::Fresh(&criteria)).await?;
        Ok(page.records)
    }

    async fn customer_lookup(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(ReferenceSet::Customer)?;
        require_record(&request.doc)?;

        let docs = self
            .search_customers(paths, &request.doc)
            .await?
            .into_iter()
            .map(|customer| {
                let reference = self.reference(paths, &customer.to_doc());
                ResolvedDoc::new()
                    .with_remote_id(Entity::Customer, customer.remote_id())
                    .with_reference(Entity::Customer, &reference)
            })
            .collect();
        Ok(Outcome::from_lookup(docs))
    }

    async fn customer_address_lookup(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let customer_paths = self.reference_paths(ReferenceSet::Customer)?;
        let address_paths = self.reference_paths(ReferenceSet::CustomerAddress)?;
        require_record(&request.doc)?;
        if address_book(&request.doc).is_empty() {
            return Err(SuiteError::Validation(
                "doc.record.addressbookList.addressbook was not provided".to_string(),
            ));
        }

        let mut customers = self.search_customers(customer_paths, &request.doc).await?;
        let customer = match customers.len() {
            1 => customers.remove(0),
            0 => return Err(SuiteError::Validation("No Customer Found".to_string())),
            _ => return Err(SuiteError::Validation("Multiple Customers Found".to_string())),
        };

        info!("Comparing addresses of customer {}", customer.remote_id());
        let customer_doc = customer.to_doc();
        match match_address(self.extractor.as_ref(), address_paths, &request.doc, &customer_doc) {
            AddressMatch::Empty => {
                info!("No matching address found on customer.");
                Ok(Outcome::Empty)
            }
            AddressMatch::Single(address, reference) => {
                info!("Found a matching address.");
                let mut doc = ResolvedDoc::new()
                    .with_remote_id(Entity::Customer, customer.remote_id())
                    .with_reference(Entity::CustomerAddress, &reference);
                if let Some(id) = address_id(&address) {
                    doc = doc.with_remote_id(Entity::CustomerAddress, id);
                }
                Ok(Outcome::Single(doc))
            }
            AddressMatch::Conflict(candidates) => {
                warn!("{} addresses match on customer {}", candidates.len(), customer.remote_id());
                Ok(Outcome::Conflict(candidates))
            }
        }
    }

    async fn customer_update(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(ReferenceSet::Customer)?;
        let customer_id = require_id(&request.customer_remote_id, "customerRemoteID")?;
        require_record(&request.doc)?;

        let mut update = request.doc.clone();
        if let Some(record) = update.get_mut("record").and_then(Value::as_object_mut) {
            record.remove("addressbookList");
            let attributes = record
                .entry("$attributes")
                .or_insert_with(|| json!({}));
            if let Some(attributes) = attributes.as_object_mut() {
                attributes.insert("internalId".into(), json!(customer_id));
            }
        }

        info!("Updating customer {}", customer_id);
        let response = self
            .client()
            .update(&update)
            .await
            .map_err(SuiteError::from_transport)?;
        let written = parse_write(response)?;

        let reference = self.reference(paths, &request.doc);
        Ok(Outcome::Updated(
            ResolvedDoc::new()
                .with_remote_id(Entity::Customer, written)
                .with_reference(Entity::Customer, &reference),
        ))
    }

    async fn customer_address_update(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(ReferenceSet::CustomerAddress)?;
        let customer_id = require_id(&request.customer_remote_id, "customerRemoteID")?;
        let address_remote_id =
            require_id(&request.customer_address_remote_id, "customerAddressRemoteID")?;
        if !request.doc.is_object() {
            return Err(SuiteError::Validation("doc was not provided".to_string()));
        }

        let mut record = request
            .doc
            .get("record")
            .cloned()
            .unwrap_or_else(|| request.doc.clone());
        if let Some(body) = record.as_object_mut() {
            body.insert(
                "$attributes".into(),
                json!({ "internalId": customer_id, "$xsiType": { "type": "Customer" } }),
            );
        }

        info!("Updating addresses of customer {}", customer_id);
        let response = self
            .client()
            .update(&json!({ "record": record }))
            .await
            .map_err(SuiteError::from_transport)?;
        let written = parse_write(response)?;

        info!("Retrieving updated addresses");
        let response = self
            .client()
            .get(&RecordRef::new(written, CUSTOMER_RECORD_TYPE))
            .await
            .map_err(SuiteError::from_transport)?;
        let customer_doc = parse_read(response)?.to_doc();

        let address = address_book(&customer_doc)
            .into_iter()
            .find(|a| address_id(a).as_deref() == Some(address_remote_id))
            .ok_or_else(|| {
                SuiteError::RemoteFault(format!(
                    "updated customer {customer_id} has no address {address_remote_id}"
                ))
            })?;
        let reference = self.reference(paths, &with_single_address(&customer_doc, &address));

        Ok(Outcome::Updated(
            ResolvedDoc::new()
                .with_remote_id(Entity::CustomerAddress, address_remote_id)
                .with_reference(Entity::CustomerAddress, &reference),
        ))
    }
}

fn extract_address_book(request: &FunctionRequest) -> SuiteResult<Outcome> {
    let record = require_record(&request.doc)?;
    match record.get("addressbookList").filter(|v| !v.is_null()) {
        Some(list) => Ok(Outcome::Single(ResolvedDoc::with_doc(list.clone()))),
        None => {
            warn!("No customer addresses found.");
            Ok(Outcome::Empty)
        }
    }
}
