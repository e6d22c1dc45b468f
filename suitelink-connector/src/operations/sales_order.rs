use super::{Connector, FunctionRequest};
use crate::config::ReferenceSet;
use crate::envelope::parse_write;
use crate::error::{SuiteError, SuiteResult};
use crate::outcome::{Entity, FunctionResponse, Outcome, ResolvedDoc};
use serde_json::{Value, json};
use tracing::{info, warn};

/// The `{record}` entries of `doc.records`. Must be a non-empty array.
fn records_of(doc: &Value) -> SuiteResult<&[Value]> {
    match doc.get("records") {
        None | Some(Value::Null) => Err(SuiteError::Validation(
            "doc.records was not provided".to_string(),
        )),
        Some(Value::Array(records)) if !records.is_empty() => Ok(records),
        Some(Value::Array(_)) => Err(SuiteError::Validation("doc.records is empty".to_string())),
        Some(_) => Err(SuiteError::Validation("doc.records is not an array".to_string())),
    }
}

/// The first entry whose record declares the given `$xsiType`.
fn find_typed<'a>(records: &'a [Value], xsi_type: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|r| r.pointer("/record/$attributes/$xsiType/type").and_then(Value::as_str) == Some(xsi_type))
}

impl Connector {
    /// Creates the sales order found in `doc.records`.
    pub async fn insert_sales_order(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.sales_order_insert(request).await)
    }

    /// Returns the customer found in `doc.records`. No remote calls.
    pub fn extract_customer_from_sales_order(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(extract_customer(request))
    }

    async fn sales_order_insert(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(ReferenceSet::SalesOrder)?;
        let records = records_of(&request.doc)?;
        let mut order = find_typed(records, "SalesOrder")
            .cloned()
            .ok_or_else(|| SuiteError::Validation("Sales Order Not Found".to_string()))?;

        if let Some(form) = request.hints().and_then(|h| h.custom_form.as_deref()) {
            if let Some(record) = order.get_mut("record").and_then(Value::as_object_mut) {
                record.insert("customForm".into(), json!({ "$attributes": { "internalId": form } }));
            }
        }

        info!("Inserting sales order");
        let response = self
            .client()
            .add(&order)
            .await
            .map_err(SuiteError::from_transport)?;
        let remote_id = parse_write(response)?;
        info!("Created sales order {}", remote_id);

        let reference = self.reference(paths, &order);
        Ok(Outcome::Created(
            ResolvedDoc::new()
                .with_remote_id(Entity::SalesOrder, remote_id)
                .with_reference(Entity::SalesOrder, &reference),
        ))
    }
}

fn extract_customer(request: &FunctionRequest) -> SuiteResult<Outcome> {
    let records = records_of(&request.doc)?;
    match find_typed(records, "Customer") {
        Some(customer) => Ok(Outcome::Single(ResolvedDoc::with_doc(customer.clone()))),
        None => {
            warn!("No customer found.");
            Ok(Outcome::Empty)
        }
    }
}
