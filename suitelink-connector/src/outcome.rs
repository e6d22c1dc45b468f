//! Response status resolver.
//!
//! An [`Outcome`] is the engine's classification of a finished call. The
//! resolver turns it, or the error that replaced it, into the
//! [`FunctionResponse`] the platform receives.

use crate::correlation::MatrixFamily;
use crate::correlation::matrix::families_context;
use crate::error::{SuiteError, SuiteResult};
use crate::pagination::Cursor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use suitelink_types::{BusinessReference, StatusCategory};
use tracing::{error, info, warn};

/// The kind of entity a resolved document describes. Decides the payload
/// key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    ProductPricing,
    Fulfillment,
    Customer,
    CustomerAddress,
    SalesOrder,
}

impl Entity {
    pub fn remote_id_key(self) -> &'static str {
        match self {
            Self::Product => "productRemoteID",
            Self::ProductPricing => "productPricingRemoteID",
            Self::Fulfillment => "fulfillmentRemoteID",
            Self::Customer => "customerRemoteID",
            Self::CustomerAddress => "customerAddressRemoteID",
            Self::SalesOrder => "salesOrderRemoteID",
        }
    }

    pub fn reference_key(self) -> &'static str {
        match self {
            Self::Product => "productBusinessReference",
            Self::ProductPricing => "productPricingBusinessReference",
            Self::Fulfillment => "fulfillmentBusinessReference",
            Self::Customer => "customerBusinessReference",
            Self::CustomerAddress => "customerAddressBusinessReference",
            Self::SalesOrder => "salesOrderBusinessReference",
        }
    }
}

/// One entry of a response payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDoc {
    fields: Map<String, Value>,
}

impl ResolvedDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// An entry carrying `doc`.
    pub fn with_doc(doc: Value) -> Self {
        Self::new().with("doc", doc)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn with_remote_id(self, entity: Entity, remote_id: impl Into<String>) -> Self {
        self.with(entity.remote_id_key(), remote_id.into())
    }

    pub fn with_reference(self, entity: Entity, reference: &BusinessReference) -> Self {
        self.with(entity.reference_key(), reference.key())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Caller-visible resume state.
#[derive(Debug, Clone, PartialEq)]
pub enum PagingContext {
    /// The next page of a stored search.
    Search(Cursor),
    /// Matrix families still to be read.
    Matrix(Vec<MatrixFamily>),
}

impl PagingContext {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Search(cursor) => cursor.to_context(),
            Self::Matrix(families) => families_context(families),
        }
    }
}

/// Classification of a finished call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing matched.
    Empty,
    /// Exactly one record matched.
    Single(ResolvedDoc),
    /// Several records matched where one was expected.
    Many(Vec<ResolvedDoc>),
    /// One page of a longer result.
    PartialPage(Vec<ResolvedDoc>, PagingContext),
    /// Several equally valid sub-entity matches.
    Conflict(Vec<Value>),
    /// The final page of a query result.
    Complete(Vec<ResolvedDoc>),
    Created(ResolvedDoc),
    Updated(ResolvedDoc),
}

/// Discriminant of [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Empty,
    Single,
    Many,
    PartialPage,
    Conflict,
    Complete,
    Created,
    Updated,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 8] = [
        Self::Empty,
        Self::Single,
        Self::Many,
        Self::PartialPage,
        Self::Conflict,
        Self::Complete,
        Self::Created,
        Self::Updated,
    ];

    /// The status each outcome resolves to.
    pub const fn status(self) -> StatusCategory {
        match self {
            Self::Empty => StatusCategory::NotFound,
            Self::Single => StatusCategory::Found,
            Self::Many => StatusCategory::Ambiguous,
            Self::PartialPage => StatusCategory::PartialFound,
            Self::Conflict => StatusCategory::Ambiguous,
            Self::Complete => StatusCategory::Found,
            Self::Created => StatusCategory::Created,
            Self::Updated => StatusCategory::Updated,
        }
    }
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Empty => OutcomeKind::Empty,
            Self::Single(_) => OutcomeKind::Single,
            Self::Many(_) => OutcomeKind::Many,
            Self::PartialPage(..) => OutcomeKind::PartialPage,
            Self::Conflict(_) => OutcomeKind::Conflict,
            Self::Complete(_) => OutcomeKind::Complete,
            Self::Created(_) => OutcomeKind::Created,
            Self::Updated(_) => OutcomeKind::Updated,
        }
    }

    /// A finished query page: `Empty` when it has no entries.
    pub fn from_final_page(docs: Vec<ResolvedDoc>) -> Self {
        if docs.is_empty() {
            Self::Empty
        } else {
            Self::Complete(docs)
        }
    }

    /// A query page that may have more after it.
    pub fn from_page(docs: Vec<ResolvedDoc>, next: Option<PagingContext>) -> Self {
        match next {
            Some(context) => Self::PartialPage(docs, context),
            None => Self::from_final_page(docs),
        }
    }

    /// A lookup that expects at most one match.
    pub fn from_lookup(mut docs: Vec<ResolvedDoc>) -> Self {
        match docs.len() {
            0 => Self::Empty,
            1 => Self::Single(docs.remove(0)),
            _ => Self::Many(docs),
        }
    }
}

fn docs_value(docs: Vec<ResolvedDoc>) -> Value {
    Value::Array(docs.into_iter().map(ResolvedDoc::into_value).collect())
}

/// Response handed back to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub nc_status_code: u16,
    pub status_category: StatusCategory,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_context: Option<Value>,
}

impl FunctionResponse {
    fn new(status: StatusCategory, payload: Value, paging_context: Option<Value>) -> Self {
        Self {
            nc_status_code: status.status_code(),
            status_category: status,
            payload,
            paging_context,
        }
    }

    /// Renders a successful outcome.
    pub fn from_outcome(outcome: Outcome) -> Self {
        let status = outcome.kind().status();
        info!("Resolved {:?} outcome to {} ({})", outcome.kind(), status, status.status_code());

        match outcome {
            Outcome::Empty => Self::new(status, Value::Object(Map::new()), None),
            Outcome::Single(doc) | Outcome::Created(doc) | Outcome::Updated(doc) => {
                Self::new(status, doc.into_value(), None)
            }
            Outcome::Complete(docs) => Self::new(status, docs_value(docs), None),
            Outcome::PartialPage(docs, context) => {
                Self::new(status, docs_value(docs), Some(context.to_value()))
            }
            Outcome::Many(docs) => Self::new(
                status,
                json!({
                    "error": format!("Multiple matching records found ({})", docs.len()),
                    "candidates": docs_value(docs),
                }),
                None,
            ),
            Outcome::Conflict(candidates) => Self::new(
                status,
                json!({
                    "error": format!("Multiple matching entries found ({})", candidates.len()),
                    "candidates": candidates,
                }),
                None,
            ),
        }
    }

    /// Renders a failure. Every error yields exactly one status.
    pub fn from_error(err: &SuiteError) -> Self {
        let status = err.status_category();
        match status {
            StatusCategory::ValidationError => warn!("Invalid request: {}", err),
            _ => error!("Call failed with {}: {}", status, err),
        }
        Self::new(status, json!({ "error": err.diagnostic() }), None)
    }

    /// Renders either side of an operation result.
    pub fn resolve(result: SuiteResult<Outcome>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.status_category.is_error()
    }
}
