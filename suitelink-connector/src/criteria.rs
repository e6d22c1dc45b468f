//! Remote search criteria.
//!
//! A [`SearchCriteria`] is the typed form of the remote search record. It
//! keeps the descriptor-derived predicate group separate from the predicates
//! added by hints and correlation stages, so callers can see exactly which
//! part came from where. All parts are ANDed by the remote.

use crate::error::{SuiteError, SuiteResult};
use serde_json::{Map, Value, json};
use std::collections::HashSet;

/// Basic-record field holding the record type restriction.
const RECORD_TYPE_FIELD: &str = "type";
/// Basic-record field holding the custom field predicates.
const CUSTOM_FIELD_LIST: &str = "customFieldList";

/// Which remote search a criteria object targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRecord {
    /// Item search restricted to inventory items.
    Item,
    /// Transaction search restricted to item fulfillments.
    Fulfillment,
    /// Customer search.
    Customer,
}

impl SearchRecord {
    /// Remote search record type name.
    pub fn search_type(self) -> &'static str {
        match self {
            Self::Item => "ItemSearch",
            Self::Fulfillment => "TransactionSearch",
            Self::Customer => "CustomerSearch",
        }
    }

    /// Remote record type filter applied to every search of this kind.
    pub fn record_type(self) -> Option<&'static str> {
        match self {
            Self::Item => Some("inventoryItem"),
            Self::Fulfillment => Some("itemFulfillment"),
            Self::Customer => None,
        }
    }
}

/// Comparison operator of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    AnyOf,
    Is,
    On,
    OnOrAfter,
    OnOrBefore,
    Within,
    Empty,
    /// Operator name passed through from environment hints.
    Custom(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AnyOf => "anyOf",
            Self::Is => "is",
            Self::On => "on",
            Self::OnOrAfter => "onOrAfter",
            Self::OnOrBefore => "onOrBefore",
            Self::Within => "within",
            Self::Empty => "empty",
            Self::Custom(name) => name,
        }
    }
}

/// Value side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    /// Record references by internal ID.
    Refs(Vec<String>),
    /// A single record reference.
    Ref(String),
    /// Plain values.
    Texts(Vec<String>),
    Text(String),
    Bool(bool),
    /// Lower and upper bound for `within`.
    Range(String, String),
    /// A value passed through untouched.
    Raw(Value),
    /// Operator-only predicates such as `empty`.
    None,
}

impl SearchValue {
    fn write_into(&self, out: &mut Map<String, Value>) {
        let refs = |ids: &[String]| -> Value {
            ids.iter()
                .map(|id| json!({ "$attributes": { "internalId": id } }))
                .collect()
        };
        match self {
            Self::Refs(ids) => {
                out.insert("searchValue".into(), refs(ids));
            }
            Self::Ref(id) => {
                out.insert(
                    "searchValue".into(),
                    json!({ "$attributes": { "internalId": id } }),
                );
            }
            Self::Texts(values) => {
                out.insert("searchValue".into(), json!(values));
            }
            Self::Text(value) => {
                out.insert("searchValue".into(), json!(value));
            }
            Self::Bool(value) => {
                out.insert("searchValue".into(), json!(value));
            }
            Self::Range(low, high) => {
                out.insert("searchValue".into(), json!(low));
                out.insert("searchValue2".into(), json!(high));
            }
            Self::Raw(value) => {
                out.insert("searchValue".into(), value.clone());
            }
            Self::None => {}
        }
    }
}

/// A `field <operator> value` predicate on the basic search record.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Option<Operator>,
    pub value: SearchValue,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Option<Operator>, value: SearchValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field anyOf values`.
    pub fn any_of(field: impl Into<String>, value: SearchValue) -> Self {
        Self::new(field, Some(Operator::AnyOf), value)
    }

    /// A boolean flag predicate with no operator.
    pub fn flag(field: impl Into<String>, value: bool) -> Self {
        Self::new(field, None, SearchValue::Bool(value))
    }

    fn to_document(&self) -> Value {
        let mut out = Map::new();
        if let Some(op) = &self.operator {
            out.insert("$attributes".into(), json!({ "operator": op.as_str() }));
        }
        self.value.write_into(&mut out);
        Value::Object(out)
    }
}

/// Custom field type of a [`CustomFieldPredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFieldKind {
    Boolean,
    String,
}

impl CustomFieldKind {
    fn xsi_type(self) -> &'static str {
        match self {
            Self::Boolean => "SearchBooleanCustomField",
            Self::String => "SearchStringCustomField",
        }
    }
}

/// A predicate on a custom field, addressed by script ID.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFieldPredicate {
    pub script_id: String,
    pub kind: CustomFieldKind,
    pub operator: Option<Operator>,
    pub value: SearchValue,
}

impl CustomFieldPredicate {
    fn to_document(&self) -> Value {
        let mut attributes = Map::new();
        attributes.insert("$xsiType".into(), json!({ "type": self.kind.xsi_type() }));
        if let Some(op) = &self.operator {
            attributes.insert("operator".into(), json!(op.as_str()));
        }
        attributes.insert("scriptId".into(), json!(self.script_id));

        let mut out = Map::new();
        out.insert("$attributes".into(), Value::Object(attributes));
        self.value.write_into(&mut out);
        Value::Object(out)
    }
}

/// The descriptor-derived part of a criteria object. Exactly one per search.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateGroup {
    /// `internalId anyOf [...]`.
    InternalIds(Predicate),
    /// One `anyOf` predicate per field filter, in input order.
    FieldFilters(Vec<Predicate>),
    /// A `lastModifiedDate` comparison.
    LastModified(Predicate),
}

impl PredicateGroup {
    pub fn predicates(&self) -> &[Predicate] {
        match self {
            Self::InternalIds(p) | Self::LastModified(p) => std::slice::from_ref(p),
            Self::FieldFilters(ps) => ps,
        }
    }
}

/// A complete remote search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub record: SearchRecord,
    pub base: Option<PredicateGroup>,
    /// Hint and stage predicates, ANDed with the base group.
    pub filters: Vec<Predicate>,
    pub custom_fields: Vec<CustomFieldPredicate>,
    /// Restricts results to records whose parent is any of these IDs.
    pub parent_join: Option<Vec<String>>,
    pub page_size: Option<u32>,
}

impl SearchCriteria {
    /// An unfiltered search of the given record kind.
    pub fn new(record: SearchRecord) -> Self {
        Self {
            record,
            base: None,
            filters: Vec::new(),
            custom_fields: Vec::new(),
            parent_join: None,
            page_size: None,
        }
    }

    pub fn with_base(mut self, base: PredicateGroup) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn with_custom_field(mut self, predicate: CustomFieldPredicate) -> Self {
        self.custom_fields.push(predicate);
        self
    }

    pub fn with_parent_join(mut self, parent_ids: Vec<String>) -> Self {
        self.parent_join = Some(parent_ids);
        self
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Iterates base predicates followed by hint/stage predicates.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.base
            .iter()
            .flat_map(|g| g.predicates().iter())
            .chain(self.filters.iter())
    }

    /// The predicate on `field`, if any.
    pub fn predicate(&self, field: &str) -> Option<&Predicate> {
        self.predicates().find(|p| p.field == field)
    }

    /// Rejects criteria in which two parts would claim the same field of the
    /// basic search record. The record type restriction and the custom field
    /// list count as claims.
    pub fn check_fields(&self) -> SuiteResult<()> {
        let mut claimed: HashSet<&str> = HashSet::new();
        if self.record.record_type().is_some() {
            claimed.insert(RECORD_TYPE_FIELD);
        }
        if !self.custom_fields.is_empty() {
            claimed.insert(CUSTOM_FIELD_LIST);
        }
        for predicate in self.predicates() {
            if !claimed.insert(predicate.field.as_str()) {
                return Err(SuiteError::Validation(format!(
                    "search field '{}' is already constrained by this search",
                    predicate.field
                )));
            }
        }
        Ok(())
    }

    /// Renders the remote search record document. Fields are keyed by name,
    /// so criteria must pass [`check_fields`](Self::check_fields) first.
    pub fn to_document(&self) -> Value {
        let mut basic = Map::new();
        if let Some(record_type) = self.record.record_type() {
            basic.insert(
                RECORD_TYPE_FIELD.into(),
                Predicate::any_of(RECORD_TYPE_FIELD, SearchValue::Text(record_type.into()))
                    .to_document(),
            );
        }
        for predicate in self.predicates() {
            basic.insert(predicate.field.clone(), predicate.to_document());
        }
        if !self.custom_fields.is_empty() {
            let fields: Vec<Value> = self.custom_fields.iter().map(|c| c.to_document()).collect();
            basic.insert(CUSTOM_FIELD_LIST.into(), json!({ "customField": fields }));
        }

        let mut search_record = Map::new();
        search_record.insert(
            "$attributes".into(),
            json!({ "$xsiType": { "type": self.record.search_type() } }),
        );
        search_record.insert("basic".into(), Value::Object(basic));
        if let Some(parent_ids) = &self.parent_join {
            let join = Predicate::any_of("internalId", SearchValue::Refs(parent_ids.clone()));
            search_record.insert(
                "parentJoin".into(),
                json!({ "internalId": join.to_document() }),
            );
        }

        let mut document = json!({ "searchRecord": Value::Object(search_record) });
        if let Some(page_size) = self.page_size {
            document["searchPreferences"] = json!({ "bodyFieldsOnly": false, "pageSize": page_size });
        }
        document
    }
}
