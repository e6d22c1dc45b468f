//! Query translation: descriptor + hints → remote search criteria.
//!
//! Pure mapping, no I/O. Translation fails when a hint or a descriptor
//! filter lands on a field another part of the search already constrains.

use crate::criteria::{
    Operator, Predicate, PredicateGroup, SearchCriteria, SearchRecord, SearchValue,
};
use crate::error::SuiteResult;
use crate::hints::EnvironmentHints;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use suitelink_types::{DateRange, QueryDescriptor};
use tracing::debug;

/// Remote field holding a record's identity.
pub const IDENTITY_FIELD: &str = "internalId";
/// Remote field holding a record's last modification time.
pub const MODIFIED_FIELD: &str = "lastModifiedDate";
/// Boolean field selecting matrix parents.
pub const MATRIX_PARENT_FIELD: &str = "matrix";
/// Boolean field selecting matrix children.
pub const MATRIX_CHILD_FIELD: &str = "matrixChild";

/// Which logical query a criteria object is built for. Determines the
/// search record and which hints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Non-matrix inventory items.
    ProductSimple,
    ProductPricing,
    ProductVirtualMatrix,
    /// Matrix parents (`matrix = true`).
    MatrixParents,
    /// Matrix children (`matrixChild = true`).
    MatrixChildren,
    Fulfillment,
}

impl QueryKind {
    pub fn search_record(self) -> SearchRecord {
        match self {
            Self::Fulfillment => SearchRecord::Fulfillment,
            _ => SearchRecord::Item,
        }
    }
}

/// Builds the descriptor-derived predicate group.
pub fn base_group(descriptor: &QueryDescriptor) -> PredicateGroup {
    match descriptor {
        QueryDescriptor::ExactIds(ids) => {
            PredicateGroup::InternalIds(Predicate::any_of(IDENTITY_FIELD, SearchValue::Refs(ids.clone())))
        }
        QueryDescriptor::FieldFilters(filters) => PredicateGroup::FieldFilters(
            filters
                .iter()
                .map(|f| Predicate::any_of(f.field(), SearchValue::Texts(f.values().to_vec())))
                .collect(),
        ),
        QueryDescriptor::ModifiedDateRange(range) => PredicateGroup::LastModified(modified_predicate(range)),
    }
}

/// Widens the bounds by one millisecond outward so the remote's strict
/// comparisons behave inclusively.
fn modified_predicate(range: &DateRange) -> Predicate {
    let widen_start = |t: DateTime<Utc>| iso_millis(t - Duration::milliseconds(1));
    let widen_end = |t: DateTime<Utc>| iso_millis(t + Duration::milliseconds(1));

    let (operator, value) = match (range.start(), range.end()) {
        (Some(start), Some(end)) => (
            Operator::Within,
            SearchValue::Range(widen_start(start), widen_end(end)),
        ),
        (Some(start), None) => (Operator::OnOrAfter, SearchValue::Text(widen_start(start))),
        (None, Some(end)) => (Operator::OnOrBefore, SearchValue::Text(widen_end(end))),
        // DateRange guarantees at least one bound.
        (None, None) => (Operator::OnOrAfter, SearchValue::None),
    };
    Predicate::new(MODIFIED_FIELD, Some(operator), value)
}

fn iso_millis(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Translates a descriptor into search criteria for `kind`, composing any
/// hints by AND.
pub fn translate(
    kind: QueryKind,
    descriptor: &QueryDescriptor,
    hints: Option<&EnvironmentHints>,
) -> SuiteResult<SearchCriteria> {
    debug!("Building search criteria: {:?} by {}", kind, descriptor.mode_name());

    let criteria = SearchCriteria::new(kind.search_record()).with_base(base_group(descriptor));
    let criteria = apply_kind(kind, criteria, hints);
    criteria.check_fields()?;
    Ok(criteria)
}

/// Criteria for the full matrix fetch: every record joined to one of the
/// discovered parents. Only the filter hint applies.
pub fn parent_join(
    parent_ids: Vec<String>,
    hints: Option<&EnvironmentHints>,
) -> SuiteResult<SearchCriteria> {
    let criteria = SearchCriteria::new(SearchRecord::Item).with_parent_join(parent_ids);
    let criteria = match hints {
        Some(h) => h.apply_filter(criteria),
        None => criteria,
    };
    criteria.check_fields()?;
    Ok(criteria)
}

fn apply_kind(
    kind: QueryKind,
    criteria: SearchCriteria,
    hints: Option<&EnvironmentHints>,
) -> SearchCriteria {
    let default_hints = EnvironmentHints::default();
    let hints = hints.unwrap_or(&default_hints);

    match kind {
        QueryKind::ProductSimple => {
            let criteria = criteria
                .with_filter(Predicate::flag(MATRIX_PARENT_FIELD, false))
                .with_filter(Predicate::flag(MATRIX_CHILD_FIELD, false));
            hints.apply_virtual_matrix_exclusions(hints.apply_filter(criteria))
        }
        QueryKind::ProductPricing => hints.apply_filter(criteria),
        QueryKind::ProductVirtualMatrix => criteria,
        QueryKind::MatrixParents => {
            hints.apply_filter(criteria.with_filter(Predicate::flag(MATRIX_PARENT_FIELD, true)))
        }
        QueryKind::MatrixChildren => {
            hints.apply_filter(criteria.with_filter(Predicate::flag(MATRIX_CHILD_FIELD, true)))
        }
        QueryKind::Fulfillment => hints.apply_fulfillment(criteria),
    }
}
