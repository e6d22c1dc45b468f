//! Query descriptors.
//!
//! A descriptor is the validated, mode-exclusive form of the inbound query
//! document. The inbound [`QueryDoc`] mirrors what the integration platform
//! sends; [`QueryDescriptor::try_from`] performs all checks that must happen
//! before any remote call is made.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inbound query document as sent by the integration platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDoc {
    #[serde(rename = "remoteIDs", default, skip_serializing_if = "Option::is_none")]
    pub remote_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<Vec<SearchFieldDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date_range: Option<DateRangeDoc>,
    /// Opaque resume context handed back from a previous partial response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_context: Option<serde_json::Value>,
    /// Remote page size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// One `{searchField, searchValues}` pair of the inbound document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFieldDoc {
    #[serde(default)]
    pub search_field: String,
    #[serde(default)]
    pub search_values: Vec<String>,
}

/// Inbound modified-date range, bounds as RFC 3339 strings or `YYYY-MM-DD`
/// dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeDoc {
    #[serde(rename = "startDateGMT", default, skip_serializing_if = "Option::is_none")]
    pub start_date_gmt: Option<String>,
    #[serde(rename = "endDateGMT", default, skip_serializing_if = "Option::is_none")]
    pub end_date_gmt: Option<String>,
}

/// A single field filter: the field must equal any of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    field: String,
    values: Vec<String>,
}

impl FieldFilter {
    /// Creates a filter, rejecting an empty field name or value list.
    pub fn new(field: impl Into<String>, values: Vec<String>) -> Result<Self> {
        let field = field.into();
        if field.is_empty() || values.is_empty() {
            return Err(Error::Validation(format!(
                "search field '{field}' must have a name and at least 1 value"
            )));
        }
        Ok(Self { field, values })
    }

    /// The remote field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The accepted values, in input order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A modified-date range with at least one bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Creates a range. At least one bound is required and `start <= end`.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        match (start, end) {
            (None, None) => Err(Error::Validation(
                "at least one of startDateGMT or endDateGMT must be provided".to_string(),
            )),
            (Some(s), Some(e)) if s > e => Err(Error::Validation(
                "startDateGMT must have a date before endDateGMT".to_string(),
            )),
            _ => Ok(Self { start, end }),
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}

/// A validated query. Exactly one mode is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryDescriptor {
    /// Match records whose internal ID is any of these, in order.
    ExactIds(Vec<String>),
    /// One "any of" predicate per filter, in order.
    FieldFilters(Vec<FieldFilter>),
    /// Match records modified inside the range.
    ModifiedDateRange(DateRange),
}

impl QueryDescriptor {
    /// Builds an exact-IDs descriptor. At least one ID is required.
    pub fn exact_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(Error::Validation(
                "remoteIDs must be an Array with at least 1 remoteID".to_string(),
            ));
        }
        Ok(Self::ExactIds(ids))
    }

    /// Builds a field-filter descriptor. At least one filter is required and
    /// each field may appear only once.
    pub fn field_filters(filters: Vec<FieldFilter>) -> Result<Self> {
        if filters.is_empty() {
            return Err(Error::Validation(
                "searchFields must be an Array with at least 1 key value pair".to_string(),
            ));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for filter in &filters {
            if !seen.insert(filter.field()) {
                return Err(Error::Validation(format!(
                    "searchField '{}' may appear only once; list every value in its searchValues",
                    filter.field()
                )));
            }
        }
        Ok(Self::FieldFilters(filters))
    }

    /// Builds a modified-date-range descriptor.
    pub fn modified_date_range(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        Ok(Self::ModifiedDateRange(DateRange::new(start, end)?))
    }

    /// Short name of the active mode, for logs.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::ExactIds(_) => "remoteIDs",
            Self::FieldFilters(_) => "searchFields",
            Self::ModifiedDateRange(_) => "modifiedDateRange",
        }
    }
}

impl TryFrom<&QueryDoc> for QueryDescriptor {
    type Error = Error;

    fn try_from(doc: &QueryDoc) -> Result<Self> {
        let present = [
            doc.remote_ids.is_some(),
            doc.search_fields.is_some(),
            doc.modified_date_range.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        if present == 0 {
            return Err(Error::Validation(
                "either remoteIDs or searchFields or modifiedDateRange must be provided"
                    .to_string(),
            ));
        }
        if present > 1 {
            return Err(Error::Validation(
                "only one of remoteIDs or searchFields or modifiedDateRange may be provided"
                    .to_string(),
            ));
        }

        if let Some(ids) = &doc.remote_ids {
            return Self::exact_ids(ids.iter().cloned());
        }

        if let Some(fields) = &doc.search_fields {
            let filters = fields
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    FieldFilter::new(f.search_field.clone(), f.search_values.clone()).map_err(
                        |_| {
                            Error::Validation(format!(
                                "searchFields[{i}] must be a key value pair: \
                                 {{searchField: 'key', searchValues: ['value_1']}}"
                            ))
                        },
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            return Self::field_filters(filters);
        }

        let range = doc.modified_date_range.as_ref().ok_or_else(|| {
            Error::Validation("modifiedDateRange was not provided".to_string())
        })?;
        let start = range.start_date_gmt.as_deref().map(parse_gmt).transpose()?;
        let end = range.end_date_gmt.as_deref().map(parse_gmt).transpose()?;
        Self::modified_date_range(start, end)
    }
}

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date as midnight UTC.
fn parse_gmt(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp(format!("{value}: {e}")))
}
