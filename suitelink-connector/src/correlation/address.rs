//! Address matching against a customer's address book.
//!
//! Address business-reference paths are written against a customer
//! document whose `record.addressbookList.addressbook` holds a single
//! address. Matching projects each candidate into that shape before
//! extracting its reference.

use serde_json::Value;
use suitelink_types::{BusinessReference, PathExtractor, one_or_many};

/// Outcome of matching one target against a candidate set.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressMatch {
    Empty,
    /// Exactly one exact match, with its reference.
    Single(Value, BusinessReference),
    /// More than one exact match; all of them.
    Conflict(Vec<Value>),
}

/// Filters `candidates` to those whose reference equals `target`.
pub fn match_candidates<F>(target: &BusinessReference, candidates: Vec<Value>, reference_of: F) -> AddressMatch
where
    F: Fn(&Value) -> BusinessReference,
{
    let mut matches: Vec<(Value, BusinessReference)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let reference = reference_of(&candidate);
            (reference == *target).then_some((candidate, reference))
        })
        .collect();

    match matches.len() {
        0 => AddressMatch::Empty,
        1 => {
            let (doc, reference) = matches.remove(0);
            AddressMatch::Single(doc, reference)
        }
        _ => AddressMatch::Conflict(matches.into_iter().map(|(doc, _)| doc).collect()),
    }
}

/// The address book entries of a `{record: customer}` document.
pub fn address_book(customer_doc: &Value) -> Vec<Value> {
    customer_doc
        .pointer("/record/addressbookList/addressbook")
        .cloned()
        .map(one_or_many)
        .unwrap_or_default()
}

/// A copy of `customer_doc` whose address book holds only `address`.
pub fn with_single_address(customer_doc: &Value, address: &Value) -> Value {
    let mut view = customer_doc.clone();
    if let Some(list) = view
        .pointer_mut("/record/addressbookList")
        .and_then(Value::as_object_mut)
    {
        list.insert("addressbook".into(), address.clone());
    }
    view
}

/// Matches the first address of `target_doc` against every address of
/// `customer_doc`.
pub fn match_address(
    extractor: &dyn PathExtractor,
    paths: &[String],
    target_doc: &Value,
    customer_doc: &Value,
) -> AddressMatch {
    let Some(first) = address_book(target_doc).into_iter().next() else {
        return AddressMatch::Empty;
    };
    let reference_in = |doc: &Value, address: &Value| {
        BusinessReference::extract_with(extractor, paths, &with_single_address(doc, address))
    };
    let target = reference_in(target_doc, &first);

    match_candidates(&target, address_book(customer_doc), |address| {
        reference_in(customer_doc, address)
    })
}
