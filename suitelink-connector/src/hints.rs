//! Environment hints supplied by the integration flow.
//!
//! Hints only ever add predicates to a criteria object. They never replace
//! the descriptor-derived base group.

use crate::criteria::{
    CustomFieldKind, CustomFieldPredicate, Operator, Predicate, SearchCriteria, SearchValue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of item custom field script IDs.
const CUSTOM_ITEM_FIELD_PREFIX: &str = "custitem";

/// Flow-level filter hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentHints {
    /// Field of the single extra equality/compare predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_compare: Option<String>,

    /// Boolean custom field marking virtual matrix parents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_matrix_parent_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_matrix_parent_flag_criteria: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_matrix_parent_flag_compare: Option<String>,
    /// String custom field holding a virtual child's parent ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id_field: Option<String>,

    #[serde(rename = "entity_id", default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updated_at", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fulfillments with a different `shipStatus` are skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_status: Option<String>,

    /// Custom form applied to inserted sales orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_form: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn is_present(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

impl EnvironmentHints {
    /// Adds the filter field/criteria/compare predicate. Fields named like
    /// item custom fields become boolean custom-field predicates.
    pub fn apply_filter(&self, criteria: SearchCriteria) -> SearchCriteria {
        let Some(field) = non_empty(&self.filter_field) else {
            return criteria;
        };
        if !is_present(&self.filter_criteria) {
            return criteria;
        }
        let value = SearchValue::Raw(self.filter_criteria.clone().unwrap_or_default());
        let operator = non_empty(&self.filter_compare).map(|c| Operator::Custom(c.to_string()));

        if field.starts_with(CUSTOM_ITEM_FIELD_PREFIX) {
            criteria.with_custom_field(CustomFieldPredicate {
                script_id: field.to_string(),
                kind: CustomFieldKind::Boolean,
                operator,
                value,
            })
        } else {
            criteria.with_filter(Predicate::new(field, operator, value))
        }
    }

    /// Adds the virtual-matrix custom field predicates used to keep virtual
    /// parents and virtual children out of simple product results.
    pub fn apply_virtual_matrix_exclusions(&self, mut criteria: SearchCriteria) -> SearchCriteria {
        if let Some(flag) = non_empty(&self.virtual_matrix_parent_flag) {
            if is_present(&self.virtual_matrix_parent_flag_criteria) {
                criteria = criteria.with_custom_field(CustomFieldPredicate {
                    script_id: flag.to_string(),
                    kind: CustomFieldKind::Boolean,
                    operator: non_empty(&self.virtual_matrix_parent_flag_compare)
                        .map(|c| Operator::Custom(c.to_string())),
                    value: SearchValue::Raw(
                        self.virtual_matrix_parent_flag_criteria
                            .clone()
                            .unwrap_or_default(),
                    ),
                });
            }
        }
        if let Some(field) = non_empty(&self.parent_id_field) {
            criteria = criteria.with_custom_field(CustomFieldPredicate {
                script_id: field.to_string(),
                kind: CustomFieldKind::String,
                operator: Some(Operator::Empty),
                value: SearchValue::None,
            });
        }
        criteria
    }

    /// Adds the fulfillment predicates: owning entity, creation date and
    /// last-modified date.
    pub fn apply_fulfillment(&self, mut criteria: SearchCriteria) -> SearchCriteria {
        if let Some(entity) = non_empty(&self.entity_id) {
            criteria = criteria.with_filter(Predicate::any_of(
                "entity",
                SearchValue::Ref(entity.to_string()),
            ));
        }
        if let Some(created) = non_empty(&self.created_at) {
            criteria = criteria.with_filter(Predicate::new(
                "dateCreated",
                Some(Operator::On),
                SearchValue::Text(created.to_string()),
            ));
        }
        if let Some(updated) = non_empty(&self.updated_at) {
            criteria = criteria.with_filter(Predicate::new(
                "lastModifiedDate",
                Some(Operator::On),
                SearchValue::Text(updated.to_string()),
            ));
        }
        criteria
    }

    /// True when a fulfillment's ship status passes the hint.
    pub fn accepts_ship_status(&self, ship_status: Option<&str>) -> bool {
        match non_empty(&self.ship_status) {
            Some(wanted) => ship_status == Some(wanted),
            None => true,
        }
    }
}
