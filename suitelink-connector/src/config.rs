//! Connector configuration.

use crate::error::{SuiteError, SuiteResult};
use serde::{Deserialize, Serialize};

/// Business reference path lists, one per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessReferenceConfig {
    pub product: Vec<String>,
    pub product_pricing: Vec<String>,
    pub fulfillment: Vec<String>,
    pub customer: Vec<String>,
    pub customer_address: Vec<String>,
    pub sales_order: Vec<String>,
}

/// Which reference list an operation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSet {
    Product,
    ProductPricing,
    Fulfillment,
    Customer,
    CustomerAddress,
    SalesOrder,
}

impl ReferenceSet {
    fn name(self) -> &'static str {
        match self {
            Self::Product => "productBusinessReferences",
            Self::ProductPricing => "productPricingBusinessReferences",
            Self::Fulfillment => "fulfillmentBusinessReferences",
            Self::Customer => "customerBusinessReferences",
            Self::CustomerAddress => "customerAddressBusinessReferences",
            Self::SalesOrder => "salesOrderBusinessReferences",
        }
    }
}

impl BusinessReferenceConfig {
    pub fn paths(&self, set: ReferenceSet) -> &[String] {
        match set {
            ReferenceSet::Product => &self.product,
            ReferenceSet::ProductPricing => &self.product_pricing,
            ReferenceSet::Fulfillment => &self.fulfillment,
            ReferenceSet::Customer => &self.customer,
            ReferenceSet::CustomerAddress => &self.customer_address,
            ReferenceSet::SalesOrder => &self.sales_order,
        }
    }

    /// The path list for `set`, failing when it is empty.
    pub fn require(&self, set: ReferenceSet) -> SuiteResult<&[String]> {
        let paths = self.paths(set);
        if paths.is_empty() {
            return Err(SuiteError::Validation(format!("{} is empty", set.name())));
        }
        Ok(paths)
    }
}

/// Configuration for a [`Connector`](crate::Connector) and its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorConfig {
    /// Base URL remote operations are posted under.
    pub api_base_url: String,
    /// Bearer token sent with every call.
    pub api_token: Option<String>,
    /// Per-call timeout.
    pub timeout_secs: u64,
    /// Remote page size when the request does not set one.
    pub page_size: u32,
    pub business_references: BusinessReferenceConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/services".to_string(),
            api_token: None,
            timeout_secs: 60,
            page_size: 10,
            business_references: BusinessReferenceConfig::default(),
        }
    }
}

impl ConnectorConfig {
    /// Checks values every operation relies on.
    pub fn validate(&self) -> SuiteResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(SuiteError::Validation("apiBaseUrl was not provided".to_string()));
        }
        if self.page_size == 0 {
            return Err(SuiteError::Validation("pageSize must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(SuiteError::Validation("timeoutSecs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parses a JSON configuration document and validates it.
    pub fn from_json(text: &str) -> SuiteResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
