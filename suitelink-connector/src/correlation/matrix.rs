//! Matrix product correlation.
//!
//! A matrix family is one parent item and its variant children. The remote
//! cannot return a family in one search, so discovery runs three scans in
//! strict order:
//!
//! 1. [`Stage::ParentScan`]: items flagged as matrix parents.
//! 2. [`Stage::ChildScan`]: items flagged as matrix children; their parent
//!    references extend the parent set.
//! 3. [`Stage::FullFetch`]: every item joined to a discovered parent; each
//!    non-parent is attached to its parent.
//!
//! The resulting families are then read one per call through `getList`.

use super::drain_search;
use crate::client::SuiteClient;
use crate::envelope::parse_read_list;
use crate::error::{SuiteError, SuiteResult};
use crate::hints::EnvironmentHints;
use crate::translate::{QueryKind, parent_join, translate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use suitelink_types::{QueryDescriptor, RecordRef, RemoteRecord};
use tracing::{debug, info};

/// Remote record type of matrix items.
const ITEM_RECORD_TYPE: &str = "inventoryItem";

/// Discovery stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParentScan,
    ChildScan,
    FullFetch,
}

impl Stage {
    fn next(self) -> Option<Self> {
        match self {
            Self::ParentScan => Some(Self::ChildScan),
            Self::ChildScan => Some(Self::FullFetch),
            Self::FullFetch => None,
        }
    }
}

/// One parent and its children, as carried in the paging context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixFamily {
    pub parent: String,
    #[serde(default)]
    pub children: Vec<String>,
}

impl MatrixFamily {
    /// References for the `getList` call: parent first, then children.
    pub fn references(&self) -> Vec<RecordRef> {
        std::iter::once(&self.parent)
            .chain(self.children.iter())
            .map(|id| RecordRef::new(id.clone(), ITEM_RECORD_TYPE))
            .collect()
    }
}

/// Discovery state for one query invocation. Owned by the caller and moved
/// through each stage; never shared between invocations.
#[derive(Debug, Clone)]
pub struct CorrelationState {
    stage: Stage,
    parents: Vec<String>,
    known: HashSet<String>,
    children: HashMap<String, Vec<String>>,
}

impl Default for CorrelationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationState {
    pub fn new() -> Self {
        Self {
            stage: Stage::ParentScan,
            parents: Vec::new(),
            known: HashSet::new(),
            children: HashMap::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Discovered parent IDs in discovery order.
    pub fn parent_ids(&self) -> &[String] {
        &self.parents
    }

    /// Children attached to `parent_id` so far.
    pub fn children_of(&self, parent_id: &str) -> &[String] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Moves to the next stage.
    pub fn advance(&mut self) -> SuiteResult<()> {
        self.stage = self.stage.next().ok_or_else(|| {
            SuiteError::CorrelationDefect("matrix discovery advanced past the full fetch".to_string())
        })?;
        debug!("Matrix discovery stage: {:?}", self.stage);
        Ok(())
    }

    fn add_parent(&mut self, id: &str) {
        if self.known.insert(id.to_string()) {
            self.parents.push(id.to_string());
        }
    }

    /// Merges one page of the current stage's results. Re-adding an ID is a
    /// no-op, so overlapping pages are harmless.
    pub fn absorb(&mut self, records: &[RemoteRecord]) -> SuiteResult<()> {
        match self.stage {
            Stage::ParentScan => {
                for record in records {
                    self.add_parent(record.remote_id());
                }
            }
            Stage::ChildScan => {
                for record in records {
                    let parent = record.parent_id().ok_or_else(|| {
                        SuiteError::CorrelationDefect(format!(
                            "matrix child {} has no parent reference",
                            record.remote_id()
                        ))
                    })?;
                    self.add_parent(&parent);
                }
            }
            Stage::FullFetch => {
                for record in records {
                    self.attach(record)?;
                }
            }
        }
        Ok(())
    }

    fn attach(&mut self, record: &RemoteRecord) -> SuiteResult<()> {
        let id = record.remote_id();
        if self.known.contains(id) {
            return Ok(());
        }
        let parent = record.parent_id().ok_or_else(|| {
            SuiteError::CorrelationDefect(format!("matrix item {id} has no parent reference"))
        })?;
        if !self.known.contains(&parent) {
            return Err(SuiteError::CorrelationDefect(format!(
                "matrix item {id} references undiscovered parent {parent}"
            )));
        }
        let children = self.children.entry(parent).or_default();
        if !children.iter().any(|c| c == id) {
            children.push(id.to_string());
        }
        Ok(())
    }

    /// The ordered worklist: one family per discovered parent.
    pub fn into_families(mut self) -> Vec<MatrixFamily> {
        self.parents
            .into_iter()
            .map(|parent| {
                let children = self.children.remove(&parent).unwrap_or_default();
                MatrixFamily { parent, children }
            })
            .collect()
    }
}

/// Runs all three discovery scans and returns the family worklist.
pub async fn discover_families(
    client: &dyn SuiteClient,
    descriptor: &QueryDescriptor,
    hints: Option<&EnvironmentHints>,
    page_size: Option<u32>,
) -> SuiteResult<Vec<MatrixFamily>> {
    let mut state = CorrelationState::new();

    let parents = translate(QueryKind::MatrixParents, descriptor, hints)?.with_page_size(page_size);
    let children = translate(QueryKind::MatrixChildren, descriptor, hints)?.with_page_size(page_size);

    state.absorb(&drain_search(client, &parents).await?)?;
    info!("Matrix parent scan found {} parents", state.parent_ids().len());

    state.advance()?;
    state.absorb(&drain_search(client, &children).await?)?;
    info!("Matrix child scan extended parents to {}", state.parent_ids().len());

    state.advance()?;
    if state.parent_ids().is_empty() {
        return Ok(Vec::new());
    }
    let full = parent_join(state.parent_ids().to_vec(), hints)?.with_page_size(page_size);
    state.absorb(&drain_search(client, &full).await?)?;

    let families = state.into_families();
    info!("Matrix discovery complete: {} families", families.len());
    Ok(families)
}

/// Reads one family and returns the parent record with its children
/// attached under `matrixChildren`.
pub async fn fetch_family(
    client: &dyn SuiteClient,
    family: &MatrixFamily,
) -> SuiteResult<RemoteRecord> {
    debug!(
        "Reading matrix family {} with {} children",
        family.parent,
        family.children.len()
    );
    let response = client
        .get_list(&family.references())
        .await
        .map_err(SuiteError::from_transport)?;

    let mut parent = None;
    let mut children = Vec::new();
    for record in parse_read_list(response)? {
        if record.remote_id() == family.parent {
            parent = Some(record);
        } else {
            children.push(record.to_doc());
        }
    }

    let mut parent = parent.ok_or_else(|| {
        SuiteError::CorrelationDefect(format!(
            "getList did not return matrix parent {}",
            family.parent
        ))
    })?;
    if let Value::Object(body) = parent.body_mut() {
        body.insert("matrixChildren".into(), Value::Array(children));
    }
    Ok(parent)
}

/// Serializes the remaining worklist as a paging context.
pub fn families_context(families: &[MatrixFamily]) -> Value {
    json!({ "parentObjects": families })
}

/// Reads the remaining worklist back from a paging context.
pub fn families_from_context(context: &Value) -> SuiteResult<Vec<MatrixFamily>> {
    let objects = context.get("parentObjects").cloned().ok_or_else(|| {
        SuiteError::Validation("pagingContext.parentObjects was not provided".to_string())
    })?;
    serde_json::from_value(objects).map_err(|e| {
        SuiteError::Validation(format!("pagingContext.parentObjects is malformed: {e}"))
    })
}
