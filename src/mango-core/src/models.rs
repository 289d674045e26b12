use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::operators::SortDirection;
use crate::selector::Selector;

/// Body of a `POST /{db}/_find` request.
///
/// Every optional field is omitted from the wire when unset, which makes the
/// server apply its own default. Wire keys are CouchDB's exact lower-snake
/// names (`use_index`, `execution_stats`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindRequest {
    /// Criteria used to select documents. `{}` matches everything.
    #[serde(default)]
    pub selector: Selector,
    /// Maximum number of results. Server default is 25.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Skip the first n results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Sort order; every sorted field must be covered by an index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,
    /// Projection: which fields of each document to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Instruct the query to use a specific index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_index: Option<UseIndex>,
    /// Read quorum. Server default is 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,
    /// Opaque pagination token from a previous response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    /// Whether to update the index before returning results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    /// Whether results come from a stable set of shards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
    /// Legacy shorthand for `update=false` + `stable=true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale: Option<Stale>,
    /// Include execution statistics in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_stats: Option<bool>,
}

impl FindRequest {
    /// A request with the given selector and server defaults for the rest.
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            ..Self::default()
        }
    }
}

/// One entry of the `sort` array: either a bare field name (server picks the
/// direction) or `{"field": "asc"|"desc"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    Field(String),
    Directed(BTreeMap<String, SortDirection>),
}

impl SortSpec {
    /// Sort by a field with the server-chosen direction.
    pub fn field(field: impl Into<String>) -> Self {
        SortSpec::Field(field.into())
    }

    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::directed(field, SortDirection::Asc)
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::directed(field, SortDirection::Desc)
    }

    fn directed(field: impl Into<String>, direction: SortDirection) -> Self {
        let mut spec = BTreeMap::new();
        spec.insert(field.into(), direction);
        SortSpec::Directed(spec)
    }
}

/// The `use_index` argument: `"<design_document>"` or
/// `["<design_document>", "<index_name>"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UseIndex {
    DesignDocument(String),
    DesignDocumentAndName(String, String),
}

/// The only accepted `stale` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stale {
    #[serde(rename = "ok")]
    Ok,
}

/// Body of a `_find` response. Fields the server left out decode to their
/// defaults rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResponse {
    /// Matching documents, kept as opaque JSON.
    #[serde(default)]
    pub docs: Vec<serde_json::Value>,
    /// Pagination token; pass back via [`FindRequest::bookmark`] for the
    /// next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    /// Present when the request set `execution_stats`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_stats: Option<ExecutionStats>,
    /// Server advisory, e.g. "no matching index found".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Server-reported diagnostic counters for one query execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    #[serde(default)]
    pub execution_time_ms: f64,
    #[serde(default)]
    pub results_returned: u64,
    #[serde(default)]
    pub total_docs_examined: u64,
    #[serde(default)]
    pub total_keys_examined: u64,
    #[serde(default)]
    pub total_quorum_docs_examined: u64,
}

/// Body of a `POST /{db}/_index` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    /// The index to create.
    pub index: IndexFields,
    /// Design document to hold the index. Server generates one if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddoc: Option<String>,
    /// Index name. Server generates one if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "json" or "text". Server default is json.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<IndexType>,
}

/// The `index` object of a create-index request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFields {
    /// Fields to index, in order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Restricts which documents the index covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_filter_selector: Option<Selector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    #[default]
    Json,
    Text,
}

/// Body of an `_index` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexResponse {
    /// Whether the index was created or already existed.
    pub result: IndexState,
    /// Id of the design document holding the index.
    #[serde(default)]
    pub id: String,
    /// Name of the index.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Created,
    Exists,
}
