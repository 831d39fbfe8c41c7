use crate::{DocumentError, TreeNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed recursive analysis as delivered by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub root_term: String,
    pub tree: TreeNode,
    #[serde(default)]
    pub total_processing_time_ms: u64,
    #[serde(default)]
    pub total_principles: u32,
    #[serde(default)]
    pub max_depth_reached: u32,
}

impl AnalysisResult {
    /// Derive the summary fields from the tree itself.
    pub fn from_tree(tree: TreeNode, total_processing_time_ms: u64) -> Self {
        Self {
            root_term: tree.name.clone(),
            total_principles: tree.total_principles() as u32,
            max_depth_reached: tree.max_depth(),
            total_processing_time_ms,
            tree,
        }
    }
}

/// Response wrapper used by the analysis service's HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_result(self) -> Result<T, DocumentError> {
        if !self.success {
            return Err(DocumentError::ServiceFailure(
                self.error.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }
        self.data.ok_or(DocumentError::MissingData)
    }
}

/// Parse a bare tree, an [`AnalysisResult`], or an [`ApiEnvelope`] around one.
pub fn parse_tree_document(json: &str) -> Result<TreeNode, DocumentError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    if value.get("success").is_some() {
        let envelope: ApiEnvelope<AnalysisResult> = serde_json::from_value(value)?;
        return Ok(envelope.into_result()?.tree);
    }
    if value.get("tree").is_some() && value.get("root_term").is_some() {
        let result: AnalysisResult = serde_json::from_value(value)?;
        return Ok(result.tree);
    }
    Ok(serde_json::from_value(value)?)
}
