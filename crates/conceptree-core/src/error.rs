use thiserror::Error;

/// Why a node was left out of the layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeDefect {
    #[error("node has no name")]
    MissingName,
    #[error("depth {found} does not follow its parent (expected {expected})")]
    DepthMismatch { expected: u32, found: u32 },
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid tree document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Analysis service reported a failure: {0}")]
    ServiceFailure(String),
    #[error("Analysis response carried no data")]
    MissingData,
}
