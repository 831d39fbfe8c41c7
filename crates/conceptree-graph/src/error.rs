use thiserror::Error;

/// Failures reported by a [`RenderHost`](crate::host::RenderHost).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host rejected primitive: {0}")]
    Rejected(String),
    #[error("Rendering surface was lost")]
    SurfaceLost,
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("No rendering context is available")]
    GraphicsContextUnavailable,
    #[error("Host error: {0}")]
    Host(HostError),
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A lost surface is the same condition as having none.
impl From<HostError> for ViewError {
    fn from(error: HostError) -> Self {
        match error {
            HostError::SurfaceLost => ViewError::GraphicsContextUnavailable,
            other => ViewError::Host(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_lost_is_context_unavailable() {
        assert!(matches!(
            ViewError::from(HostError::SurfaceLost),
            ViewError::GraphicsContextUnavailable
        ));
    }

    #[test]
    fn test_rejection_stays_a_host_error() {
        match ViewError::from(HostError::Rejected("too many".into())) {
            ViewError::Host(HostError::Rejected(reason)) => assert_eq!(reason, "too many"),
            other => panic!("expected host rejection, got {other:?}"),
        }
    }
}
