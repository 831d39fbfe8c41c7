use crate::SceneId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "conceptree::events::telemetry";

/// Scene operations that report lifecycle telemetry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SceneOperation {
    Build,
    Teardown,
}

impl fmt::Display for SceneOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build_scene"),
            Self::Teardown => write!(f, "teardown_scene"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SceneLifecycle {
    Started,
    Succeeded,
    Failed,
}

impl fmt::Display for SceneLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "scene_started"),
            Self::Succeeded => write!(f, "scene_succeeded"),
            Self::Failed => write!(f, "scene_failed"),
        }
    }
}

/// What an operation touched: accepted nodes, nodes skipped as malformed, and host
/// primitives created or released.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SceneCounts {
    pub nodes: usize,
    pub skipped: usize,
    pub primitives: usize,
}

/// One lifecycle record for a scene operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneTelemetry {
    pub correlation_id: String,
    pub operation: SceneOperation,
    pub scene: SceneId,
    pub lifecycle: SceneLifecycle,
    pub duration_ms: Option<u128>,
    pub counts: Option<SceneCounts>,
    pub error_reason: Option<String>,
}

/// An in-flight scene operation. Logs its start on creation and yields the closing
/// record from [`SceneSpan::succeed`] or [`SceneSpan::fail`].
#[derive(Debug)]
pub struct SceneSpan {
    correlation_id: String,
    operation: SceneOperation,
    scene: SceneId,
    started: Instant,
}

impl SceneSpan {
    pub fn start(operation: SceneOperation, scene: SceneId) -> Self {
        let span = Self {
            correlation_id: new_correlation_id(),
            operation,
            scene,
            started: Instant::now(),
        };
        info!(
            target: TELEMETRY_TARGET,
            operation = %operation,
            scene = %scene,
            correlation_id = %span.correlation_id,
            lifecycle = %SceneLifecycle::Started,
            "scene_started"
        );
        span
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn succeed(self, counts: SceneCounts) -> SceneTelemetry {
        let record = self.finish(SceneLifecycle::Succeeded, Some(counts), None);
        info!(
            target: TELEMETRY_TARGET,
            operation = %record.operation,
            scene = %record.scene,
            correlation_id = %record.correlation_id,
            lifecycle = %record.lifecycle,
            duration_ms = ?record.duration_ms,
            nodes = counts.nodes,
            skipped = counts.skipped,
            primitives = counts.primitives,
            "scene_succeeded"
        );
        record
    }

    pub fn fail(self, reason: impl fmt::Display) -> SceneTelemetry {
        let record = self.finish(SceneLifecycle::Failed, None, Some(reason.to_string()));
        error!(
            target: TELEMETRY_TARGET,
            operation = %record.operation,
            scene = %record.scene,
            correlation_id = %record.correlation_id,
            lifecycle = %record.lifecycle,
            duration_ms = ?record.duration_ms,
            error = record.error_reason.as_deref().unwrap_or("unclassified"),
            "scene_failed"
        );
        record
    }

    fn finish(
        self,
        lifecycle: SceneLifecycle,
        counts: Option<SceneCounts>,
        error_reason: Option<String>,
    ) -> SceneTelemetry {
        SceneTelemetry {
            duration_ms: Some(self.started.elapsed().as_millis()),
            correlation_id: self.correlation_id,
            operation: self.operation,
            scene: self.scene,
            lifecycle,
            counts,
            error_reason,
        }
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_uuid_like() {
        let id = new_correlation_id();
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn build_span_records_counts_for_its_scene() {
        let scene = SceneId::new();
        let span = SceneSpan::start(SceneOperation::Build, scene);
        let correlation_id = span.correlation_id().to_string();
        let counts = SceneCounts {
            nodes: 4,
            skipped: 1,
            primitives: 14,
        };

        let record = span.succeed(counts);
        assert_eq!(record.scene, scene);
        assert_eq!(record.correlation_id, correlation_id);
        assert_eq!(record.operation, SceneOperation::Build);
        assert_eq!(record.lifecycle, SceneLifecycle::Succeeded);
        assert_eq!(record.counts, Some(counts));
        assert!(record.duration_ms.is_some());
        assert!(record.error_reason.is_none());
    }

    #[test]
    fn failed_span_keeps_reason_and_no_counts() {
        let record = SceneSpan::start(SceneOperation::Build, SceneId::new())
            .fail("No rendering context is available");
        assert_eq!(record.lifecycle, SceneLifecycle::Failed);
        assert!(record.counts.is_none());
        assert_eq!(
            record.error_reason.as_deref(),
            Some("No rendering context is available")
        );
    }

    #[test]
    fn record_serializes_scene_fields() {
        let record = SceneSpan::start(SceneOperation::Teardown, SceneId::new())
            .succeed(SceneCounts::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operation"], "Teardown");
        assert_eq!(json["counts"]["primitives"], 0);
        assert_eq!(json["scene"], record.scene.to_string());
    }
}
