pub mod camera;
pub mod curve;
pub mod error;
pub mod grouping;
pub mod hit_tester;
pub mod host;
pub mod interaction;
pub mod layout;
pub mod recording;
pub mod scene;
pub mod selection;
pub mod settings;
pub mod stats;
pub mod style;
pub mod view;

pub use camera::Camera;
pub use curve::{ConnectorRouter, QuadraticBezier};
pub use error::{HostError, ViewError};
pub use grouping::{DepthGroups, GroupedNode, SkippedNode};
pub use hit_tester::{HitTester, Intersection, Ray, Sphere};
pub use host::{
    CameraPose, CurveDesc, CurveStyle, LabelDesc, MarkerDesc, PrimitiveId, RenderHost,
    SurfaceInfo, Transform,
};
pub use interaction::{
    DragState, InteractionController, InteractionState, MarkerPicker, PointerDownOutcome,
    WheelOutcome,
};
pub use layout::{Layouter, RadialLayouter, rotate_around_vertical_axis};
pub use recording::{LivePrimitive, RecordedPrimitive, RecordingHost};
pub use scene::{Connector, SceneComposer, SceneHandle, SceneNode};
pub use selection::SelectionPresenter;
pub use settings::{
    CameraSettings, ConnectorSettings, InteractionSettings, LabelSettings, LayoutSettings,
    MarkerSettings, SelectionSettings, ViewSettings,
};
pub use stats::TreeStats;
pub use style::{Color, ConfidenceTier};
pub use view::{InputEvent, InputResponse, TreeView};
