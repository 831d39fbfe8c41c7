use crate::error::ViewError;
use crate::hit_tester::Ray;
use crate::host::{RenderHost, SurfaceInfo};
use crate::interaction::{InteractionController, InteractionState, PointerDownOutcome};
use crate::scene::{SceneComposer, SceneHandle};
use crate::selection::SelectionPresenter;
use crate::settings::ViewSettings;
use conceptree_core::{NodeIndex, TreeNode};
use conceptree_events::telemetry::{SceneCounts, SceneOperation, SceneSpan};
use conceptree_events::{Event, EventBus, SceneId, SelectionOrigin};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// Surface assumed until the host reports a real one.
const FALLBACK_SURFACE: SurfaceInfo = SurfaceInfo {
    width: 1,
    height: 1,
    pixel_ratio: 1.0,
};

/// Raw input as delivered by the host surface, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    Wheel { delta: f32 },
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    /// The host should suppress its default handling of the event.
    pub prevent_default: bool,
    /// Node picked by this event, if any.
    pub selected: Option<NodeIndex>,
}

/// Owns every piece of mutable view state: the host, the current scene, interaction and
/// selection. Events go out on the [`EventBus`].
pub struct TreeView<H: RenderHost> {
    host: H,
    settings: ViewSettings,
    composer: SceneComposer,
    controller: InteractionController,
    presenter: SelectionPresenter,
    scene: Option<SceneHandle>,
    bus: EventBus,
    rng: StdRng,
}

impl<H: RenderHost> TreeView<H> {
    pub fn new(host: H, settings: ViewSettings) -> Self {
        Self::with_bus(host, settings, EventBus::new())
    }

    pub fn with_bus(host: H, settings: ViewSettings, bus: EventBus) -> Self {
        let surface = host.surface().unwrap_or(FALLBACK_SURFACE);
        let rng = match settings.connectors.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            composer: SceneComposer::new(&settings),
            controller: InteractionController::new(&settings, surface),
            presenter: SelectionPresenter::new(&settings.selection),
            scene: None,
            host,
            settings,
            bus,
            rng,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn interaction(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn selected(&self) -> Option<&str> {
        self.presenter.selected()
    }

    /// Replace the current scene with one built from `tree`.
    ///
    /// The previous scene is released before the new one is built. Interaction and
    /// selection return to their initial state. On error no scene is shown.
    pub fn show(&mut self, tree: &TreeNode) -> Result<&SceneHandle, ViewError> {
        self.clear();
        self.controller.reset();
        self.presenter.select(None);

        let scene_id = SceneId::new();
        let span = SceneSpan::start(SceneOperation::Build, scene_id);

        if let Some(surface) = self.host.surface() {
            self.controller.resize(surface.width, surface.height);
        }
        if let Some(seed) = self.settings.connectors.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let built = self
            .composer
            .build(&mut self.host, tree, scene_id, &mut self.rng);
        let mut scene = match built {
            Ok(scene) => scene,
            Err(e) => {
                span.fail(&e);
                return Err(e);
            }
        };

        span.succeed(SceneCounts {
            nodes: scene.nodes().len(),
            skipped: scene.skipped().len(),
            primitives: scene.primitive_count(),
        });

        self.controller.set_max_depth(scene.max_depth());
        scene.apply_rotation(&mut self.host, self.controller.state().rotation_y);
        self.host.set_camera(&self.controller.camera().pose());

        self.bus.publish(Event::SceneBuilt {
            scene: scene.id(),
            node_count: scene.nodes().len(),
            skipped_count: scene.skipped().len(),
            max_depth: scene.max_depth(),
        });
        Ok(&*self.scene.insert(scene))
    }

    /// Tear down the current scene, if any. Returns the number of primitives released.
    pub fn clear(&mut self) -> usize {
        let Some(mut scene) = self.scene.take() else {
            return 0;
        };

        let span = SceneSpan::start(SceneOperation::Teardown, scene.id());
        let nodes = scene.nodes().len();
        let skipped = scene.skipped().len();
        let released = scene.teardown(&mut self.host);
        span.succeed(SceneCounts {
            nodes,
            skipped,
            primitives: released,
        });

        if self.controller.pointer_up() {
            self.bus.publish(Event::InteractionChanged { dragging: false });
        }
        self.bus.publish(Event::SceneTornDown {
            scene: scene.id(),
            released_primitives: released,
        });
        released
    }

    pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
        let mut response = InputResponse::default();

        match event {
            InputEvent::PointerDown { x, y } => {
                let scene = self.scene.as_ref();
                let host = &self.host;
                let picker = |ray: &Ray| -> Option<NodeIndex> {
                    let scene = scene?;
                    let hits = host.intersect(ray, &scene.marker_ids());
                    hits.first().and_then(|hit| scene.node_for_marker(hit.id))
                };

                match self.controller.pointer_down(Vec2::new(x, y), &picker) {
                    PointerDownOutcome::Picked(index) => {
                        response.selected = Some(index);
                        self.publish_selected(index, SelectionOrigin::Pick);
                    }
                    PointerDownOutcome::DragStarted => {
                        self.bus.publish(Event::InteractionChanged { dragging: true });
                    }
                    PointerDownOutcome::Ignored => {}
                }
            }
            InputEvent::PointerMove { x, y } => {
                self.controller.pointer_move(Vec2::new(x, y));
            }
            InputEvent::PointerUp => {
                if self.controller.pointer_up() {
                    self.bus.publish(Event::InteractionChanged { dragging: false });
                }
            }
            InputEvent::Wheel { delta } => {
                response.prevent_default = self.controller.wheel(delta).prevent_default;
            }
            InputEvent::Resize { width, height } => {
                if self.controller.resize(width, height) {
                    self.host.set_camera(&self.controller.camera().pose());
                }
            }
        }

        response
    }

    /// Rotate the scene to `rotation_y` radians; takes effect on the next frame.
    pub fn set_rotation(&mut self, rotation_y: f32) {
        self.controller.set_rotation(rotation_y);
    }

    /// Push the live rotation and camera height to the host.
    pub fn frame(&mut self) {
        let rotation_y = self.controller.state().rotation_y;
        if let Some(scene) = self.scene.as_mut() {
            scene.apply_rotation(&mut self.host, rotation_y);
        }
        self.host.set_camera(&self.controller.camera().pose());
    }

    /// Select the first node called `name`, emphasise every node of that name and
    /// announce the selection. Unknown names leave the selection unchanged.
    pub fn select_by_name(&mut self, name: &str) -> Option<NodeIndex> {
        let scene = self.scene.as_mut()?;
        let Some(index) = scene.find_by_name(name).next().map(|n| n.index) else {
            debug!(name, "Selection request matched no node");
            return None;
        };

        self.presenter.select(Some(name));
        self.presenter.apply(scene, &mut self.host);
        self.publish_selected(index, SelectionOrigin::External);
        Some(index)
    }

    /// Present `name` as the selection without announcing it. Returns how many nodes
    /// are emphasised.
    pub fn apply_selection(&mut self, name: Option<&str>) -> usize {
        self.presenter.select(name);
        match self.scene.as_mut() {
            Some(scene) => self.presenter.apply(scene, &mut self.host),
            None => 0,
        }
    }

    pub fn clear_selection(&mut self) {
        self.presenter.select(None);
        if let Some(scene) = self.scene.as_mut() {
            self.presenter.apply(scene, &mut self.host);
            self.bus.publish(Event::SelectionCleared { scene: scene.id() });
        }
    }

    fn publish_selected(&self, index: NodeIndex, origin: SelectionOrigin) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        if let Some(node) = scene.node(index) {
            self.bus.publish(Event::NodeSelected {
                scene: scene.id(),
                index,
                node: node.source.clone(),
                origin,
            });
        }
    }
}

impl<H: RenderHost> Drop for TreeView<H> {
    fn drop(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.teardown(&mut self.host);
        }
    }
}
