use conceptree_core::{NodeIndex, TreeNode};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod telemetry;

/// Identity of one built scene. A rebuilt tree always gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(pub Uuid);

impl SceneId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// Resolved from a pointer ray.
    Pick,
    /// Requested by the surrounding application.
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Selection
    NodeSelected {
        scene: SceneId,
        index: NodeIndex,
        node: TreeNode,
        origin: SelectionOrigin,
    },
    SelectionCleared {
        scene: SceneId,
    },

    // Interaction
    /// Whether the view is being dragged; hosts use it to swap the pointer cursor.
    InteractionChanged {
        dragging: bool,
    },

    // Scene lifecycle
    SceneBuilt {
        scene: SceneId,
        node_count: usize,
        skipped_count: usize,
        max_depth: u32,
    },
    SceneTornDown {
        scene: SceneId,
        released_primitives: usize,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Drain every pending event, e.g. once per frame.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the frame loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
