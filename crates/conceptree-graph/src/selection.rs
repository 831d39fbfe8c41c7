use crate::host::RenderHost;
use crate::scene::SceneHandle;
use crate::settings::SelectionSettings;
use crate::style::Color;
use conceptree_core::NodeIndex;

/// Emphasises the node whose name matches the current selection.
///
/// Matching is by name, so every node sharing the selected name is emphasised.
#[derive(Debug, Clone)]
pub struct SelectionPresenter {
    selected: Option<String>,
    emphasis_color: Color,
    emphasis_scale: f32,
}

impl SelectionPresenter {
    pub fn new(settings: &SelectionSettings) -> Self {
        Self {
            selected: None,
            emphasis_color: settings.emphasis_color,
            emphasis_scale: settings.emphasis_scale,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns `true` when the selection changed.
    pub fn select(&mut self, name: Option<&str>) -> bool {
        if self.selected.as_deref() == name {
            return false;
        }
        self.selected = name.map(str::to_string);
        true
    }

    /// Push the current selection onto `scene`; returns how many nodes are emphasised.
    pub fn apply<H: RenderHost + ?Sized>(&self, scene: &mut SceneHandle, host: &mut H) -> usize {
        let targets: Vec<(NodeIndex, bool)> = scene
            .nodes()
            .iter()
            .map(|node| (node.index, self.selected.as_deref() == Some(node.source.name.as_str())))
            .collect();

        let mut emphasised = 0;
        for (index, matches) in targets {
            if matches {
                scene.set_emphasis(host, index, Some(self.emphasis_color), self.emphasis_scale);
                emphasised += 1;
            } else {
                scene.set_emphasis(host, index, None, 1.0);
            }
        }
        emphasised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingHost;
    use crate::scene::SceneComposer;
    use crate::style::COLOR_EMPHASIS;
    use conceptree_core::TreeNode;
    use conceptree_events::SceneId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scene(host: &mut RecordingHost) -> SceneHandle {
        // "steel" appears twice on purpose.
        let tree = TreeNode::new("bridge", 0)
            .with_child(TreeNode::new("beam", 1).with_child(TreeNode::new("steel", 2)))
            .with_child(TreeNode::new("cable", 1).with_child(TreeNode::new("steel", 2)));
        SceneComposer::default()
            .build(host, &tree, SceneId::new(), &mut StdRng::seed_from_u64(1))
            .unwrap()
    }

    #[test]
    fn test_select_reports_changes() {
        let mut presenter = SelectionPresenter::new(&SelectionSettings::default());
        assert!(presenter.select(Some("beam")));
        assert!(!presenter.select(Some("beam")));
        assert_eq!(presenter.selected(), Some("beam"));
        assert!(presenter.select(None));
    }

    #[test]
    fn test_apply_emphasises_only_matching_node() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = scene(&mut host);
        let mut presenter = SelectionPresenter::new(&SelectionSettings::default());

        presenter.select(Some("beam"));
        assert_eq!(presenter.apply(&mut scene, &mut host), 1);

        for node in scene.nodes() {
            let marker = host.primitive(node.marker).unwrap();
            let label = host.primitive(node.label).unwrap();
            if node.source.name == "beam" {
                assert!(node.emphasized);
                assert_eq!(marker.emphasis, Some(COLOR_EMPHASIS));
                assert_eq!(marker.transform.scale, 1.5);
                assert_eq!(label.transform.scale, 1.5);
            } else {
                assert!(!node.emphasized);
                assert_eq!(marker.emphasis, None);
                assert_eq!(marker.transform.scale, 1.0);
            }
        }
    }

    #[test]
    fn test_changing_selection_resets_previous() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = scene(&mut host);
        let mut presenter = SelectionPresenter::new(&SelectionSettings::default());

        presenter.select(Some("beam"));
        presenter.apply(&mut scene, &mut host);
        presenter.select(Some("cable"));
        presenter.apply(&mut scene, &mut host);

        let beam = scene.find_by_name("beam").next().unwrap();
        assert!(!beam.emphasized);
        assert_eq!(beam.scale, 1.0);
        assert!(scene.find_by_name("cable").next().unwrap().emphasized);
    }

    #[test]
    fn test_duplicate_names_are_all_emphasised() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = scene(&mut host);
        let mut presenter = SelectionPresenter::new(&SelectionSettings::default());

        presenter.select(Some("steel"));
        assert_eq!(presenter.apply(&mut scene, &mut host), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = scene(&mut host);
        let mut presenter = SelectionPresenter::new(&SelectionSettings::default());

        presenter.select(Some("steel"));
        presenter.apply(&mut scene, &mut host);
        presenter.select(None);
        assert_eq!(presenter.apply(&mut scene, &mut host), 0);
        assert!(scene.nodes().iter().all(|n| !n.emphasized && n.scale == 1.0));
    }
}
