use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use conceptree_core::{TreeNode, parse_tree_document};
use conceptree_events::Event;
use conceptree_graph::{ConfidenceTier, RecordingHost, TreeStats, TreeView, ViewSettings};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tree, analysis result, or API response JSON
    tree: PathBuf,

    /// View settings JSON; missing or invalid fields fall back to defaults
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Connector jitter seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Emphasise every node with this name
    #[arg(long)]
    select: Option<String>,

    /// Rotation about the vertical axis, in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotate: f32,

    /// Surface width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Physical pixels per logical pixel
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct NodeRow {
    index: usize,
    name: String,
    depth: u32,
    tier: ConfidenceTier,
    rest: [f32; 3],
    current: [f32; 3],
    emphasized: bool,
}

#[derive(Debug, Serialize)]
struct SkippedRow {
    name: String,
    depth: u32,
    reason: String,
    subtree_size: usize,
}

#[derive(Debug, Serialize)]
struct LayoutSnapshot {
    scene: String,
    rotation_y: f32,
    camera_y: f32,
    connectors: usize,
    nodes: Vec<NodeRow>,
    skipped: Vec<SkippedRow>,
    stats: TreeStats,
    events: Vec<Event>,
}

impl LayoutSnapshot {
    fn capture(view: &TreeView<RecordingHost>, tree: &TreeNode, events: Vec<Event>) -> Self {
        let interaction = view.interaction();
        let mut snapshot = Self {
            scene: String::new(),
            rotation_y: interaction.rotation_y,
            camera_y: interaction.camera_y,
            connectors: 0,
            nodes: Vec::new(),
            skipped: Vec::new(),
            stats: TreeStats::from_tree(tree),
            events,
        };

        if let Some(scene) = view.scene() {
            snapshot.scene = scene.id().to_string();
            snapshot.stats = TreeStats::from_scene(scene);
            snapshot.connectors = scene.connectors().len();
            snapshot.nodes = scene
                .nodes()
                .iter()
                .map(|node| NodeRow {
                    index: node.index.0,
                    name: node.source.name.clone(),
                    depth: node.depth,
                    tier: node.tier,
                    rest: node.rest_position.to_array(),
                    current: node.current_position.to_array(),
                    emphasized: node.emphasized,
                })
                .collect();
            snapshot.skipped = scene
                .skipped()
                .iter()
                .map(|skipped| SkippedRow {
                    name: skipped.name.clone(),
                    depth: skipped.depth,
                    reason: skipped.defect.to_string(),
                    subtree_size: skipped.subtree_size,
                })
                .collect();
        }
        snapshot
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scene {}: {} nodes, {} connectors, {} skipped",
            self.scene,
            self.nodes.len(),
            self.connectors,
            self.skipped.len()
        );
        let _ = writeln!(
            out,
            "Rotation {:.3} rad, camera y {:.3}",
            self.rotation_y, self.camera_y
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>4}  {:>5}  {:<6}  {:<24}  {:<26}  {:<26}",
            "#", "depth", "tier", "name", "rest", "current"
        );
        for row in &self.nodes {
            let marker = if row.emphasized { "*" } else { "" };
            let _ = writeln!(
                out,
                "{:>4}  {:>5}  {:<6}  {:<24}  {:<26}  {:<26}",
                row.index,
                row.depth,
                row.tier.label(),
                format!("{}{marker}", row.name),
                format_point(row.rest),
                format_point(row.current)
            );
        }

        for skipped in &self.skipped {
            let _ = writeln!(
                out,
                "Skipped '{}' at depth {} ({} nodes): {}",
                skipped.name, skipped.depth, skipped.subtree_size, skipped.reason
            );
        }

        let stats = &self.stats;
        let _ = writeln!(out);
        let _ = writeln!(out, "Root term:          {}", stats.root_term);
        let _ = writeln!(out, "Nodes:              {}", stats.node_count);
        let _ = writeln!(out, "Max depth:          {}", stats.max_depth);
        let _ = writeln!(out, "Principles:         {}", stats.total_principles);
        let _ = writeln!(out, "Average confidence: {:.2}", stats.average_confidence);
        let _ = writeln!(out, "Processing time:    {} ms", stats.processing_time_ms);
        let tiers: Vec<String> = [ConfidenceTier::High, ConfidenceTier::Medium, ConfidenceTier::Low]
            .iter()
            .map(|tier| format!("{} {}", tier.label(), stats.tier_count(*tier)))
            .collect();
        let _ = writeln!(out, "Tiers:              {}", tiers.join(", "));
        for (category, count) in &stats.principles_per_category {
            let _ = writeln!(out, "  {:<18}{count}", category.label());
        }
        out
    }
}

fn format_point(p: [f32; 3]) -> String {
    format!("({:7.3}, {:7.3}, {:7.3})", p[0], p[1], p[2])
}

fn run(args: &Args) -> Result<String> {
    let document = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("Failed to read {}", args.tree.display()))?;
    let tree = parse_tree_document(&document)
        .with_context(|| format!("Failed to parse {}", args.tree.display()))?;

    let mut settings = match &args.settings {
        Some(path) => ViewSettings::load_or_default(path),
        None => ViewSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.connectors.seed = Some(seed);
    }

    let host = RecordingHost::new(args.width, args.height, args.pixel_ratio);
    let mut view = TreeView::new(host, settings);
    view.show(&tree)?;

    if let Some(name) = &args.select {
        if view.select_by_name(name).is_none() {
            tracing::warn!("No node named '{name}' to select");
        }
    }
    view.set_rotation(args.rotate);
    view.frame();

    let events = view.bus().drain();
    let snapshot = LayoutSnapshot::capture(&view, &tree, events);
    match args.format {
        Format::Json => Ok(serde_json::to_string_pretty(&snapshot)?),
        Format::Text => Ok(snapshot.render_text()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let output = run(&args)?;
    println!("{output}");
    Ok(())
}
