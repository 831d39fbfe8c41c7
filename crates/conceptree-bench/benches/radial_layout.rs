use conceptree_bench::util;
use conceptree_events::SceneId;
use conceptree_graph::{DepthGroups, Layouter, RadialLayouter, RecordingHost, SceneComposer};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_radial_layout_1000_nodes(c: &mut Criterion) {
    let tree = util::generate_synthetic_tree(1000, 4);
    let layouter = RadialLayouter::default();

    c.bench_function("depth_grouping_1000_nodes", |b| {
        b.iter(|| {
            let groups = DepthGroups::from_tree(black_box(&tree));
            black_box(groups.node_count());
        })
    });

    let groups = DepthGroups::from_tree(&tree);
    c.bench_function("radial_layout_1000_nodes", |b| {
        b.iter(|| {
            let positions = layouter.execute(black_box(&groups));
            black_box(positions);
        })
    });
}

fn bench_scene_build_1000_nodes(c: &mut Criterion) {
    let tree = util::generate_synthetic_tree(1000, 4);
    let composer = SceneComposer::default();

    c.bench_function("scene_build_1000_nodes", |b| {
        b.iter(|| {
            let mut host = RecordingHost::new(1280, 720, 2.0);
            let mut rng = StdRng::seed_from_u64(7);
            let scene = composer.build(&mut host, black_box(&tree), SceneId::new(), &mut rng);
            black_box(scene.map(|s| s.primitive_count()).unwrap_or_default());
        })
    });
}

criterion_group!(
    benches,
    bench_radial_layout_1000_nodes,
    bench_scene_build_1000_nodes
);
criterion_main!(benches);
