use bubble_chart_rs::api::{BubbleChart, BubbleChartConfig, ChartHandle};
use bubble_chart_rs::core::{Dataset, LayoutEngine, NodeId, Record};
use bubble_chart_rs::names::{NameDataset, RankedName, baby_chart_config};
use bubble_chart_rs::render::NullRenderer;

fn dataset(count: usize) -> Dataset {
    let records = (0..count)
        .map(|index| {
            Record::new()
                .with_field("title", format!("name-{index}"))
                .with_field("category", if index % 2 == 0 { "F" } else { "M" })
                .with_field("magnitude", (index as f64 + 1.0) * 100.0)
        })
        .collect();
    Dataset::new(records).expect("uniform records")
}

#[test]
fn layout_cools_and_settles() {
    let mut engine = LayoutEngine::new(&[10.0; 12], -50.0, 7);
    assert_eq!(engine.alpha(), 1.0);
    assert!(engine.tick());
    assert!(engine.alpha() < 1.0);

    let ticks = engine.run_until_settled(10_000);
    assert!(engine.is_settled());
    assert!(ticks > 100 && ticks < 1_000, "settled after {ticks} ticks");
}

#[test]
fn same_seed_gives_the_same_layout() {
    let mut a = LayoutEngine::new(&[5.0, 9.0, 12.0, 20.0], -50.0, 42);
    let mut b = LayoutEngine::new(&[5.0, 9.0, 12.0, 20.0], -50.0, 42);
    a.run_until_settled(500);
    b.run_until_settled(500);
    assert_eq!(a.nodes(), b.nodes());
}

fn assert_no_overlap(handle: &ChartHandle<NullRenderer>) {
    let nodes = handle.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let (ax, ay) = handle.node_position(a.id).expect("a");
            let (bx, by) = handle.node_position(b.id).expect("b");
            let distance = (ax - bx).hypot(ay - by);
            assert!(
                distance >= 0.9 * (a.radius + b.radius),
                "{} and {} overlap: distance {distance}",
                a.label,
                b.label
            );
        }
    }
}

#[test]
fn large_dataset_settles_inside_the_viewport() {
    let mut handle = BubbleChart::default()
        .render(&dataset(800), NullRenderer::default())
        .expect("render");
    handle.settle(5_000).expect("live chart settles");

    let viewport = handle.config().viewport();
    let (width, height) = (f64::from(viewport.width), f64::from(viewport.height));
    for node in handle.nodes() {
        let (x, y) = handle.node_position(node.id).expect("node exists");
        assert!(viewport.contains(x, y), "{} escaped to ({x}, {y})", node.label);
        assert!(
            x - node.radius >= -1e-9 && x + node.radius <= width + 1e-9,
            "{} crosses a side edge at x = {x}",
            node.label
        );
        assert!(
            y - node.radius >= -1e-9 && y + node.radius <= height + 1e-9,
            "{} crosses the top or bottom edge at y = {y}",
            node.label
        );
    }
}

#[test]
fn collision_padding_keeps_bubbles_apart() {
    let chart = BubbleChart::new(
        BubbleChartConfig::new()
            .with_min_radius(10.0)
            .with_max_radius(16.0)
            .with_collision_padding(Some(2.0)),
    );
    let mut handle = chart
        .render(&dataset(10), NullRenderer::default())
        .expect("render");
    handle.settle(2_000).expect("settle");
    assert_no_overlap(&handle);
}

#[test]
fn default_config_settles_without_overlap() {
    let mut handle = BubbleChart::default()
        .render(&dataset(30), NullRenderer::default())
        .expect("render");
    handle.settle(2_000).expect("settle");
    assert_no_overlap(&handle);
}

#[test]
fn baby_names_preset_settles_without_overlap() {
    let names = NameDataset::Ranked(
        (0..12)
            .map(|index| RankedName {
                name: format!("name-{index}"),
                sex: if index % 2 == 0 { "F" } else { "M" }.to_owned(),
                count: 100 + 10 * index,
            })
            .collect(),
    );
    let dataset = names.to_dataset().expect("uniform records");
    let mut handle = BubbleChart::new(baby_chart_config(1880))
        .render(&dataset, NullRenderer::default())
        .expect("render");
    handle.settle(2_000).expect("settle");
    assert_no_overlap(&handle);
}

#[test]
fn cluster_is_centered_below_the_title_margin() {
    let mut handle = BubbleChart::default()
        .render(&dataset(1), NullRenderer::default())
        .expect("render");
    handle.settle(2_000).expect("settle");
    let (x, y) = handle.node_position(NodeId(0)).expect("node");
    assert!((x - 480.0).abs() < 1.0 && (y - 528.0).abs() < 1.0, "({x}, {y})");
}

#[test]
fn frame_advance_ticks_the_layout() {
    let mut handle = BubbleChart::default()
        .render(&dataset(5), NullRenderer::default())
        .expect("render");
    assert_eq!(handle.layout().ticks(), 0);
    handle
        .advance(std::time::Duration::from_millis(16))
        .expect("advance");
    assert_eq!(handle.layout().ticks(), 1);
    assert_eq!(handle.surface().frames_rendered, 2);
}
