use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bubble_chart_rs::ChartError;
use bubble_chart_rs::api::{BubbleChart, BubbleChartConfig, ChartHandle, ChartPhase};
use bubble_chart_rs::core::{Dataset, NodeId, Record};
use bubble_chart_rs::render::NullRenderer;

const FRAME: Duration = Duration::from_millis(100);

fn names(labels: &[&str]) -> Dataset {
    let records = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            Record::new()
                .with_field("title", *label)
                .with_field("category", if index % 2 == 0 { "F" } else { "M" })
                .with_field("magnitude", 100.0 + index as f64)
        })
        .collect();
    Dataset::new(records).expect("uniform records")
}

fn chart() -> BubbleChart {
    BubbleChart::new(
        BubbleChartConfig::new()
            .with_title("Most popular baby names in 1880")
            .with_label_on_bubble(true)
            .with_transition_ms(500),
    )
}

fn run_removal(handle: &mut ChartHandle<NullRenderer>) {
    for _ in 0..10 {
        handle.advance(FRAME).expect("advance");
    }
}

#[test]
fn removal_fades_then_detaches_everything() {
    let mut handle = chart()
        .render(&names(&["Mary", "Anna", "Emma"]), NullRenderer::default())
        .expect("render");
    let token = handle.remove();
    assert_eq!(handle.phase(), ChartPhase::Removing);
    assert!(!token.is_complete());

    handle.advance(Duration::from_millis(250)).expect("advance");
    let frame = handle.surface().last_frame.clone().expect("frame");
    let title = frame.title.as_ref().expect("title still fading");
    assert!((title.opacity - 0.5).abs() < 1e-9);
    assert!(frame.bubbles.iter().all(|bubble| (bubble.opacity - 0.5).abs() < 1e-9));
    assert!(!token.is_complete());

    handle.advance(Duration::from_millis(250)).expect("advance");
    assert!(token.is_complete());
    assert!(handle.is_detached());
    assert_eq!(handle.surface().last_bubble_count, 0);
    assert_eq!(handle.surface().last_text_count, 0);
    assert!(handle.surface().attached_labels().is_empty());
}

#[test]
fn layout_freezes_once_removal_starts() {
    let mut handle = chart()
        .render(&names(&["Mary", "Anna"]), NullRenderer::default())
        .expect("render");
    handle.advance(FRAME).expect("advance");
    let ticks = handle.layout().ticks();

    handle.remove();
    assert!(!handle.tick());
    handle.advance(FRAME).expect("advance");
    assert_eq!(handle.layout().ticks(), ticks);
    assert!(matches!(handle.settle(10), Err(ChartError::ChartDetached)));
}

#[test]
fn remove_with_reports_each_node_once_before_the_token_completes() {
    let removed = Rc::new(RefCell::new(Vec::new()));
    let mut handle = chart()
        .render(&names(&["Mary", "Anna", "Emma"]), NullRenderer::default())
        .expect("render");

    let sink = Rc::clone(&removed);
    let token = handle.remove_with(move |node| sink.borrow_mut().push(node));
    handle.advance(FRAME).expect("advance");
    assert!(removed.borrow().is_empty());

    run_removal(&mut handle);
    assert!(token.is_complete());
    assert_eq!(*removed.borrow(), vec![NodeId(0), NodeId(1), NodeId(2)]);
}

#[test]
fn repeated_remove_shares_one_token() {
    let count = Rc::new(RefCell::new(0_usize));
    let mut handle = chart()
        .render(&names(&["Mary", "Anna"]), NullRenderer::default())
        .expect("render");

    let first = handle.remove();
    let sink = Rc::clone(&count);
    let second = handle.remove_with(move |_| *sink.borrow_mut() += 1);
    run_removal(&mut handle);

    assert!(first.is_complete() && second.is_complete());
    assert_eq!(*count.borrow(), 2);

    let late = handle.remove();
    assert!(late.is_complete());
    handle.advance(FRAME).expect("detached charts ignore frames");
}

#[test]
fn zero_length_transition_detaches_on_next_frame() {
    let mut handle = BubbleChart::new(BubbleChartConfig::new().with_transition_ms(0))
        .render(&names(&["Mary"]), NullRenderer::default())
        .expect("render");
    let token = handle.remove();
    handle.advance(Duration::ZERO).expect("advance");
    assert!(token.is_complete());
}

#[test]
fn pointer_is_ignored_while_removing() {
    let mut handle = chart()
        .render(&names(&["Mary"]), NullRenderer::default())
        .expect("render");
    let (x, y) = handle.node_position(NodeId(0)).expect("node");
    assert!(handle.pointer_move(x, y).is_some());

    handle.remove();
    assert!(handle.tooltip().is_none());
    assert!(handle.pointer_move(x, y).is_none());
}

#[test]
fn surface_is_reusable_after_detach() {
    let mut first = chart()
        .render(&names(&["Mary", "Anna", "Emma"]), NullRenderer::default())
        .expect("render");
    first.remove();
    run_removal(&mut first);

    let surface = first.into_surface();
    let second = chart()
        .render(&names(&["Liam", "Noah", "Olivia", "Ava", "Mia"]), surface)
        .expect("render");

    assert_eq!(second.node_count(), 5);
    let labels = second.surface().attached_labels();
    assert_eq!(labels.len(), 5);
    for gone in ["Mary", "Anna", "Emma"] {
        assert!(!labels.iter().any(|label| label == gone));
    }
}
