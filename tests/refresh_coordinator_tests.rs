use std::collections::HashMap;
use std::time::Duration;

use bubble_chart_rs::{ChartError, ChartResult};
use bubble_chart_rs::api::{
    BubbleChart, BubbleChartConfig, DataSource, FetchRequest, RefreshCoordinator, RefreshOutcome,
    RefreshProfile,
};
use bubble_chart_rs::core::{Dataset, Viewport};
use bubble_chart_rs::names::{BabyNamesProfile, NameDataset, RankedName};
use bubble_chart_rs::render::{NullRenderer, RenderFrame, Renderer};

const FRAME: Duration = Duration::from_millis(100);

fn year_dataset(names: &[(&str, &str, u64)]) -> Dataset {
    NameDataset::Ranked(
        names
            .iter()
            .map(|(name, sex, count)| RankedName {
                name: (*name).to_owned(),
                sex: (*sex).to_owned(),
                count: *count,
            })
            .collect(),
    )
    .to_dataset()
    .expect("uniform records")
}

fn year_a() -> Dataset {
    year_dataset(&[("Mary", "F", 50), ("John", "M", 40), ("Anna", "F", 30)])
}

fn year_b() -> Dataset {
    year_dataset(&[
        ("Liam", "M", 100),
        ("Olivia", "F", 90),
        ("Noah", "M", 80),
        ("Emma", "F", 70),
        ("Ava", "F", 60),
    ])
}

#[derive(Default)]
struct MemorySource {
    years: HashMap<String, Dataset>,
    loads: Vec<String>,
}

impl MemorySource {
    fn with_year(mut self, year: u16, dataset: Dataset) -> Self {
        self.years
            .insert(BabyNamesProfile::default().path_for(year), dataset);
        self
    }
}

impl DataSource for MemorySource {
    fn load(&mut self, path: &str) -> ChartResult<Dataset> {
        self.loads.push(path.to_owned());
        self.years.get(path).cloned().ok_or_else(|| ChartError::Load {
            path: path.to_owned(),
            reason: "not found".to_owned(),
        })
    }
}

fn coordinator() -> RefreshCoordinator<NullRenderer, BabyNamesProfile> {
    RefreshCoordinator::new(BabyNamesProfile::default(), NullRenderer::default())
}

fn next_fetch(
    coordinator: &mut RefreshCoordinator<NullRenderer, BabyNamesProfile>,
) -> FetchRequest {
    for _ in 0..20 {
        if let Some(request) = coordinator.advance(FRAME).expect("advance") {
            return request;
        }
    }
    panic!("no fetch issued after 20 frames");
}

fn live_labels(coordinator: &RefreshCoordinator<NullRenderer, BabyNamesProfile>) -> Vec<String> {
    coordinator
        .live_chart()
        .expect("live chart")
        .surface()
        .attached_labels()
}

#[test]
fn first_selection_fetches_immediately() {
    let mut coordinator = coordinator();
    let id = coordinator.select_year(1880);
    let request = coordinator.advance(FRAME).expect("advance").expect("fetch");

    assert_eq!(request.id, id);
    assert_eq!(request.path, "names/yob1880.txt");
    let outcome = coordinator
        .complete_fetch(request.id, Ok(year_a()))
        .expect("render");
    assert_eq!(
        outcome,
        RefreshOutcome::Rendered {
            id,
            year: 1880,
            nodes: 3
        }
    );
    assert_eq!(coordinator.current_year(), Some(1880));
    assert!(!coordinator.is_refreshing());
}

#[test]
fn refresh_replaces_every_bubble_of_the_previous_year() {
    let mut coordinator = coordinator();
    let mut source = MemorySource::default()
        .with_year(1880, year_a())
        .with_year(2016, year_b());

    coordinator.select_year(1880);
    coordinator
        .advance_with_source(FRAME, &mut source)
        .expect("refresh")
        .expect("rendered");

    coordinator.select_year(2016);
    let mut outcome = None;
    for _ in 0..20 {
        outcome = coordinator
            .advance_with_source(FRAME, &mut source)
            .expect("refresh");
        if outcome.is_some() {
            break;
        }
    }
    assert!(matches!(outcome, Some(RefreshOutcome::Rendered { nodes: 5, .. })));

    let labels = live_labels(&coordinator);
    assert_eq!(labels.len(), 5);
    for old in ["Mary", "John", "Anna"] {
        assert!(!labels.iter().any(|label| label == old), "{old} survived the refresh");
    }
    assert_eq!(source.loads, vec!["names/yob1880.txt", "names/yob2016.txt"]);
}

#[test]
fn fetch_waits_for_teardown_and_early_responses_are_stale() {
    let mut coordinator = coordinator();
    coordinator.select_year(1880);
    let first = next_fetch(&mut coordinator);
    coordinator
        .complete_fetch(first.id, Ok(year_a()))
        .expect("render");

    let id = coordinator.select_year(2016);
    // response racing ahead of the fade-out
    let early = coordinator
        .complete_fetch(id, Ok(year_b()))
        .expect("stale response is not an error");
    assert_eq!(early, RefreshOutcome::Stale { id });
    assert_eq!(live_labels(&coordinator).len(), 3);

    let request = next_fetch(&mut coordinator);
    assert_eq!(request.id, id);
    assert!(coordinator.live_chart().is_none());
    assert!(coordinator.idle_surface().is_some());

    let outcome = coordinator
        .complete_fetch(request.id, Ok(year_b()))
        .expect("render");
    assert!(matches!(outcome, RefreshOutcome::Rendered { year: 2016, nodes: 5, .. }));
}

#[test]
fn only_the_latest_selection_renders() {
    let mut coordinator = coordinator();
    coordinator.select_year(1880);
    let first = next_fetch(&mut coordinator);
    coordinator
        .complete_fetch(first.id, Ok(year_a()))
        .expect("render");

    let superseded = coordinator.select_year(1990);
    let latest = coordinator.select_year(2016);
    assert_eq!(coordinator.pending_request(), Some(latest));

    let request = next_fetch(&mut coordinator);
    assert_eq!(request.id, latest);
    assert_eq!(request.year, 2016);

    let stale = coordinator
        .complete_fetch(superseded, Ok(year_a()))
        .expect("stale");
    assert_eq!(stale, RefreshOutcome::Stale { id: superseded });
    assert!(coordinator.live_chart().is_none());

    coordinator
        .complete_fetch(latest, Ok(year_b()))
        .expect("render");
    assert_eq!(coordinator.current_year(), Some(2016));
    assert_eq!(live_labels(&coordinator).len(), 5);
}

#[test]
fn load_failure_restores_the_previous_year() {
    let mut coordinator = coordinator();
    let mut source = MemorySource::default().with_year(1880, year_a());
    coordinator.select_year(1880);
    coordinator
        .advance_with_source(FRAME, &mut source)
        .expect("refresh");

    coordinator.select_year(1776);
    let err = loop {
        match coordinator.advance_with_source(FRAME, &mut source) {
            Ok(None) => continue,
            Ok(Some(outcome)) => panic!("unexpected outcome {outcome:?}"),
            Err(err) => break err,
        }
    };
    assert!(matches!(err, ChartError::Load { .. }));
    assert!(!err.is_configuration_error());
    assert_eq!(coordinator.current_year(), Some(1880));
    assert_eq!(live_labels(&coordinator).len(), 3);
    assert!(!coordinator.is_refreshing());
}

#[test]
fn unpopular_names_are_filtered_before_rendering() {
    let mut coordinator = coordinator();
    let mut source = MemorySource::default().with_year(
        1880,
        year_dataset(&[("Mary", "F", 7065), ("John", "M", 9655), ("Zilpha", "F", 5)]),
    );
    coordinator.select_year(1880);
    let outcome = coordinator
        .advance_with_source(FRAME, &mut source)
        .expect("refresh")
        .expect("rendered");

    assert!(matches!(outcome, RefreshOutcome::Rendered { nodes: 2, .. }));
    assert_eq!(live_labels(&coordinator), vec!["John", "Mary"]);
}

struct BrokenYearProfile;

impl RefreshProfile for BrokenYearProfile {
    fn path_for(&self, year: u16) -> String {
        format!("{year}.csv")
    }

    fn chart_for(&self, year: u16) -> BubbleChart {
        let config = BubbleChartConfig::new()
            .with_label_field("Name")
            .with_color_field("Sex")
            .with_magnitude_field("BirthCount")
            .with_label_on_bubble(true);
        if year == 1999 {
            BubbleChart::new(config.with_min_radius(40.0).with_max_radius(10.0))
        } else {
            BubbleChart::new(config)
        }
    }
}

#[test]
fn configuration_errors_surface_and_keep_the_previous_chart() {
    let mut coordinator = RefreshCoordinator::new(BrokenYearProfile, NullRenderer::default());
    coordinator.select_year(1880);
    let first = coordinator.advance(FRAME).expect("advance").expect("fetch");
    assert_eq!(first.path, "1880.csv");
    coordinator
        .complete_fetch(first.id, Ok(year_a()))
        .expect("render");

    let id = coordinator.select_year(1999);
    let request = loop {
        if let Some(request) = coordinator.advance(FRAME).expect("advance") {
            break request;
        }
    };
    assert_eq!(request.id, id);
    let err = coordinator
        .complete_fetch(request.id, Ok(year_b()))
        .expect_err("min radius above max radius");
    assert!(err.is_configuration_error());
    assert_eq!(coordinator.current_year(), Some(1880));
    assert_eq!(
        coordinator
            .live_chart()
            .expect("previous chart restored")
            .node_count(),
        3
    );
}

/// Surface that cannot grow past `max_width`.
#[derive(Default)]
struct NarrowSurface {
    inner: NullRenderer,
    max_width: u32,
}

impl Renderer for NarrowSurface {
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if viewport.width > self.max_width {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.inner.resize(viewport)
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        self.inner.render(frame)
    }
}

struct WideYearProfile;

impl RefreshProfile for WideYearProfile {
    fn path_for(&self, year: u16) -> String {
        BabyNamesProfile::default().path_for(year)
    }

    fn chart_for(&self, year: u16) -> BubbleChart {
        let chart = BabyNamesProfile::default().chart_for(year);
        if year == 2000 {
            BubbleChart::new(chart.config().clone().with_width(4_000))
        } else {
            chart
        }
    }
}

#[test]
fn attach_failure_keeps_the_previous_chart_and_the_surface() {
    let surface = NarrowSurface {
        max_width: 2_000,
        ..NarrowSurface::default()
    };
    let mut coordinator = RefreshCoordinator::new(WideYearProfile, surface);
    let mut source = MemorySource::default()
        .with_year(1880, year_a())
        .with_year(2000, year_b())
        .with_year(2016, year_b());
    coordinator.select_year(1880);
    coordinator
        .advance_with_source(FRAME, &mut source)
        .expect("refresh");

    coordinator.select_year(2000);
    let err = loop {
        match coordinator.advance_with_source(FRAME, &mut source) {
            Ok(None) => continue,
            Ok(Some(outcome)) => panic!("unexpected outcome {outcome:?}"),
            Err(err) => break err,
        }
    };
    assert!(matches!(err, ChartError::InvalidViewport { width: 4_000, .. }));
    assert_eq!(coordinator.current_year(), Some(1880));
    assert!(coordinator.idle_surface().is_none());
    let live = coordinator.live_chart().expect("previous chart restored");
    assert_eq!(live.node_count(), 3);
    assert_eq!(live.surface().inner.attached_labels().len(), 3);

    coordinator.select_year(2016);
    let outcome = loop {
        if let Some(outcome) = coordinator
            .advance_with_source(FRAME, &mut source)
            .expect("refresh")
        {
            break outcome;
        }
    };
    assert!(matches!(outcome, RefreshOutcome::Rendered { year: 2016, .. }));
    assert_eq!(coordinator.current_year(), Some(2016));
}
