use tracing::debug;

use crate::api::{BubbleChart, BubbleChartConfig, RefreshProfile};
use crate::core::{Dataset, Record};
use crate::error::{ChartError, ChartResult};

use super::loader::FsDataSource;
use super::{COUNT_FIELD, NAME_FIELD, SEX_FIELD};

/// Share of the year's top count a name needs to be drawn.
pub const POPULARITY_FRACTION: f64 = 0.3;
/// First year of the SSA series.
pub const DEFAULT_FALLBACK_YEAR: u16 = 1880;

const BOY_COLOR: &str = "#70b7f0";
const GIRL_COLOR: &str = "#e76486";

/// The year a view shows: an explicit selection or the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSelection {
    pub selected: Option<u16>,
    pub fallback: u16,
}

impl Default for YearSelection {
    fn default() -> Self {
        Self {
            selected: None,
            fallback: DEFAULT_FALLBACK_YEAR,
        }
    }
}

impl YearSelection {
    #[must_use]
    pub fn year(&self) -> u16 {
        self.selected.unwrap_or(self.fallback)
    }

    pub fn select(&mut self, year: u16) {
        self.selected = Some(year);
    }

    /// Data file of the shown year.
    #[must_use]
    pub fn path(&self) -> String {
        FsDataSource::path_for(self.year())
    }
}

/// Chart setup for the most-popular-names view of `year`.
#[must_use]
pub fn baby_chart_config(year: u16) -> BubbleChartConfig {
    BubbleChartConfig::new()
        .with_width(850)
        .with_height(850)
        .with_min_radius(7.0)
        .with_max_radius(55.0)
        .with_force_strength(-170.0)
        .with_color_field(SEX_FIELD)
        .with_magnitude_field(COUNT_FIELD)
        .with_label_field(NAME_FIELD)
        .with_unit_label("babies")
        .with_custom_palette(["M", "F"], [BOY_COLOR, GIRL_COLOR])
        .with_label_on_bubble(true)
        .with_title(format!("Most popular baby names in {year}"))
}

/// Keeps records whose `BirthCount` is at least `fraction` of the largest
/// count, sorted by name.
pub fn retain_popular_records(dataset: &Dataset, fraction: f64) -> ChartResult<Dataset> {
    let counts = dataset
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let value = record.get(COUNT_FIELD).ok_or_else(|| ChartError::MissingField {
                field: COUNT_FIELD.to_owned(),
                index,
            })?;
            value.as_f64().ok_or_else(|| ChartError::InvalidMagnitude {
                field: COUNT_FIELD.to_owned(),
                index,
                value: value.to_string(),
            })
        })
        .collect::<ChartResult<Vec<f64>>>()?;

    let max = counts.iter().copied().fold(0.0_f64, f64::max);
    let threshold = fraction * max;
    let mut kept = counts.iter();
    let mut popular = dataset.filtered(|_| kept.next().is_some_and(|count| *count >= threshold));
    popular.sort_by(|a, b| {
        let name = |record: &Record| record.get(NAME_FIELD).map(ToString::to_string);
        name(a).cmp(&name(b))
    });
    debug!(
        total = dataset.len(),
        kept = popular.len(),
        threshold,
        "filtered popular names"
    );
    Ok(popular)
}

/// Refresh profile of the baby-names page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BabyNamesProfile {
    pub popularity_fraction: f64,
}

impl Default for BabyNamesProfile {
    fn default() -> Self {
        Self {
            popularity_fraction: POPULARITY_FRACTION,
        }
    }
}

impl RefreshProfile for BabyNamesProfile {
    fn path_for(&self, year: u16) -> String {
        FsDataSource::path_for(year)
    }

    fn chart_for(&self, year: u16) -> BubbleChart {
        BubbleChart::new(baby_chart_config(year))
    }

    fn prepare_dataset(&self, dataset: Dataset) -> ChartResult<Dataset> {
        retain_popular_records(&dataset, self.popularity_fraction)
    }
}
