use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Color, Dataset, FieldValue, LayoutBounds, LayoutEngine, NodeId, RadiusScale, Record,
};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{BubbleChartConfig, ChartHandle};

/// One datum resolved against the chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleNode {
    pub id: NodeId,
    pub label: String,
    pub category: String,
    pub magnitude: f64,
    /// Magnitude as it appeared in the record, used for tooltips.
    pub magnitude_text: String,
    pub radius: f64,
    pub color: Color,
}

/// A fully validated chart that has not touched any surface yet.
#[derive(Debug, Clone)]
pub struct PreparedChart {
    pub(crate) config: BubbleChartConfig,
    pub(crate) nodes: Vec<BubbleNode>,
    pub(crate) layout: LayoutEngine,
    pub(crate) radius_scale: RadiusScale,
    pub(crate) legend: IndexMap<String, Color>,
}

impl PreparedChart {
    #[must_use]
    pub fn nodes(&self) -> &[BubbleNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn radius_scale(&self) -> RadiusScale {
        self.radius_scale
    }

    #[must_use]
    pub fn legend(&self) -> &IndexMap<String, Color> {
        &self.legend
    }

    /// Takes ownership of `surface`. Nothing is drawn until
    /// [`ChartHandle::attach`] or the first frame advance.
    #[must_use]
    pub fn mount<R: Renderer>(self, surface: R) -> ChartHandle<R> {
        ChartHandle::new(self, surface)
    }
}

/// Reusable bubble chart renderer.
///
/// ```
/// use bubble_chart_rs::api::{BubbleChart, BubbleChartConfig};
/// use bubble_chart_rs::core::{Dataset, Record};
/// use bubble_chart_rs::render::NullRenderer;
///
/// let dataset = Dataset::new(vec![
///     Record::new()
///         .with_field("title", "Mary")
///         .with_field("category", "F")
///         .with_field("magnitude", 7065.0),
/// ])
/// .expect("uniform records");
/// let chart = BubbleChart::new(BubbleChartConfig::new().with_title("1880"));
/// let handle = chart.render(&dataset, NullRenderer::default()).expect("render");
/// assert_eq!(handle.node_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BubbleChart {
    config: BubbleChartConfig,
}

impl BubbleChart {
    #[must_use]
    pub fn new(config: BubbleChartConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BubbleChartConfig {
        &self.config
    }

    /// Validates configuration and data and computes scales, colors and the
    /// initial layout. Fails without side effects.
    pub fn prepare(&self, dataset: &Dataset) -> ChartResult<PreparedChart> {
        let config = &self.config;
        config.validate()?;

        let mut resolved = Vec::with_capacity(dataset.len());
        for (index, record) in dataset.iter().enumerate() {
            let label = required_field(record, &config.label_field, index)?;
            let category = required_field(record, &config.color_field, index)?;
            let raw_magnitude = required_field(record, &config.magnitude_field, index)?;
            let magnitude = raw_magnitude
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .ok_or_else(|| ChartError::InvalidMagnitude {
                    field: config.magnitude_field.clone(),
                    index,
                    value: raw_magnitude.to_string(),
                })?;
            resolved.push((label.to_string(), category.to_string(), magnitude, raw_magnitude.to_string()));
        }

        let radius_scale = RadiusScale::from_magnitudes(
            resolved.iter().map(|(_, _, magnitude, _)| *magnitude),
            config.min_radius,
            config.max_radius,
        );
        let mut colorizer = config.palette.colorizer()?;

        let nodes: Vec<BubbleNode> = resolved
            .into_iter()
            .enumerate()
            .map(|(index, (label, category, magnitude, magnitude_text))| BubbleNode {
                id: NodeId(index),
                color: colorizer.color_for(&category),
                radius: radius_scale.radius(magnitude),
                label,
                category,
                magnitude,
                magnitude_text,
            })
            .collect();

        let radii: Vec<f64> = nodes.iter().map(|node| node.radius).collect();
        let (cx, cy) = config.center();
        let layout = LayoutEngine::new(&radii, config.force_strength, config.layout_seed)
            .with_collision_padding(config.collision_padding)
            .with_bounds(Some(LayoutBounds::from_viewport(config.viewport(), cx, cy)));

        let (domain_min, domain_max) = radius_scale.domain();
        debug!(
            records = nodes.len(),
            domain_min,
            domain_max,
            categories = colorizer.assigned().len(),
            "prepared bubble chart"
        );

        Ok(PreparedChart {
            config: config.clone(),
            nodes,
            layout,
            radius_scale,
            legend: colorizer.assigned().clone(),
        })
    }

    /// Prepares, mounts and draws the first frame onto `surface`.
    pub fn render<R: Renderer>(&self, dataset: &Dataset, surface: R) -> ChartResult<ChartHandle<R>> {
        let mut handle = self.prepare(dataset)?.mount(surface);
        handle.attach()?;
        Ok(handle)
    }
}

fn required_field<'a>(record: &'a Record, field: &str, index: usize) -> ChartResult<&'a FieldValue> {
    record.get(field).ok_or_else(|| ChartError::MissingField {
        field: field.to_owned(),
        index,
    })
}
