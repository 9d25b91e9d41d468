use serde::{Deserialize, Serialize};

use crate::core::{CategoryColorizer, Color, Viewport};
use crate::error::{ChartError, ChartResult};

/// Gap kept between bubbles unless a config overrides it.
pub const DEFAULT_COLLISION_PADDING: f64 = 1.0;

/// How bubble colors are chosen from the color field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaletteConfig {
    /// Categorical palette assigned in first-seen order.
    #[default]
    Automatic,
    /// Explicit label to `#rrggbb` table; `domain` and `range` pair by index.
    Custom {
        domain: Vec<String>,
        range: Vec<String>,
    },
}

impl PaletteConfig {
    /// Builds a fresh colorizer for one render.
    pub fn colorizer(&self) -> ChartResult<CategoryColorizer> {
        match self {
            Self::Automatic => Ok(CategoryColorizer::automatic()),
            Self::Custom { domain, range } => {
                let colors = range
                    .iter()
                    .map(|hex| {
                        Color::from_hex(hex).map_err(|_| {
                            ChartError::InvalidConfig(format!("custom palette color `{hex}` is not #rgb/#rrggbb"))
                        })
                    })
                    .collect::<ChartResult<Vec<_>>>()?;
                CategoryColorizer::custom(domain.as_slice(), &colors)
            }
        }
    }
}

/// Bubble chart setup.
///
/// Fields are public for reading; `with_*` methods return the updated config
/// for chaining. Nothing is validated at set time: [`validate`](Self::validate)
/// runs when a chart is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleChartConfig {
    pub width: u32,
    pub height: u32,
    /// Space reserved above the bubble cluster; the title baseline sits here.
    pub top_margin: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Many-body charge; negative values push bubbles apart.
    pub force_strength: f64,
    pub color_field: String,
    pub label_field: String,
    pub magnitude_field: String,
    /// Unit appended to the magnitude in tooltips.
    pub unit_label: String,
    pub palette: PaletteConfig,
    pub show_label_on_bubble: bool,
    pub title: String,
    /// Gap kept between bubbles by the collision force; `None` lets bubbles
    /// overlap.
    pub collision_padding: Option<f64>,
    /// Fade duration of `remove`, in milliseconds.
    pub transition_ms: u64,
    pub layout_seed: u64,
}

impl Default for BubbleChartConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 960,
            top_margin: 96.0,
            min_radius: 6.0,
            max_radius: 20.0,
            force_strength: -50.0,
            color_field: "category".to_owned(),
            label_field: "title".to_owned(),
            magnitude_field: "magnitude".to_owned(),
            unit_label: "units".to_owned(),
            palette: PaletteConfig::Automatic,
            show_label_on_bubble: false,
            title: String::new(),
            collision_padding: Some(DEFAULT_COLLISION_PADDING),
            transition_ms: 500,
            layout_seed: 0x5eed,
        }
    }
}

impl BubbleChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the height and moves the top margin to 5% of it.
    #[must_use]
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self.top_margin = 0.05 * f64::from(height);
        self
    }

    #[must_use]
    pub fn with_top_margin(mut self, top_margin: f64) -> Self {
        self.top_margin = top_margin;
        self
    }

    #[must_use]
    pub fn with_min_radius(mut self, min_radius: f64) -> Self {
        self.min_radius = min_radius;
        self
    }

    #[must_use]
    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = max_radius;
        self
    }

    #[must_use]
    pub fn with_force_strength(mut self, force_strength: f64) -> Self {
        self.force_strength = force_strength;
        self
    }

    #[must_use]
    pub fn with_color_field(mut self, field: impl Into<String>) -> Self {
        self.color_field = field.into();
        self
    }

    #[must_use]
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    #[must_use]
    pub fn with_magnitude_field(mut self, field: impl Into<String>) -> Self {
        self.magnitude_field = field.into();
        self
    }

    #[must_use]
    pub fn with_unit_label(mut self, unit_label: impl Into<String>) -> Self {
        self.unit_label = unit_label.into();
        self
    }

    /// Switches to an explicit label to color table.
    #[must_use]
    pub fn with_custom_palette<D, R>(mut self, domain: D, range: R) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.palette = PaletteConfig::Custom {
            domain: domain.into_iter().map(Into::into).collect(),
            range: range.into_iter().map(Into::into).collect(),
        };
        self
    }

    #[must_use]
    pub fn with_automatic_palette(mut self) -> Self {
        self.palette = PaletteConfig::Automatic;
        self
    }

    #[must_use]
    pub fn with_label_on_bubble(mut self, show: bool) -> Self {
        self.show_label_on_bubble = show;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_collision_padding(mut self, padding: Option<f64>) -> Self {
        self.collision_padding = padding;
        self
    }

    #[must_use]
    pub fn with_transition_ms(mut self, transition_ms: u64) -> Self {
        self.transition_ms = transition_ms;
        self
    }

    #[must_use]
    pub fn with_layout_seed(mut self, seed: u64) -> Self {
        self.layout_seed = seed;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Pixel position of the simulation origin.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.width) / 2.0,
            (f64::from(self.height) + self.top_margin) / 2.0,
        )
    }

    pub fn validate(&self) -> ChartResult<()> {
        let viewport = self.viewport();
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if !self.top_margin.is_finite() || self.top_margin < 0.0 {
            return Err(ChartError::InvalidConfig(
                "top margin must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_radius.is_finite() || !self.max_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "bubble radii must be finite and > 0".to_owned(),
            ));
        }
        if self.min_radius > self.max_radius {
            return Err(ChartError::InvalidConfig(format!(
                "min radius {} exceeds max radius {}",
                self.min_radius, self.max_radius
            )));
        }
        if !self.force_strength.is_finite() {
            return Err(ChartError::InvalidConfig(
                "force strength must be finite".to_owned(),
            ));
        }
        if let Some(padding) = self.collision_padding {
            if !padding.is_finite() || padding < 0.0 {
                return Err(ChartError::InvalidConfig(
                    "collision padding must be finite and >= 0".to_owned(),
                ));
            }
        }
        for (name, field) in [
            ("color", &self.color_field),
            ("label", &self.label_field),
            ("magnitude", &self.magnitude_field),
        ] {
            if field.is_empty() {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} field name must not be empty"
                )));
            }
        }
        self.palette.colorizer().map(|_| ())
    }
}
