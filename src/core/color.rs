use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
        )
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> ChartResult<Self> {
        let invalid = || ChartError::InvalidData(format!("invalid hex color `{hex}`"));
        let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            _ => return Err(invalid()),
        };
        let channel = |offset: usize| {
            expanded
                .get(offset..offset + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        };
        Ok(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`; alpha is ignored.
    #[must_use]
    pub fn to_hex(self) -> String {
        let to_u8 = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_u8(self.red),
            to_u8(self.green),
            to_u8(self.blue)
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Ten-color categorical palette used when no custom palette is configured.
pub const CATEGORY10: [Color; 10] = [
    Color::from_rgb8(0x1f, 0x77, 0xb4),
    Color::from_rgb8(0xff, 0x7f, 0x0e),
    Color::from_rgb8(0x2c, 0xa0, 0x2c),
    Color::from_rgb8(0xd6, 0x27, 0x28),
    Color::from_rgb8(0x94, 0x67, 0xbd),
    Color::from_rgb8(0x8c, 0x56, 0x4b),
    Color::from_rgb8(0xe3, 0x77, 0xc2),
    Color::from_rgb8(0x7f, 0x7f, 0x7f),
    Color::from_rgb8(0xbc, 0xbd, 0x22),
    Color::from_rgb8(0x17, 0xbe, 0xcf),
];

/// Color for categories missing from a custom palette domain.
pub const FALLBACK_COLOR: Color = Color::from_rgb8(0xbd, 0xbd, 0xbd);

#[derive(Debug, Clone, PartialEq)]
enum ColorMode {
    Automatic { palette: Vec<Color> },
    Custom { table: IndexMap<String, Color> },
}

/// Maps category labels to fill colors.
///
/// Automatic mode hands out palette entries in first-seen order and cycles
/// once the palette is exhausted. Custom mode is an exact table lookup with
/// [`FALLBACK_COLOR`] for unknown labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColorizer {
    mode: ColorMode,
    assigned: IndexMap<String, Color>,
}

impl CategoryColorizer {
    #[must_use]
    pub fn automatic() -> Self {
        Self {
            mode: ColorMode::Automatic {
                palette: CATEGORY10.to_vec(),
            },
            assigned: IndexMap::new(),
        }
    }

    pub fn with_palette(palette: Vec<Color>) -> ChartResult<Self> {
        if palette.is_empty() {
            return Err(ChartError::InvalidConfig(
                "automatic palette must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            mode: ColorMode::Automatic { palette },
            assigned: IndexMap::new(),
        })
    }

    /// Builds an explicit lookup; duplicate domain labels keep their first color.
    pub fn custom<S: AsRef<str>>(domain: &[S], range: &[Color]) -> ChartResult<Self> {
        if domain.is_empty() || domain.len() != range.len() {
            return Err(ChartError::InvalidConfig(format!(
                "custom palette needs equal, non-zero domain and range lengths (domain={}, range={})",
                domain.len(),
                range.len()
            )));
        }
        let mut table = IndexMap::with_capacity(domain.len());
        for (label, color) in domain.iter().zip(range) {
            table.entry(label.as_ref().to_owned()).or_insert(*color);
        }
        Ok(Self {
            mode: ColorMode::Custom { table },
            assigned: IndexMap::new(),
        })
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self.mode, ColorMode::Custom { .. })
    }

    pub fn color_for(&mut self, category: &str) -> Color {
        if let Some(color) = self.assigned.get(category) {
            return *color;
        }
        let color = match &self.mode {
            ColorMode::Automatic { palette } => palette[self.assigned.len() % palette.len()],
            ColorMode::Custom { table } => table.get(category).copied().unwrap_or(FALLBACK_COLOR),
        };
        self.assigned.insert(category.to_owned(), color);
        color
    }

    /// Categories seen so far with their colors, in first-seen order.
    #[must_use]
    pub fn assigned(&self) -> &IndexMap<String, Color> {
        &self.assigned
    }
}
