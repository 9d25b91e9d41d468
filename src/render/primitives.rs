use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Color, NodeId};
use crate::error::{ChartError, ChartResult};

fn validate_opacity(opacity: f64) -> ChartResult<()> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(ChartError::InvalidData(
            "opacity must be finite and in [0, 1]".to_owned(),
        ));
    }
    Ok(())
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Circular clip region in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipCircle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
    pub opacity: f64,
    pub clip: Option<ClipCircle>,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
            opacity: 1.0,
            clip: None,
        }
    }

    #[must_use]
    pub fn clipped_to(mut self, clip: ClipCircle) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        validate_opacity(self.opacity)?;
        self.color.validate()
    }
}

/// Filled circle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn new(cx: f64, cy: f64, radius: f64, fill: Color) -> Self {
        Self {
            cx,
            cy,
            radius,
            fill,
        }
    }

    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        (x - self.cx).hypot(y - self.cy) <= self.radius
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.cx.is_finite() || !self.cy.is_finite() {
            return Err(ChartError::InvalidData(
                "circle center must be finite".to_owned(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ChartError::InvalidData(
                "circle radius must be finite and > 0".to_owned(),
            ));
        }
        self.fill.validate()
    }
}

/// One bubble group: the circle and its optional label move and fade together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubblePrimitive {
    pub node: NodeId,
    pub circle: CirclePrimitive,
    pub label: Option<TextPrimitive>,
    pub opacity: f64,
}

impl BubblePrimitive {
    pub fn validate(&self) -> ChartResult<()> {
        self.circle.validate()?;
        validate_opacity(self.opacity)?;
        if let Some(label) = &self.label {
            label.validate()?;
        }
        Ok(())
    }
}

/// Hover tooltip anchored near the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipPrimitive {
    pub lines: SmallVec<[String; 3]>,
    pub left: f64,
    pub top: f64,
}

impl TooltipPrimitive {
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.lines.is_empty() {
            return Err(ChartError::InvalidData(
                "tooltip must carry at least one line".to_owned(),
            ));
        }
        if !self.left.is_finite() || !self.top.is_finite() {
            return Err(ChartError::InvalidData(
                "tooltip anchor must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}
