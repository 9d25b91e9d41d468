use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{BubblePrimitive, TextPrimitive, TooltipPrimitive};

/// Backend-agnostic scene for one chart draw pass.
///
/// An empty frame (no title, no bubbles) is what a detached chart leaves on
/// its surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub title: Option<TextPrimitive>,
    pub bubbles: Vec<BubblePrimitive>,
    pub tooltip: Option<TooltipPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            title: None,
            bubbles: Vec::new(),
            tooltip: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: TextPrimitive) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn with_bubble(mut self, bubble: BubblePrimitive) -> Self {
        self.bubbles.push(bubble);
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipPrimitive) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if let Some(title) = &self.title {
            title.validate()?;
        }
        for bubble in &self.bubbles {
            bubble.validate()?;
        }
        if let Some(tooltip) = &self.tooltip {
            tooltip.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.bubbles.is_empty() && self.tooltip.is_none()
    }

    /// Number of text draw commands (title plus bubble labels).
    #[must_use]
    pub fn text_count(&self) -> usize {
        usize::from(self.title.is_some())
            + self
                .bubbles
                .iter()
                .filter(|bubble| bubble.label.is_some())
                .count()
    }
}
