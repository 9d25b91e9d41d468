mod frame;
mod null_renderer;
mod primitives;
mod svg;

pub use crate::core::Color;
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    BubblePrimitive, CirclePrimitive, ClipCircle, TextHAlign, TextPrimitive, TooltipPrimitive,
};
pub use svg::SvgRenderer;

use crate::core::Viewport;
use crate::error::ChartResult;

/// Contract implemented by any chart surface.
///
/// Backends receive a fully materialized `RenderFrame` so drawing code stays
/// isolated from layout, lifecycle and interaction logic. Each frame replaces
/// whatever the previous one attached.
pub trait Renderer {
    /// Called once when a chart mounts, before its first frame.
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let _ = viewport;
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
