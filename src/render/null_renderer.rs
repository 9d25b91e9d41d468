use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer};

/// No-op surface used by tests and headless usage.
///
/// Frames are still validated, and the last one is kept so tests can inspect
/// exactly what is attached to the surface.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub viewport: Option<Viewport>,
    pub frames_rendered: usize,
    pub last_bubble_count: usize,
    pub last_text_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl NullRenderer {
    /// Labels of the bubbles currently drawn on the surface.
    #[must_use]
    pub fn attached_labels(&self) -> Vec<String> {
        self.last_frame
            .iter()
            .flat_map(|frame| &frame.bubbles)
            .filter_map(|bubble| bubble.label.as_ref().map(|label| label.text.clone()))
            .collect()
    }
}

impl Renderer for NullRenderer {
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = Some(viewport);
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_bubble_count = frame.bubbles.len();
        self.last_text_count = frame.text_count();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
