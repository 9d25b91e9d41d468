use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use std::f64::consts::TAU;

use crate::core::{Color, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer, TextHAlign, TextPrimitive};

const TOOLTIP_BACKGROUND: Color = Color::from_rgb8(0x62, 0x6d, 0x71);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub circles_drawn: usize,
    pub texts_drawn: usize,
    pub tooltips_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango renderer painting frames to an offscreen image surface.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        Ok(Self {
            surface: create_surface(width, height)?,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Writes the current surface as PNG.
    pub fn write_png(&self, writer: &mut impl std::io::Write) -> ChartResult<()> {
        self.surface
            .write_to_png(writer)
            .map_err(|err| ChartError::InvalidData(format!("failed to encode png: {err}")))
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color, 1.0);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();

        for bubble in &frame.bubbles {
            let circle = bubble.circle;
            context.new_path();
            context.arc(circle.cx, circle.cy, circle.radius, 0.0, TAU);
            apply_color(context, circle.fill, bubble.opacity);
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill bubble", err))?;
            stats.circles_drawn += 1;

            if let Some(label) = &bubble.label {
                draw_text(context, label, bubble.opacity)?;
                stats.texts_drawn += 1;
            }
        }

        if let Some(title) = &frame.title {
            draw_text(context, title, 1.0)?;
            stats.texts_drawn += 1;
        }

        if let Some(tooltip) = &frame.tooltip {
            let layout = pangocairo::functions::create_layout(context);
            layout.set_font_description(Some(&FontDescription::from_string("Monospace 10")));
            layout.set_text(&tooltip.text());
            let (width, height) = layout.pixel_size();
            context.rectangle(
                tooltip.left,
                tooltip.top,
                f64::from(width) + 16.0,
                f64::from(height) + 16.0,
            );
            apply_color(context, TOOLTIP_BACKGROUND, 1.0);
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill tooltip", err))?;
            apply_color(context, Color::rgb(1.0, 1.0, 1.0), 1.0);
            context.move_to(tooltip.left + 8.0, tooltip.top + 8.0);
            pangocairo::functions::show_layout(context, &layout);
            stats.tooltips_drawn += 1;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let width = i32::try_from(viewport.width).unwrap_or(i32::MAX);
        let height = i32::try_from(viewport.height).unwrap_or(i32::MAX);
        if self.surface.width() != width || self.surface.height() != height {
            self.surface = create_surface(width, height)?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn create_surface(width: i32, height: i32) -> ChartResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(ChartError::InvalidData(
            "cairo surface size must be > 0".to_owned(),
        ));
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn draw_text(context: &Context, text: &TextPrimitive, group_opacity: f64) -> ChartResult<()> {
    context
        .save()
        .map_err(|err| map_backend_error("failed to save context", err))?;
    if let Some(clip) = text.clip {
        context.new_path();
        context.arc(clip.cx, clip.cy, clip.radius, 0.0, TAU);
        context.clip();
    }

    let layout = pangocairo::functions::create_layout(context);
    let font_description = FontDescription::from_string(&format!("Sans {}", text.font_size_px));
    layout.set_font_description(Some(&font_description));
    layout.set_text(&text.text);

    let (text_width, text_height) = layout.pixel_size();
    let x = match text.h_align {
        TextHAlign::Left => text.x,
        TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
        TextHAlign::Right => text.x - f64::from(text_width),
    };

    apply_color(context, text.color, text.opacity * group_opacity);
    context.move_to(x, text.y - f64::from(text_height) / 2.0);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

fn apply_color(context: &Context, color: Color, opacity: f64) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha * opacity);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
