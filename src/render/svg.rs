use std::fmt::Write as _;

use crate::core::{Color, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{BubblePrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive, TooltipPrimitive};

const TOOLTIP_BACKGROUND: Color = Color::from_rgb8(0x62, 0x6d, 0x71);
const TOOLTIP_WIDTH_PX: f64 = 400.0;
const TOOLTIP_LINE_HEIGHT_PX: f64 = 16.0;
const TOOLTIP_PADDING_PX: f64 = 8.0;

/// Renders frames into a standalone SVG document.
///
/// Element ids are prefixed with the mount id so several charts can share one
/// host page. The mount id is reduced to `[A-Za-z0-9_-]` so it is safe inside
/// `id`, `href` and `url(#...)` references.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    mount_id: String,
    viewport: Viewport,
    document: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new(mount_id: impl Into<String>) -> Self {
        let viewport = Viewport::new(300, 150);
        let mount_id = sanitize_id(&mount_id.into());
        let document = empty_document(&mount_id, viewport);
        Self {
            mount_id,
            viewport,
            document,
        }
    }

    #[must_use]
    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current SVG markup on the surface.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    fn write_bubble(&self, out: &mut String, bubble: &BubblePrimitive) -> std::fmt::Result {
        let id = format!("{}-bubble-{}", self.mount_id, bubble.node.index());
        write!(
            out,
            r#"<g transform="translate({:.2},{:.2})" opacity="{:.3}">"#,
            bubble.circle.cx, bubble.circle.cy, bubble.opacity
        )?;
        write!(
            out,
            r#"<circle id="{id}" r="{:.2}" fill="{}"/>"#,
            bubble.circle.radius,
            bubble.circle.fill.to_hex()
        )?;
        if let Some(label) = &bubble.label {
            write!(
                out,
                r##"<clipPath id="clip-{id}"><use href="#{id}"/></clipPath><text clip-path="url(#clip-{id})" text-anchor="middle" font-size="{:.1}"><tspan x="0" y=".3em">{}</tspan></text>"##,
                label.font_size_px,
                escape_xml(&label.text)
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.document = empty_document(&self.mount_id, viewport);
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        let mut out = String::new();
        write_document(self, &mut out, frame)
            .map_err(|err| ChartError::InvalidData(format!("failed to write svg: {err}")))?;
        self.viewport = frame.viewport;
        self.document = out;
        Ok(())
    }
}

fn write_document(renderer: &SvgRenderer, out: &mut String, frame: &RenderFrame) -> std::fmt::Result {
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{}" height="{}">"#,
        escape_xml(&renderer.mount_id),
        frame.viewport.width,
        frame.viewport.height
    )?;
    for bubble in &frame.bubbles {
        renderer.write_bubble(out, bubble)?;
    }
    if let Some(title) = &frame.title {
        write_text(out, title, r#" font-size="1.8em""#)?;
    }
    if let Some(tooltip) = &frame.tooltip {
        write_tooltip(out, tooltip)?;
    }
    out.push_str("</svg>");
    Ok(())
}

fn write_text(out: &mut String, text: &TextPrimitive, extra_attrs: &str) -> std::fmt::Result {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    write!(
        out,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="{anchor}" fill="{}" opacity="{:.3}"{extra_attrs}>{}</text>"#,
        text.x,
        text.y,
        text.color.to_hex(),
        text.opacity,
        escape_xml(&text.text)
    )
}

fn write_tooltip(out: &mut String, tooltip: &TooltipPrimitive) -> std::fmt::Result {
    let height = tooltip.lines.len() as f64 * TOOLTIP_LINE_HEIGHT_PX + 2.0 * TOOLTIP_PADDING_PX;
    write!(
        out,
        r#"<g class="tooltip" transform="translate({:.2},{:.2})"><rect width="{TOOLTIP_WIDTH_PX}" height="{height:.1}" rx="6" fill="{}"/>"#,
        tooltip.left,
        tooltip.top,
        TOOLTIP_BACKGROUND.to_hex()
    )?;
    for (index, line) in tooltip.lines.iter().enumerate() {
        write!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="white" font-family="monospace">{}</text>"#,
            TOOLTIP_WIDTH_PX / 2.0,
            TOOLTIP_PADDING_PX + (index as f64 + 0.8) * TOOLTIP_LINE_HEIGHT_PX,
            escape_xml(line)
        )?;
    }
    out.push_str("</g>");
    Ok(())
}

fn empty_document(mount_id: &str, viewport: Viewport) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{}" height="{}"></svg>"#,
        escape_xml(mount_id),
        viewport.width,
        viewport.height
    )
}

fn sanitize_id(raw: &str) -> String {
    let id: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    match id.chars().next() {
        None => "chart".to_owned(),
        Some(first) if first.is_ascii_alphabetic() => id,
        Some(_) => format!("chart-{id}"),
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
