use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Color, LayoutEngine, NodeId, RadiusScale, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{HoverState, tooltip_lines};
use crate::render::{
    BubblePrimitive, CirclePrimitive, ClipCircle, RenderFrame, Renderer, TextHAlign, TextPrimitive,
    TooltipPrimitive,
};

use super::lifecycle::{NodeRemovedCallback, Removal};
use super::{BubbleChartConfig, BubbleNode, ChartPhase, PreparedChart, RemovalToken};

const TITLE_FONT_PX: f64 = 28.8;
const LABEL_FONT_PX: f64 = 12.0;
const TEXT_COLOR: Color = Color::rgb(0.0, 0.0, 0.0);

#[derive(Debug)]
enum Phase {
    Live,
    Removing(Removal),
    Detached(RemovalToken),
}

/// Per-node entry of a [`ChartSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub label: String,
    pub category: String,
    pub magnitude: f64,
    pub radius: f64,
    pub color: String,
    pub x: f64,
    pub y: f64,
}

/// Serializable view of a mounted chart for regression fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub viewport: Viewport,
    pub phase: ChartPhase,
    pub title: String,
    pub radius_domain: (f64, f64),
    pub legend: IndexMap<String, String>,
    pub layout_alpha: f64,
    pub layout_ticks: u64,
    pub nodes: Vec<NodeSnapshot>,
}

/// A chart mounted on a surface.
///
/// The handle owns the surface, the bubbles and their layout state. It is
/// driven by the host frame loop through [`advance`](Self::advance) and ends
/// its life through [`remove`](Self::remove), after which the surface can be
/// reclaimed with [`into_surface`](Self::into_surface).
#[derive(Debug)]
pub struct ChartHandle<R: Renderer> {
    surface: R,
    config: BubbleChartConfig,
    nodes: Vec<BubbleNode>,
    layout: LayoutEngine,
    radius_scale: RadiusScale,
    legend: IndexMap<String, Color>,
    hover: HoverState,
    phase: Phase,
}

impl<R: Renderer> ChartHandle<R> {
    pub(crate) fn new(prepared: PreparedChart, surface: R) -> Self {
        Self {
            surface,
            config: prepared.config,
            nodes: prepared.nodes,
            layout: prepared.layout,
            radius_scale: prepared.radius_scale,
            legend: prepared.legend,
            hover: HoverState::default(),
            phase: Phase::Live,
        }
    }

    /// Sizes the surface to the configured viewport and draws the first frame.
    pub fn attach(&mut self) -> ChartResult<()> {
        self.surface.resize(self.config.viewport())?;
        debug!(
            nodes = self.nodes.len(),
            width = self.config.width,
            height = self.config.height,
            "mounted bubble chart"
        );
        self.paint()
    }

    #[must_use]
    pub fn phase(&self) -> ChartPhase {
        match self.phase {
            Phase::Live => ChartPhase::Live,
            Phase::Removing(_) => ChartPhase::Removing,
            Phase::Detached(_) => ChartPhase::Detached,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self.phase, Phase::Live)
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        matches!(self.phase, Phase::Detached(_))
    }

    #[must_use]
    pub fn config(&self) -> &BubbleChartConfig {
        &self.config
    }

    #[must_use]
    pub fn nodes(&self) -> &[BubbleNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    #[must_use]
    pub fn radius_scale(&self) -> RadiusScale {
        self.radius_scale
    }

    /// Category colors in first-seen order.
    #[must_use]
    pub fn legend(&self) -> &IndexMap<String, Color> {
        &self.legend
    }

    #[must_use]
    pub fn surface(&self) -> &R {
        &self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> R {
        self.surface
    }

    /// Pixel center of a bubble.
    #[must_use]
    pub fn node_position(&self, id: NodeId) -> Option<(f64, f64)> {
        let (cx, cy) = self.config.center();
        self.layout
            .position(id.index())
            .map(|(x, y)| (x + cx, y + cy))
    }

    /// Runs one layout step without drawing. Returns whether the layout is
    /// still moving; always `false` once removal has started.
    pub fn tick(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.layout.tick()
    }

    /// Host frame callback: applies one layout tick while live, progresses the
    /// fade while removing, then repaints.
    pub fn advance(&mut self, dt: Duration) -> ChartResult<()> {
        match &mut self.phase {
            Phase::Live => {
                self.layout.tick();
                self.paint()
            }
            Phase::Removing(removal) => {
                if removal.advance(dt) {
                    self.detach()
                } else {
                    self.paint()
                }
            }
            Phase::Detached(_) => Ok(()),
        }
    }

    /// Drives the layout to rest (bounded by `max_ticks`) and paints once.
    pub fn settle(&mut self, max_ticks: usize) -> ChartResult<usize> {
        if !self.is_live() {
            return Err(ChartError::ChartDetached);
        }
        let ticks = self.layout.run_until_settled(max_ticks);
        self.paint()?;
        Ok(ticks)
    }

    /// Hit-tests the pointer against the bubbles and updates the tooltip.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<&TooltipPrimitive> {
        if !self.is_live() {
            return None;
        }
        let (cx, cy) = self.config.center();
        // last drawn bubble is on top
        let hit = self
            .nodes
            .iter()
            .zip(self.layout.nodes())
            .rev()
            .find(|(node, layout)| (x - (layout.x + cx)).hypot(y - (layout.y + cy)) <= node.radius)
            .map(|(node, _)| node.id);

        let nodes = &self.nodes;
        let unit_label = &self.config.unit_label;
        self.hover.on_pointer_move(x, y, hit, |id| {
            let node = &nodes[id.index()];
            tooltip_lines(&node.label, &node.category, &node.magnitude_text, unit_label)
        });
        trace!(x, y, hovered = ?self.hover.hovered(), "pointer move");
        self.hover.tooltip()
    }

    pub fn pointer_leave(&mut self) {
        self.hover.on_pointer_leave();
    }

    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.hovered()
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<&TooltipPrimitive> {
        self.hover.tooltip()
    }

    /// Starts fading out the title and every bubble. The returned token
    /// completes once everything is detached.
    pub fn remove(&mut self) -> RemovalToken {
        self.begin_removal(None)
    }

    /// Like [`remove`](Self::remove), and calls `on_node_removed` once per
    /// bubble as it is detached.
    pub fn remove_with(&mut self, on_node_removed: impl FnMut(NodeId) + 'static) -> RemovalToken {
        self.begin_removal(Some(Box::new(on_node_removed)))
    }

    fn begin_removal(&mut self, callback: Option<NodeRemovedCallback>) -> RemovalToken {
        match &mut self.phase {
            Phase::Live => {
                let mut removal = Removal::new(Duration::from_millis(self.config.transition_ms));
                removal.add_callback(callback);
                let token = removal.token();
                self.hover.clear();
                self.layout_frozen_log();
                self.phase = Phase::Removing(removal);
                token
            }
            Phase::Removing(removal) => {
                removal.add_callback(callback);
                removal.token()
            }
            Phase::Detached(token) => {
                debug!("remove requested on detached chart");
                token.clone()
            }
        }
    }

    fn layout_frozen_log(&self) {
        debug!(
            nodes = self.nodes.len(),
            layout_ticks = self.layout.ticks(),
            transition_ms = self.config.transition_ms,
            "removing bubble chart"
        );
    }

    fn detach(&mut self) -> ChartResult<()> {
        let cleared = self.surface.render(&RenderFrame::new(self.config.viewport()));
        let phase = std::mem::replace(&mut self.phase, Phase::Detached(RemovalToken::default()));
        if let Phase::Removing(removal) = phase {
            let token = removal.finish(self.nodes.iter().map(|node| node.id));
            self.phase = Phase::Detached(token);
        }
        debug!(nodes = self.nodes.len(), "bubble chart detached");
        cleared
    }

    /// Builds the frame for the current phase; detached charts produce an
    /// empty frame.
    #[must_use]
    pub fn build_frame(&self) -> RenderFrame {
        let viewport = self.config.viewport();
        let opacity = match &self.phase {
            Phase::Live => 1.0,
            Phase::Removing(removal) => removal.opacity(),
            Phase::Detached(_) => return RenderFrame::new(viewport),
        };

        let mut frame = RenderFrame::new(viewport);
        if !self.config.title.is_empty() {
            let mut title = TextPrimitive::new(
                self.config.title.clone(),
                f64::from(self.config.width) / 2.0,
                self.config.top_margin,
                TITLE_FONT_PX,
                TEXT_COLOR,
                TextHAlign::Center,
            );
            title.opacity = opacity;
            frame = frame.with_title(title);
        }

        let (cx, cy) = self.config.center();
        for (node, layout) in self.nodes.iter().zip(self.layout.nodes()) {
            let x = layout.x + cx;
            let y = layout.y + cy;
            let label = (self.config.show_label_on_bubble && !node.label.is_empty()).then(|| {
                TextPrimitive::new(node.label.clone(), x, y, LABEL_FONT_PX, TEXT_COLOR, TextHAlign::Center)
                    .clipped_to(ClipCircle {
                        cx: x,
                        cy: y,
                        radius: node.radius,
                    })
            });
            frame = frame.with_bubble(BubblePrimitive {
                node: node.id,
                circle: CirclePrimitive::new(x, y, node.radius, node.color),
                label,
                opacity,
            });
        }

        if let Some(tooltip) = self.hover.tooltip() {
            frame = frame.with_tooltip(tooltip.clone());
        }
        frame
    }

    /// Draws the current frame onto the surface.
    pub fn paint(&mut self) -> ChartResult<()> {
        let frame = self.build_frame();
        self.surface.render(&frame)
    }

    #[must_use]
    pub fn snapshot(&self) -> ChartSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let (x, y) = self.node_position(node.id).unwrap_or_default();
                NodeSnapshot {
                    id: node.id,
                    label: node.label.clone(),
                    category: node.category.clone(),
                    magnitude: node.magnitude,
                    radius: node.radius,
                    color: node.color.to_hex(),
                    x,
                    y,
                }
            })
            .collect();

        ChartSnapshot {
            viewport: self.config.viewport(),
            phase: self.phase(),
            title: self.config.title.clone(),
            radius_domain: self.radius_scale.domain(),
            legend: self
                .legend
                .iter()
                .map(|(category, color)| (category.clone(), color.to_hex()))
                .collect(),
            layout_alpha: self.layout.alpha(),
            layout_ticks: self.layout.ticks(),
            nodes,
        }
    }

    /// Serializes [`snapshot`](Self::snapshot) as pretty JSON.
    pub fn snapshot_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
