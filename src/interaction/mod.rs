use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::core::NodeId;
use crate::render::TooltipPrimitive;

/// Tooltip offset from the pointer, in pixels.
pub const TOOLTIP_OFFSET_X: f64 = 10.0;
pub const TOOLTIP_OFFSET_Y: f64 = -10.0;

/// Builds the three tooltip lines: label, category, then magnitude with unit.
#[must_use]
pub fn tooltip_lines(
    label: &str,
    category: &str,
    magnitude: &str,
    unit_label: &str,
) -> SmallVec<[String; 3]> {
    smallvec![
        label.to_owned(),
        category.to_owned(),
        format!("{magnitude} {unit_label}"),
    ]
}

/// Pointer hover state for one mounted chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoverState {
    hovered: Option<NodeId>,
    tooltip: Option<TooltipPrimitive>,
}

impl HoverState {
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<&TooltipPrimitive> {
        self.tooltip.as_ref()
    }

    /// Updates hover after a pointer move. `hit` is the bubble under the
    /// pointer; `lines` is only evaluated when the hovered bubble changes.
    pub fn on_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        hit: Option<NodeId>,
        lines: impl FnOnce(NodeId) -> SmallVec<[String; 3]>,
    ) {
        let Some(node) = hit else {
            self.clear();
            return;
        };

        let left = x + TOOLTIP_OFFSET_X;
        let top = y + TOOLTIP_OFFSET_Y;
        if self.hovered == Some(node) {
            if let Some(tooltip) = self.tooltip.as_mut() {
                tooltip.left = left;
                tooltip.top = top;
                return;
            }
        }
        self.hovered = Some(node);
        self.tooltip = Some(TooltipPrimitive {
            lines: lines(node),
            left,
            top,
        });
    }

    pub fn on_pointer_leave(&mut self) {
        self.clear();
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.tooltip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{HoverState, tooltip_lines};
    use crate::core::NodeId;

    #[test]
    fn tooltip_follows_pointer_without_rebuilding_text() {
        let mut hover = HoverState::default();
        hover.on_pointer_move(100.0, 50.0, Some(NodeId(2)), |_| {
            tooltip_lines("Emma", "F", "20355", "babies")
        });
        hover.on_pointer_move(104.0, 52.0, Some(NodeId(2)), |_| {
            panic!("text must not be rebuilt for the same bubble")
        });

        let tooltip = hover.tooltip().expect("visible tooltip");
        assert_eq!(tooltip.text(), "Emma\nF\n20355 babies");
        assert_eq!((tooltip.left, tooltip.top), (114.0, 42.0));
    }

    #[test]
    fn moving_off_every_bubble_hides_tooltip() {
        let mut hover = HoverState::default();
        hover.on_pointer_move(1.0, 1.0, Some(NodeId(0)), |_| tooltip_lines("a", "b", "1", "u"));
        hover.on_pointer_move(500.0, 500.0, None, |_| tooltip_lines("a", "b", "1", "u"));
        assert!(hover.tooltip().is_none());
        assert_eq!(hover.hovered(), None);
    }
}
