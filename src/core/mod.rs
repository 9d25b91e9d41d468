pub mod color;
pub mod layout;
pub mod record;
pub mod scale;
pub mod types;

pub use color::{CATEGORY10, CategoryColorizer, Color, FALLBACK_COLOR};
pub use layout::{LayoutBounds, LayoutEngine, LayoutNode, LayoutTuning};
pub use record::{Dataset, FieldValue, Record};
pub use scale::{RadiusScale, map_range};
pub use types::{NodeId, Viewport};
