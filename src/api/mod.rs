mod chart;
mod config;
mod handle;
mod lifecycle;
mod refresh;

pub use chart::{BubbleChart, BubbleNode, PreparedChart};
pub use config::{BubbleChartConfig, DEFAULT_COLLISION_PADDING, PaletteConfig};
pub use handle::{ChartHandle, ChartSnapshot, NodeSnapshot};
pub use lifecycle::{ChartPhase, NodeRemovedCallback, RemovalToken};
pub use refresh::{
    DataSource, FetchRequest, RefreshCoordinator, RefreshOutcome, RefreshProfile, RequestId,
};
