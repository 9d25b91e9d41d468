//! bubble-chart-rs: force-directed bubble chart engine.
//!
//! Records are sized by a magnitude field and colored by a category field,
//! clustered by a many-body force simulation, and drawn through a pluggable
//! [`render::Renderer`]. Mounted charts expose an animated removal with an
//! explicit completion token so year-by-year refreshes never overlap.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod names;
pub mod render;
pub mod telemetry;

pub use api::{BubbleChart, BubbleChartConfig, ChartHandle, RefreshCoordinator};
pub use error::{ChartError, ChartResult};
