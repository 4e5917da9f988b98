//! scatter-pack: headless animated scatter / circle-packing chart.
//!
//! Charts are configured once and re-rendered whenever their data changes.
//! Every render reconciles keyed elements (enter/update/exit) and schedules
//! transitions; hosts sample frames at their own clock and hand them to a
//! [`render::Renderer`] backend.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{Chart, ChartConfig, Container, RenderPass};
pub use error::{ChartError, ChartResult};
