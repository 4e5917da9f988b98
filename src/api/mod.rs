mod axis;
mod axis_label_format;
mod chart;
mod chart_config;
mod container;
mod curve_layer;
mod json_contract;
mod marker_layer;

pub use axis::{AxisKind, AxisState, TickAttrs};
pub use axis_label_format::{
    fixed_precision, format_currency_si, format_grouped_fixed, format_si,
};
pub use chart::{Chart, RenderPass};
pub use chart_config::{
    AxisPadding, ChartConfig, ColorFn, DelayFn, DelayInput, RadiusFn, TickFormatFn,
};
pub use container::{Container, Scaffold, ScaffoldLayout, TitleState};
pub use curve_layer::CurveAttrs;
pub use json_contract::{RENDER_FRAME_JSON_SCHEMA_V1, RenderFrameJsonContractV1};
pub use marker_layer::MarkerAttrs;
