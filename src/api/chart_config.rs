use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::scale::validate_padding;
use crate::core::{DataPoint, DuplicateKeyPolicy, Easing, ElementKey, Margin, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

use super::axis_label_format::format_currency_si;

const MAX_AXIS_TICK_COUNT: usize = 1_000;

/// Maps an optional color tag (item color, or curve key) to a color.
#[derive(Clone)]
pub struct ColorFn(Arc<dyn Fn(Option<&str>) -> Color + Send + Sync>);

impl ColorFn {
    pub fn new(f: impl Fn(Option<&str>) -> Color + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, tag: Option<&str>) -> Color {
        (self.0)(tag)
    }
}

impl Default for ColorFn {
    fn default() -> Self {
        Self::new(|tag| tag.and_then(Color::from_tag).unwrap_or(Color::GREEN))
    }
}

/// Scatter marker radius in pixels.
#[derive(Clone)]
pub struct RadiusFn(Arc<dyn Fn(&DataPoint) -> f64 + Send + Sync>);

impl RadiusFn {
    pub fn new(f: impl Fn(&DataPoint) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, point: &DataPoint) -> f64 {
        (self.0)(point)
    }
}

impl Default for RadiusFn {
    fn default() -> Self {
        Self::new(|_| 6.0)
    }
}

/// What a delay function sees about one marker: its key and target center
/// in plot pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayInput<'a> {
    pub key: &'a ElementKey,
    pub index: usize,
    pub cx: f64,
    pub cy: f64,
}

/// Per-marker entrance stagger in milliseconds.
#[derive(Clone)]
pub struct DelayFn(Arc<dyn Fn(DelayInput<'_>) -> f64 + Send + Sync>);

impl DelayFn {
    pub fn new(f: impl Fn(DelayInput<'_>) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, input: DelayInput<'_>) -> f64 {
        (self.0)(input)
    }
}

impl Default for DelayFn {
    fn default() -> Self {
        Self::new(|input| input.cx * 5.0)
    }
}

/// Axis tick label formatter.
#[derive(Clone)]
pub struct TickFormatFn(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl TickFormatFn {
    pub fn new(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl Default for TickFormatFn {
    fn default() -> Self {
        Self::new(format_currency_si)
    }
}

macro_rules! opaque_debug {
    ($($name:ident),+) => {
        $(impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        })+
    };
}

opaque_debug!(ColorFn, RadiusFn, DelayFn, TickFormatFn);

/// Multiplicative padding applied to one axis' data extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPadding {
    pub low: f64,
    pub high: f64,
}

impl AxisPadding {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Every render tunable of one chart instance.
///
/// Plain tunables (de)serialize; function hooks are skipped and fall back to
/// their defaults when loading from JSON. Mutate only between render calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    width: u32,
    height: u32,
    margin: Margin,
    x_title: String,
    y_title: String,
    duration_ms: f64,
    easing: Easing,
    pack: bool,
    pack_group_field: String,
    pack_value_field: String,
    x_padding: AxisPadding,
    y_padding: AxisPadding,
    axis_tick_count: usize,
    enter_opacity: f64,
    marker_opacity: f64,
    curve_stroke_width: f64,
    curve_reveal: bool,
    curve_reveal_ms: f64,
    duplicate_keys: DuplicateKeyPolicy,
    #[serde(skip)]
    color_fn: ColorFn,
    #[serde(skip)]
    radius_fn: RadiusFn,
    #[serde(skip)]
    delay_fn: DelayFn,
    #[serde(skip)]
    y_axis_formatter: TickFormatFn,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            margin: Margin::default(),
            x_title: "X Axis Title".to_owned(),
            y_title: "Y Axis Title".to_owned(),
            duration_ms: 1_000.0,
            easing: Easing::default(),
            pack: false,
            pack_group_field: "group".to_owned(),
            pack_value_field: "y".to_owned(),
            x_padding: AxisPadding::new(0.6, 1.05),
            y_padding: AxisPadding::new(0.95, 1.05),
            axis_tick_count: 10,
            enter_opacity: 0.3,
            marker_opacity: 1.0,
            curve_stroke_width: 1.5,
            curve_reveal: false,
            curve_reveal_ms: 2_000.0,
            duplicate_keys: DuplicateKeyPolicy::default(),
            color_fn: ColorFn::default(),
            radius_fn: RadiusFn::default(),
            delay_fn: DelayFn::default(),
            y_axis_formatter: TickFormatFn::default(),
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse chart config json: {e}")))
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize chart config json: {e}"))
        })
    }

    /// Sets the outer size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_titles(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = x_title.into();
        self.y_title = y_title.into();
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Enables pack mode, grouping by `group_field` and weighting by
    /// `value_field`.
    #[must_use]
    pub fn with_pack(
        mut self,
        pack: bool,
        group_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        self.pack = pack;
        self.pack_group_field = group_field.into();
        self.pack_value_field = value_field.into();
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    #[must_use]
    pub fn plot_width(&self) -> f64 {
        f64::from(self.width) - self.margin.left - self.margin.right
    }

    #[must_use]
    pub fn plot_height(&self) -> f64 {
        f64::from(self.height) - self.margin.top - self.margin.bottom
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport().is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        for (value, name) in [
            (self.margin.left, "left"),
            (self.margin.bottom, "bottom"),
            (self.margin.top, "top"),
            (self.margin.right, "right"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "margin `{name}` must be finite and >= 0"
                )));
            }
        }
        if self.plot_width() <= 0.0 || self.plot_height() <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "margins leave no plot area ({}x{})",
                self.plot_width(),
                self.plot_height()
            )));
        }
        for (value, name) in [
            (self.duration_ms, "duration_ms"),
            (self.curve_reveal_ms, "curve_reveal_ms"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }
        validate_padding(self.x_padding.low, self.x_padding.high)?;
        validate_padding(self.y_padding.low, self.y_padding.high)?;
        for (value, name) in [
            (self.enter_opacity, "enter_opacity"),
            (self.marker_opacity, "marker_opacity"),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and in [0, 1]"
                )));
            }
        }
        if !self.curve_stroke_width.is_finite() || self.curve_stroke_width <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "`curve_stroke_width` must be finite and > 0".to_owned(),
            ));
        }
        if !(1..=MAX_AXIS_TICK_COUNT).contains(&self.axis_tick_count) {
            return Err(ChartError::InvalidConfig(format!(
                "`axis_tick_count` must be in [1, {MAX_AXIS_TICK_COUNT}], got {}",
                self.axis_tick_count
            )));
        }
        if self.pack_group_field.is_empty() || self.pack_value_field.is_empty() {
            return Err(ChartError::InvalidConfig(
                "pack group/value field names must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) -> &mut Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) -> &mut Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn set_margin(&mut self, margin: Margin) -> &mut Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn x_title(&self) -> &str {
        &self.x_title
    }

    pub fn set_x_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.x_title = title.into();
        self
    }

    #[must_use]
    pub fn y_title(&self) -> &str {
        &self.y_title
    }

    pub fn set_y_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.y_title = title.into();
        self
    }

    /// Duration of marker, curve, title and axis transitions.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn set_duration_ms(&mut self, duration_ms: f64) -> &mut Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn set_easing(&mut self, easing: Easing) -> &mut Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn pack(&self) -> bool {
        self.pack
    }

    pub fn set_pack(&mut self, pack: bool) -> &mut Self {
        self.pack = pack;
        self
    }

    #[must_use]
    pub fn pack_group_field(&self) -> &str {
        &self.pack_group_field
    }

    pub fn set_pack_group_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.pack_group_field = field.into();
        self
    }

    #[must_use]
    pub fn pack_value_field(&self) -> &str {
        &self.pack_value_field
    }

    pub fn set_pack_value_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.pack_value_field = field.into();
        self
    }

    #[must_use]
    pub fn x_padding(&self) -> AxisPadding {
        self.x_padding
    }

    pub fn set_x_padding(&mut self, padding: AxisPadding) -> &mut Self {
        self.x_padding = padding;
        self
    }

    #[must_use]
    pub fn y_padding(&self) -> AxisPadding {
        self.y_padding
    }

    pub fn set_y_padding(&mut self, padding: AxisPadding) -> &mut Self {
        self.y_padding = padding;
        self
    }

    #[must_use]
    pub fn axis_tick_count(&self) -> usize {
        self.axis_tick_count
    }

    pub fn set_axis_tick_count(&mut self, count: usize) -> &mut Self {
        self.axis_tick_count = count;
        self
    }

    /// Opacity entering markers are created with.
    #[must_use]
    pub fn enter_opacity(&self) -> f64 {
        self.enter_opacity
    }

    pub fn set_enter_opacity(&mut self, opacity: f64) -> &mut Self {
        self.enter_opacity = opacity;
        self
    }

    #[must_use]
    pub fn marker_opacity(&self) -> f64 {
        self.marker_opacity
    }

    pub fn set_marker_opacity(&mut self, opacity: f64) -> &mut Self {
        self.marker_opacity = opacity;
        self
    }

    #[must_use]
    pub fn curve_stroke_width(&self) -> f64 {
        self.curve_stroke_width
    }

    pub fn set_curve_stroke_width(&mut self, width: f64) -> &mut Self {
        self.curve_stroke_width = width;
        self
    }

    /// Whether entering curves are drawn on progressively after their
    /// geometry transition.
    #[must_use]
    pub fn curve_reveal(&self) -> bool {
        self.curve_reveal
    }

    pub fn set_curve_reveal(&mut self, reveal: bool) -> &mut Self {
        self.curve_reveal = reveal;
        self
    }

    #[must_use]
    pub fn curve_reveal_ms(&self) -> f64 {
        self.curve_reveal_ms
    }

    pub fn set_curve_reveal_ms(&mut self, reveal_ms: f64) -> &mut Self {
        self.curve_reveal_ms = reveal_ms;
        self
    }

    #[must_use]
    pub fn duplicate_keys(&self) -> DuplicateKeyPolicy {
        self.duplicate_keys
    }

    pub fn set_duplicate_keys(&mut self, policy: DuplicateKeyPolicy) -> &mut Self {
        self.duplicate_keys = policy;
        self
    }

    #[must_use]
    pub fn color_fn(&self) -> &ColorFn {
        &self.color_fn
    }

    pub fn set_color_fn(&mut self, color_fn: ColorFn) -> &mut Self {
        self.color_fn = color_fn;
        self
    }

    #[must_use]
    pub fn radius_fn(&self) -> &RadiusFn {
        &self.radius_fn
    }

    pub fn set_radius_fn(&mut self, radius_fn: RadiusFn) -> &mut Self {
        self.radius_fn = radius_fn;
        self
    }

    #[must_use]
    pub fn delay_fn(&self) -> &DelayFn {
        &self.delay_fn
    }

    pub fn set_delay_fn(&mut self, delay_fn: DelayFn) -> &mut Self {
        self.delay_fn = delay_fn;
        self
    }

    #[must_use]
    pub fn y_axis_formatter(&self) -> &TickFormatFn {
        &self.y_axis_formatter
    }

    pub fn set_y_axis_formatter(&mut self, formatter: TickFormatFn) -> &mut Self {
        self.y_axis_formatter = formatter;
        self
    }
}
