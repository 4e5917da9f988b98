use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{
    Easing, Interpolate, KeyedElements, Reconciliation, ScaleMapping, Stage, Timing, Transition,
    TransitionPlan,
};
use crate::render::{Color, LinePrimitive, RenderFrame, TextHAlign, TextPrimitive};

pub(crate) const TICK_SIZE_PX: f64 = 6.0;
pub(crate) const TICK_PADDING_PX: f64 = 3.0;
pub(crate) const AXIS_FONT_SIZE_PX: f64 = 10.0;
const AXIS_STROKE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    /// Horizontal axis below the plot, labels under the ticks.
    Bottom,
    /// Vertical axis left of the plot, labels left of the ticks.
    Left,
}

/// Visual state of one tick, relative to the axis origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TickAttrs {
    pub position: f64,
    pub opacity: f64,
    pub label: String,
}

impl Interpolate for TickAttrs {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            position: self.position.interpolate(&to.position, t),
            opacity: self.opacity.interpolate(&to.opacity, t),
            label: to.label.clone(),
        }
    }
}

/// Inputs of one axis update.
pub(crate) struct AxisUpdate<'a> {
    /// New scale, or `None` to keep the current ticks.
    pub scale: Option<ScaleMapping>,
    pub tick_count: usize,
    pub format: &'a dyn Fn(f64) -> String,
    pub opacity: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

struct TickPlan {
    previous: Option<ScaleMapping>,
    timing: Timing,
    easing: Easing,
}

impl TransitionPlan<OrderedFloat<f64>, TickAttrs> for TickPlan {
    fn enter_state(&self, key: &OrderedFloat<f64>, target: &TickAttrs) -> TickAttrs {
        let position = self
            .previous
            .map(|scale| scale.map(key.0))
            .filter(|position| position.is_finite())
            .unwrap_or(target.position);
        TickAttrs {
            position,
            opacity: 0.0,
            label: target.label.clone(),
        }
    }

    fn timing(&self, _key: &OrderedFloat<f64>, _target: &TickAttrs) -> Timing {
        self.timing
    }

    fn easing(&self) -> Easing {
        self.easing
    }
}

/// One axis group: domain line, keyed ticks and group opacity.
#[derive(Debug, Clone)]
pub struct AxisState {
    kind: AxisKind,
    scale: Option<ScaleMapping>,
    ticks: KeyedElements<OrderedFloat<f64>, TickAttrs>,
    opacity: Transition<f64>,
}

impl AxisState {
    pub(crate) fn new(kind: AxisKind, opacity: f64, now_ms: f64) -> Self {
        Self {
            kind,
            scale: None,
            ticks: KeyedElements::new(),
            opacity: Transition::settled(opacity, now_ms),
        }
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    #[must_use]
    pub fn scale(&self) -> Option<ScaleMapping> {
        self.scale
    }

    /// Tick values currently on the axis, in draw order.
    #[must_use]
    pub fn tick_values(&self) -> Vec<f64> {
        self.ticks.keys().map(|key| key.0).collect()
    }

    /// Labels of the settled ticks, in draw order.
    #[must_use]
    pub fn tick_labels(&self) -> Vec<String> {
        self.ticks
            .keys()
            .filter_map(|key| self.ticks.target(key))
            .map(|attrs| attrs.label.clone())
            .collect()
    }

    #[must_use]
    pub fn opacity_at(&self, now_ms: f64) -> f64 {
        self.opacity.sample(now_ms)
    }

    #[must_use]
    pub fn target_opacity(&self) -> f64 {
        *self.opacity.target()
    }

    #[must_use]
    pub fn settled_at(&self) -> f64 {
        self.ticks
            .settled_at()
            .map_or(self.opacity.end_ms(), |ticks| ticks.max(self.opacity.end_ms()))
    }

    pub(crate) fn update(
        &mut self,
        update: &AxisUpdate<'_>,
        now_ms: f64,
    ) -> Option<Reconciliation<OrderedFloat<f64>>> {
        let timing = Timing::new(0.0, update.duration_ms);
        self.opacity = Transition::new(
            self.opacity.sample(now_ms),
            now_ms,
            Stage::new(update.opacity, timing, update.easing),
        );

        let scale = update.scale?;
        let targets: IndexMap<OrderedFloat<f64>, TickAttrs> = scale
            .ticks(update.tick_count)
            .into_iter()
            .map(|value| {
                (
                    OrderedFloat(value),
                    TickAttrs {
                        position: scale.map(value),
                        opacity: 1.0,
                        label: (update.format)(value),
                    },
                )
            })
            .collect();
        let plan = TickPlan {
            previous: self.scale,
            timing,
            easing: update.easing,
        };
        let reconciliation = self.ticks.reconcile(targets, now_ms, &plan);
        self.scale = Some(scale);
        Some(reconciliation)
    }

    /// Appends the axis, offset by `origin`, to `frame`.
    pub(crate) fn draw(&self, origin: (f64, f64), now_ms: f64, frame: &mut RenderFrame) {
        let group_opacity = self.opacity.sample(now_ms).clamp(0.0, 1.0);
        if group_opacity <= 0.0 {
            return;
        }
        let (ox, oy) = origin;
        let ink = Color::BLACK.with_alpha(group_opacity);

        if let Some(scale) = self.scale {
            let (start, end) = scale.range();
            let domain_line = match self.kind {
                AxisKind::Bottom => {
                    LinePrimitive::new(ox + start, oy, ox + end, oy, AXIS_STROKE_WIDTH, ink)
                }
                AxisKind::Left => {
                    LinePrimitive::new(ox, oy + start, ox, oy + end, AXIS_STROKE_WIDTH, ink)
                }
            };
            frame.lines.push(domain_line);
        }

        for (_, tick) in self.ticks.sample(now_ms) {
            let alpha = group_opacity * tick.opacity.clamp(0.0, 1.0);
            if alpha <= 0.0 {
                continue;
            }
            let color = Color::BLACK.with_alpha(alpha);
            let (line, text) = match self.kind {
                AxisKind::Bottom => {
                    let x = ox + tick.position;
                    (
                        LinePrimitive::new(x, oy, x, oy + TICK_SIZE_PX, AXIS_STROKE_WIDTH, color),
                        TextPrimitive::new(
                            tick.label,
                            x,
                            oy + TICK_SIZE_PX + TICK_PADDING_PX + AXIS_FONT_SIZE_PX,
                            AXIS_FONT_SIZE_PX,
                            color,
                            TextHAlign::Center,
                        ),
                    )
                }
                AxisKind::Left => {
                    let y = oy + tick.position;
                    (
                        LinePrimitive::new(ox - TICK_SIZE_PX, y, ox, y, AXIS_STROKE_WIDTH, color),
                        TextPrimitive::new(
                            tick.label,
                            ox - TICK_SIZE_PX - TICK_PADDING_PX,
                            y + AXIS_FONT_SIZE_PX * 0.32,
                            AXIS_FONT_SIZE_PX,
                            color,
                            TextHAlign::Right,
                        ),
                    )
                }
            };
            frame.lines.push(line);
            if !text.text.is_empty() {
                frame.texts.push(text);
            }
        }
    }
}
