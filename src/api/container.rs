use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{ElementKey, KeyedElements, Margin, Transition, Viewport};
use crate::error::ChartResult;
use crate::interaction::{HoverChange, MarkerHooks, PointerState, hit_circle};
use crate::render::{
    CirclePrimitive, ClipRect, Color, PathPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::axis::{AxisKind, AxisState};
use super::chart_config::ChartConfig;
use super::curve_layer::CurveAttrs;
use super::marker_layer::{MARKER_STROKE_WIDTH, MarkerAttrs};

pub(crate) const TITLE_FONT_SIZE_PX: f64 = 12.0;
const X_TITLE_OFFSET_PX: f64 = 40.0;
const Y_TITLE_OFFSET_PX: f64 = 50.0;

/// Pixel geometry of the scaffold, derived from size and margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldLayout {
    pub viewport: Viewport,
    pub margin: Margin,
    pub plot_width: f64,
    pub plot_height: f64,
}

impl ScaffoldLayout {
    #[must_use]
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            viewport: config.viewport(),
            margin: config.margin(),
            plot_width: config.plot_width(),
            plot_height: config.plot_height(),
        }
    }

    /// Top-left corner of the plot area; marker coordinates are relative to it.
    #[must_use]
    pub fn plot_origin(&self) -> (f64, f64) {
        (self.margin.left, self.margin.top)
    }

    #[must_use]
    pub fn x_axis_origin(&self) -> (f64, f64) {
        (self.margin.left, self.margin.top + self.plot_height)
    }

    #[must_use]
    pub fn y_axis_origin(&self) -> (f64, f64) {
        self.plot_origin()
    }

    #[must_use]
    pub fn plot_clip(&self) -> ClipRect {
        ClipRect {
            x: self.margin.left,
            y: self.margin.top,
            width: self.plot_width,
            height: self.plot_height,
        }
    }
}

/// Axis title: text swaps immediately, opacity animates.
#[derive(Debug, Clone)]
pub struct TitleState {
    text: String,
    opacity: Transition<f64>,
}

impl TitleState {
    fn new(opacity: f64, now_ms: f64) -> Self {
        Self {
            text: String::new(),
            opacity: Transition::settled(opacity, now_ms),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn opacity_at(&self, now_ms: f64) -> f64 {
        self.opacity.sample(now_ms)
    }

    pub(crate) fn set(&mut self, text: &str, opacity: Transition<f64>) {
        text.clone_into(&mut self.text);
        self.opacity = opacity;
    }
}

/// Static chart structure, created once per container and reused by every
/// later render.
#[derive(Debug, Clone)]
pub struct Scaffold {
    created_at_ms: f64,
    pub(crate) layout: ScaffoldLayout,
    pub(crate) pack: bool,
    pub(crate) x_axis: AxisState,
    pub(crate) y_axis: AxisState,
    pub(crate) x_title: TitleState,
    pub(crate) y_title: TitleState,
}

impl Scaffold {
    pub(crate) fn new(layout: ScaffoldLayout, pack: bool, now_ms: f64) -> Self {
        let opacity = if pack { 0.0 } else { 1.0 };
        Self {
            created_at_ms: now_ms,
            layout,
            pack,
            x_axis: AxisState::new(AxisKind::Bottom, opacity, now_ms),
            y_axis: AxisState::new(AxisKind::Left, opacity, now_ms),
            x_title: TitleState::new(opacity, now_ms),
            y_title: TitleState::new(opacity, now_ms),
        }
    }

    #[must_use]
    pub fn created_at_ms(&self) -> f64 {
        self.created_at_ms
    }

    #[must_use]
    pub fn layout(&self) -> ScaffoldLayout {
        self.layout
    }

    /// Mode of the last committed render.
    #[must_use]
    pub fn pack(&self) -> bool {
        self.pack
    }

    #[must_use]
    pub fn x_axis(&self) -> &AxisState {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &AxisState {
        &self.y_axis
    }

    #[must_use]
    pub fn x_title(&self) -> &TitleState {
        &self.x_title
    }

    #[must_use]
    pub fn y_title(&self) -> &TitleState {
        &self.y_title
    }

    fn settled_at(&self) -> f64 {
        [
            self.x_axis.settled_at(),
            self.y_axis.settled_at(),
            self.x_title.opacity.end_ms(),
            self.y_title.opacity.end_ms(),
        ]
        .into_iter()
        .fold(self.created_at_ms, f64::max)
    }

    fn draw_titles(&self, now_ms: f64, frame: &mut RenderFrame) {
        let layout = self.layout;
        let x_anchor = (
            layout.margin.left + layout.plot_width / 2.0,
            layout.margin.top + layout.plot_height + X_TITLE_OFFSET_PX,
        );
        let y_anchor = (
            layout.margin.left - Y_TITLE_OFFSET_PX,
            layout.margin.top + layout.plot_height / 2.0,
        );
        for (title, (x, y), rotation_deg) in [
            (&self.x_title, x_anchor, 0.0),
            (&self.y_title, y_anchor, -90.0),
        ] {
            let opacity = title.opacity.sample(now_ms).clamp(0.0, 1.0);
            if title.text.is_empty() || opacity <= 0.0 {
                continue;
            }
            frame.texts.push(
                TextPrimitive::new(
                    title.text.clone(),
                    x,
                    y,
                    TITLE_FONT_SIZE_PX,
                    Color::BLACK.with_alpha(opacity),
                    TextHAlign::Center,
                )
                .with_rotation(rotation_deg),
            );
        }
    }
}

/// Render target of a chart: owns the renderer, the scaffold and the keyed
/// element sets of previous renders.
///
/// One container belongs to one chart placement; nothing is shared between
/// containers.
pub struct Container<R: Renderer> {
    renderer: R,
    pub(crate) scaffold: Option<Scaffold>,
    pub(crate) markers: KeyedElements<ElementKey, MarkerAttrs>,
    pub(crate) curves: KeyedElements<String, CurveAttrs>,
    pointer: PointerState,
    hooks: Option<Box<dyn MarkerHooks>>,
}

impl<R: Renderer + fmt::Debug> fmt::Debug for Container<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("renderer", &self.renderer)
            .field("scaffold", &self.scaffold)
            .field("markers", &self.markers.len())
            .field("curves", &self.curves.len())
            .field("pointer", &self.pointer)
            .field("has_hooks", &self.hooks.is_some())
            .finish()
    }
}

impl<R: Renderer> Container<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            scaffold: None,
            markers: KeyedElements::new(),
            curves: KeyedElements::new(),
            pointer: PointerState::default(),
            hooks: None,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// `None` until the first successful render.
    #[must_use]
    pub fn scaffold(&self) -> Option<&Scaffold> {
        self.scaffold.as_ref()
    }

    #[must_use]
    pub fn markers(&self) -> &KeyedElements<ElementKey, MarkerAttrs> {
        &self.markers
    }

    #[must_use]
    pub fn curves(&self) -> &KeyedElements<String, CurveAttrs> {
        &self.curves
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Time at which every running transition has completed.
    #[must_use]
    pub fn settled_at(&self) -> Option<f64> {
        let scaffold = self.scaffold.as_ref()?;
        let mut settled = scaffold.settled_at();
        for end in [self.markers.settled_at(), self.curves.settled_at()]
            .into_iter()
            .flatten()
        {
            settled = settled.max(end);
        }
        Some(settled)
    }

    /// Samples every element at `now_ms`. `None` before the first render.
    #[must_use]
    pub fn frame(&self, now_ms: f64) -> Option<RenderFrame> {
        let scaffold = self.scaffold.as_ref()?;
        let layout = scaffold.layout;
        let (ox, oy) = layout.plot_origin();
        let mut frame = RenderFrame::new(layout.viewport).with_plot_clip(layout.plot_clip());

        for (_, marker) in self.markers.sample(now_ms) {
            frame.circles.push(CirclePrimitive {
                cx: ox + marker.cx,
                cy: oy + marker.cy,
                r: marker.r.max(0.0),
                fill: marker.fill,
                stroke: marker.stroke,
                stroke_width: MARKER_STROKE_WIDTH,
                opacity: marker.opacity.clamp(0.0, 1.0),
            });
        }

        for (_, curve) in self.curves.sample(now_ms) {
            if !curve.stroke.is_visible() || curve.points.is_empty() {
                continue;
            }
            frame.paths.push(PathPrimitive {
                points: curve
                    .points
                    .iter()
                    .map(|(x, y)| (ox + x, oy + y))
                    .collect(),
                stroke: curve.stroke,
                stroke_width: curve.stroke_width,
                reveal: curve.reveal.clamp(0.0, 1.0),
            });
        }

        scaffold
            .x_axis
            .draw(layout.x_axis_origin(), now_ms, &mut frame);
        scaffold
            .y_axis
            .draw(layout.y_axis_origin(), now_ms, &mut frame);
        scaffold.draw_titles(now_ms, &mut frame);
        Some(frame)
    }

    /// Hands the frame at `now_ms` to the renderer. Returns `false` when
    /// nothing has been rendered into this container yet.
    pub fn present(&mut self, now_ms: f64) -> ChartResult<bool> {
        let Some(frame) = self.frame(now_ms) else {
            return Ok(false);
        };
        self.renderer.render(&frame)?;
        trace!(
            now_ms = now_ms,
            circles = frame.circles.len(),
            paths = frame.paths.len(),
            texts = frame.texts.len(),
            "presented frame"
        );
        Ok(true)
    }

    /// Attaches `onEnter`/`onLeave` hooks to every marker, replacing any
    /// previous hooks.
    pub fn set_marker_hooks(&mut self, hooks: Box<dyn MarkerHooks>) {
        self.hooks = Some(hooks);
    }

    /// Detaches the marker hooks, returning them.
    pub fn take_marker_hooks(&mut self) -> Option<Box<dyn MarkerHooks>> {
        self.hooks.take()
    }

    /// Hit-tests markers sampled at `now_ms` under viewport point `(x, y)`.
    /// The topmost (last drawn) marker wins.
    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> HoverChange {
        let hit = self.scaffold.as_ref().and_then(|scaffold| {
            let (ox, oy) = scaffold.layout.plot_origin();
            let sampled: Vec<_> = self.markers.sample(now_ms).collect();
            sampled
                .into_iter()
                .rev()
                .find(|(_, attrs)| hit_circle(attrs, x - ox, y - oy))
                .map(|(key, attrs)| (key.clone(), attrs))
        });
        let (hit_key, hit_attrs) = match hit {
            Some((key, attrs)) => (Some(key), Some(attrs)),
            None => (None, None),
        };

        let change = self.pointer.hover((x, y), hit_key);
        self.dispatch(&change, hit_attrs.as_ref());
        change
    }

    /// Pointer left the drawing surface.
    pub fn pointer_leave(&mut self) -> HoverChange {
        let change = self.pointer.leave();
        self.dispatch(&change, None);
        change
    }

    /// Fires `on_leave` for a hovered marker that was just removed.
    pub(crate) fn detach_exiting(&mut self, exiting: &[ElementKey]) {
        if let Some(key) = self.pointer.detach(exiting) {
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.on_leave(&key);
            }
        }
    }

    fn dispatch(&mut self, change: &HoverChange, entered: Option<&MarkerAttrs>) {
        let Some(hooks) = self.hooks.as_mut() else {
            return;
        };
        match change {
            HoverChange::Unchanged => {}
            HoverChange::Entered(key) => {
                if let Some(attrs) = entered {
                    hooks.on_enter(key, attrs);
                }
            }
            HoverChange::Left(key) => hooks.on_leave(key),
            HoverChange::Moved { from, to } => {
                hooks.on_leave(from);
                if let Some(attrs) = entered {
                    hooks.on_enter(to, attrs);
                }
            }
        }
    }
}
