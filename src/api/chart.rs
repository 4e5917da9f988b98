use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    ChartData, ElementKey, HierarchyLeaf, Reconciliation, ScaleMapping, Stage, Timing, Transition,
    pack,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{RenderContext, RenderEvent, RenderLayer, RenderObserver};
use crate::render::Renderer;

use super::axis::AxisUpdate;
use super::axis_label_format::{fixed_precision, format_grouped_fixed};
use super::chart_config::ChartConfig;
use super::container::{Container, Scaffold, ScaffoldLayout};
use super::curve_layer::{CurveAttrs, CurvePlan, curve_targets};
use super::marker_layer::{MarkerAttrs, MarkerPlan, pack_targets, scatter_targets};

/// Outcome of one committed render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPass {
    pub pack: bool,
    /// Scales fitted to the scatter data, driving the axes. `None` in pack
    /// mode without scatter data.
    pub axis_scales: Option<(ScaleMapping, ScaleMapping)>,
    /// Scales used to place markers. In pack mode these map packed
    /// coordinates pixel for pixel. `None` when there is nothing to place.
    pub marker_scales: Option<(ScaleMapping, ScaleMapping)>,
    pub markers: Reconciliation<ElementKey>,
    pub curves: Reconciliation<String>,
    /// Time at which every transition started by this call has completed.
    pub settles_at_ms: f64,
}

/// Everything a render call computes before touching the container.
struct PlannedPass {
    layout: ScaffoldLayout,
    axis_scales: Option<(ScaleMapping, ScaleMapping)>,
    marker_scales: Option<(ScaleMapping, ScaleMapping)>,
    marker_targets: IndexMap<ElementKey, MarkerAttrs>,
    marker_plan: MarkerPlan,
    curve_targets: IndexMap<String, CurveAttrs>,
}

/// Reusable chart: configuration plus render orchestration.
///
/// One chart can render into any number of containers; each container keeps
/// its own scaffold and element state.
pub struct Chart {
    config: ChartConfig,
    observers: Vec<Box<dyn RenderObserver>>,
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.observers.iter().map(|observer| observer.id()).collect();
        f.debug_struct("Chart")
            .field("config", &self.config)
            .field("observers", &ids)
            .finish()
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl Chart {
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Mutable access for chained setters. Changes apply from the next render.
    pub fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }

    /// Registers an observer with a unique identifier.
    pub fn register_observer(&mut self, observer: Box<dyn RenderObserver>) -> ChartResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(ChartError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.has_observer(&observer_id) {
            return Err(ChartError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Unregisters an observer by id. Returns `true` when removed.
    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn has_observer(&self, observer_id: &str) -> bool {
        self.observers
            .iter()
            .any(|observer| observer.id() == observer_id)
    }

    /// Runs one render pass into `container` at time `now_ms`.
    ///
    /// Scales are refitted from the current data on every call. All input is
    /// validated first; on error the container is left exactly as it was and
    /// stays usable for the next call.
    pub fn render<R: Renderer>(
        &mut self,
        container: &mut Container<R>,
        data: &ChartData,
        now_ms: f64,
    ) -> ChartResult<RenderPass> {
        let mut events = Vec::new();
        let outcome = self
            .plan(data, now_ms)
            .map(|planned| self.commit(container, planned, now_ms, &mut events));

        if let Err(err) = &outcome {
            warn!(error = %err, pack = self.config.pack(), "render pass rejected");
            events.push(RenderEvent::RenderFailed {
                error: err.to_string(),
            });
        }

        let context = RenderContext {
            now_ms,
            pack: self.config.pack(),
            marker_count: container.markers.len(),
            curve_count: container.curves.len(),
        };
        for event in &events {
            for observer in &mut self.observers {
                observer.on_event(event, context);
            }
        }
        outcome
    }

    fn plan(&self, data: &ChartData, now_ms: f64) -> ChartResult<PlannedPass> {
        let config = &self.config;
        if !now_ms.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "render time must be finite, got {now_ms}"
            )));
        }
        config.validate()?;
        let layout = ScaffoldLayout::from_config(config);

        let axis_scales = if data.scatter.is_empty() {
            if !config.pack() {
                return Err(ChartError::InvalidDomain(
                    "scatter data is empty; cannot fit axis scales".to_owned(),
                ));
            }
            None
        } else {
            let x_padding = config.x_padding();
            let y_padding = config.y_padding();
            let x_scale = ScaleMapping::fit(
                data.scatter.iter().map(|point| point.x),
                (0.0, layout.plot_width),
                x_padding.low,
                x_padding.high,
            )?;
            let y_scale = ScaleMapping::fit(
                data.scatter.iter().map(|point| point.y),
                (layout.plot_height, 0.0),
                y_padding.low,
                y_padding.high,
            )?;
            Some((x_scale, y_scale))
        };

        let (marker_scales, marker_targets, curve_targets) = if config.pack() {
            let leaves = data
                .pack
                .iter()
                .map(|record| {
                    HierarchyLeaf::from_record(
                        record,
                        config.pack_group_field(),
                        config.pack_value_field(),
                    )
                })
                .collect::<ChartResult<Vec<_>>>()?;
            let canvas_size = layout.plot_width.min(layout.plot_height);
            let circles = pack(&leaves, canvas_size)?;
            if circles.is_empty() {
                (None, IndexMap::new(), IndexMap::new())
            } else {
                let x_scale = ScaleMapping::identity_over(circles.iter().map(|c| c.x))?;
                let y_scale = ScaleMapping::identity_over(circles.iter().map(|c| c.y))?;
                let targets = pack_targets(&circles, x_scale, y_scale, config)?;
                (Some((x_scale, y_scale)), targets, IndexMap::new())
            }
        } else {
            let Some((x_scale, y_scale)) = axis_scales else {
                return Err(ChartError::InvalidDomain(
                    "scatter data is empty; cannot fit axis scales".to_owned(),
                ));
            };
            let markers = scatter_targets(&data.scatter, x_scale, y_scale, config)?;
            let curves = curve_targets(&data.line, x_scale, y_scale, config)?;
            (axis_scales, markers, curves)
        };

        let marker_plan = MarkerPlan::new(&marker_targets, config)?;
        Ok(PlannedPass {
            layout,
            axis_scales,
            marker_scales,
            marker_targets,
            marker_plan,
            curve_targets,
        })
    }

    fn commit<R: Renderer>(
        &self,
        container: &mut Container<R>,
        planned: PlannedPass,
        now_ms: f64,
        events: &mut Vec<RenderEvent>,
    ) -> RenderPass {
        let config = &self.config;
        let pack_mode = config.pack();
        let visible_opacity = if pack_mode { 0.0 } else { 1.0 };
        let timing = Timing::new(0.0, config.duration_ms());

        match container.scaffold.as_ref() {
            Some(existing) => {
                if existing.pack != pack_mode {
                    events.push(RenderEvent::ModeChanged { pack: pack_mode });
                }
            }
            None => {
                debug!(
                    width = planned.layout.viewport.width,
                    height = planned.layout.viewport.height,
                    pack = pack_mode,
                    "created chart scaffold"
                );
                events.push(RenderEvent::ScaffoldCreated {
                    viewport: planned.layout.viewport,
                });
            }
        }
        let scaffold = container
            .scaffold
            .get_or_insert_with(|| Scaffold::new(planned.layout, pack_mode, now_ms));
        scaffold.layout = planned.layout;
        scaffold.pack = pack_mode;

        if let Some((x, y)) = planned.axis_scales {
            events.push(RenderEvent::ScalesFitted { x, y });
        }

        let tick_count = config.axis_tick_count();
        let x_precision = fixed_precision(
            planned
                .axis_scales
                .and_then(|(x, _)| x.tick_step(tick_count)),
        );
        let x_format = move |value: f64| format_grouped_fixed(value, x_precision);
        let y_format = |value: f64| config.y_axis_formatter().call(value);
        let axes = [
            (
                &mut scaffold.x_axis,
                planned.axis_scales.map(|(x, _)| x),
                &x_format as &dyn Fn(f64) -> String,
                RenderLayer::XAxisTicks,
            ),
            (
                &mut scaffold.y_axis,
                planned.axis_scales.map(|(_, y)| y),
                &y_format as &dyn Fn(f64) -> String,
                RenderLayer::YAxisTicks,
            ),
        ];
        for (axis, scale, format, layer) in axes {
            let update = AxisUpdate {
                scale,
                tick_count,
                format,
                opacity: visible_opacity,
                duration_ms: config.duration_ms(),
                easing: config.easing(),
            };
            if let Some(ticks) = axis.update(&update, now_ms) {
                events.push(reconciled_event(layer, &ticks));
            }
        }

        for (title, text) in [
            (&mut scaffold.x_title, config.x_title()),
            (&mut scaffold.y_title, config.y_title()),
        ] {
            let opacity = Transition::new(
                title.opacity_at(now_ms),
                now_ms,
                Stage::new(visible_opacity, timing, config.easing()),
            );
            title.set(text, opacity);
        }

        let markers =
            container
                .markers
                .reconcile(planned.marker_targets, now_ms, &planned.marker_plan);
        container.detach_exiting(&markers.exiting);
        events.push(reconciled_event(RenderLayer::Markers, &markers));

        let curves = container.curves.reconcile(
            planned.curve_targets,
            now_ms,
            &CurvePlan::new(config),
        );
        events.push(reconciled_event(RenderLayer::Curves, &curves));

        debug!(
            pack = pack_mode,
            markers_entering = markers.entering.len(),
            markers_updating = markers.updating.len(),
            markers_exiting = markers.exiting.len(),
            curves_entering = curves.entering.len(),
            curves_exiting = curves.exiting.len(),
            "render pass committed"
        );

        RenderPass {
            pack: pack_mode,
            axis_scales: planned.axis_scales,
            marker_scales: planned.marker_scales,
            markers,
            curves,
            settles_at_ms: container.settled_at().unwrap_or(now_ms),
        }
    }
}

fn reconciled_event<K>(layer: RenderLayer, reconciliation: &Reconciliation<K>) -> RenderEvent {
    RenderEvent::LayerReconciled {
        layer,
        entering: reconciliation.entering.len(),
        updating: reconciliation.updating.len(),
        exiting: reconciliation.exiting.len(),
    }
}
