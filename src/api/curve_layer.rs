use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    CurveSeries, Easing, Interpolate, ScaleMapping, Stage, Timing, TransitionPlan, index_by_key,
};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

use super::chart_config::ChartConfig;

/// Visual state of one connecting curve in plot coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveAttrs {
    pub points: Vec<(f64, f64)>,
    pub stroke: Color,
    pub stroke_width: f64,
    /// Drawn fraction of the curve length.
    pub reveal: f64,
}

impl Interpolate for CurveAttrs {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        let count = self.points.len().max(to.points.len());
        let points = if self.points.is_empty() || to.points.is_empty() {
            to.points.clone()
        } else {
            (0..count)
                .map(|index| {
                    let from = self.points[index.min(self.points.len() - 1)];
                    let target = to.points[index.min(to.points.len() - 1)];
                    (from.0.interpolate(&target.0, t), from.1.interpolate(&target.1, t))
                })
                .collect()
        };
        Self {
            points,
            stroke: self.stroke.interpolate(&to.stroke, t),
            stroke_width: self.stroke_width.interpolate(&to.stroke_width, t),
            reveal: self.reveal.interpolate(&to.reveal, t),
        }
    }
}

/// Target attributes for every curve, keyed by series key. Each curve is
/// stroked with the color function applied to its key.
pub(crate) fn curve_targets(
    series: &[CurveSeries],
    x_scale: ScaleMapping,
    y_scale: ScaleMapping,
    config: &ChartConfig,
) -> ChartResult<IndexMap<String, CurveAttrs>> {
    let mut projected = Vec::with_capacity(series.len());
    for curve in series {
        let mut points = Vec::with_capacity(curve.values.len());
        for value in &curve.values {
            if !value.x.is_finite() || !value.y.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "curve `{}` has a non-finite point",
                    curve.key
                )));
            }
            points.push((x_scale.map(value.x), y_scale.map(value.y)));
        }
        let attrs = CurveAttrs {
            points,
            stroke: config.color_fn().call(Some(&curve.key)),
            stroke_width: config.curve_stroke_width(),
            reveal: 1.0,
        };
        projected.push((curve.key.clone(), attrs));
    }
    index_by_key(projected, config.duplicate_keys(), "curve")
}

/// Curve choreography: entering curves fade their stroke in over the
/// configured duration, optionally followed by a progressive draw-on.
pub(crate) struct CurvePlan {
    duration_ms: f64,
    easing: Easing,
    reveal_ms: Option<f64>,
}

impl CurvePlan {
    pub(crate) fn new(config: &ChartConfig) -> Self {
        Self {
            duration_ms: config.duration_ms(),
            easing: config.easing(),
            reveal_ms: config.curve_reveal().then(|| config.curve_reveal_ms()),
        }
    }
}

impl TransitionPlan<String, CurveAttrs> for CurvePlan {
    fn enter_state(&self, _key: &String, target: &CurveAttrs) -> CurveAttrs {
        CurveAttrs {
            stroke: target.stroke.with_alpha(0.0),
            reveal: if self.reveal_ms.is_some() { 0.0 } else { 1.0 },
            ..target.clone()
        }
    }

    fn timing(&self, _key: &String, _target: &CurveAttrs) -> Timing {
        Timing::new(0.0, self.duration_ms)
    }

    fn easing(&self) -> Easing {
        self.easing
    }

    fn primary_target(&self, _key: &String, target: &CurveAttrs, entering: bool) -> CurveAttrs {
        if entering && self.reveal_ms.is_some() {
            CurveAttrs {
                reveal: 0.0,
                ..target.clone()
            }
        } else {
            target.clone()
        }
    }

    fn follow_up(
        &self,
        _key: &String,
        target: &CurveAttrs,
        entering: bool,
    ) -> Option<Stage<CurveAttrs>> {
        let reveal_ms = self.reveal_ms.filter(|_| entering)?;
        Some(Stage::new(
            target.clone(),
            Timing::new(0.0, reveal_ms),
            Easing::Linear,
        ))
    }
}
