use indexmap::IndexMap;
#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{
    DataPoint, Easing, ElementKey, Interpolate, PackedCircle, ScaleMapping, Timing,
    TransitionPlan, index_by_key,
};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

use super::chart_config::{ChartConfig, DelayInput};

pub(crate) const MARKER_STROKE_WIDTH: f64 = 1.0;

/// Visual state of one marker circle in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerAttrs {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: Color,
    pub stroke: Color,
    pub opacity: f64,
}

impl Interpolate for MarkerAttrs {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            cx: self.cx.interpolate(&to.cx, t),
            cy: self.cy.interpolate(&to.cy, t),
            r: self.r.interpolate(&to.r, t),
            fill: self.fill.interpolate(&to.fill, t),
            stroke: self.stroke.interpolate(&to.stroke, t),
            opacity: self.opacity.interpolate(&to.opacity, t),
        }
    }
}

/// Target attributes for every scatter point, keyed by item id.
pub(crate) fn scatter_targets(
    points: &[DataPoint],
    x_scale: ScaleMapping,
    y_scale: ScaleMapping,
    config: &ChartConfig,
) -> ChartResult<IndexMap<ElementKey, MarkerAttrs>> {
    let project = |point: &DataPoint| -> ChartResult<(ElementKey, MarkerAttrs)> {
        let r = config.radius_fn().call(point);
        if !r.is_finite() || r < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "radius of `{}` must be finite and >= 0, got {r}",
                point.id
            )));
        }
        let attrs = MarkerAttrs {
            cx: x_scale.map(point.x),
            cy: y_scale.map(point.y),
            r,
            fill: config.color_fn().call(point.color.as_deref()),
            stroke: Color::TRANSPARENT,
            opacity: config.marker_opacity(),
        };
        Ok((ElementKey::item(point.id.clone()), attrs))
    };

    #[cfg(feature = "parallel-projection")]
    let projected: Vec<(ElementKey, MarkerAttrs)> = {
        let projected: Vec<ChartResult<(ElementKey, MarkerAttrs)>> =
            points.par_iter().map(project).collect();
        projected.into_iter().collect::<ChartResult<_>>()?
    };

    #[cfg(not(feature = "parallel-projection"))]
    let projected: Vec<(ElementKey, MarkerAttrs)> = {
        let mut out = Vec::with_capacity(points.len());
        for point in points {
            out.push(project(point)?);
        }
        out
    };

    index_by_key(projected, config.duplicate_keys(), "marker")
}

/// Target attributes for a pack layout. Containers are outlined, leaves are
/// filled through the color function.
pub(crate) fn pack_targets(
    circles: &[PackedCircle],
    x_scale: ScaleMapping,
    y_scale: ScaleMapping,
    config: &ChartConfig,
) -> ChartResult<IndexMap<ElementKey, MarkerAttrs>> {
    let targets = circles.iter().map(|circle| {
        let (key, fill, stroke) = if circle.container {
            (
                ElementKey::group(circle.id.clone()),
                Color::TRANSPARENT,
                Color::BLACK,
            )
        } else {
            (
                ElementKey::item(circle.id.clone()),
                config.color_fn().call(circle.color.as_deref()),
                Color::TRANSPARENT,
            )
        };
        let attrs = MarkerAttrs {
            cx: x_scale.map(circle.x),
            cy: y_scale.map(circle.y),
            r: circle.r,
            fill,
            stroke,
            opacity: config.marker_opacity(),
        };
        (key, attrs)
    });
    index_by_key(targets, config.duplicate_keys(), "marker")
}

/// Entrance choreography for markers: grow in place from zero radius,
/// staggered by the configured delay function.
pub(crate) struct MarkerPlan {
    delays: IndexMap<ElementKey, f64>,
    duration_ms: f64,
    easing: Easing,
    enter_opacity: f64,
}

impl MarkerPlan {
    /// Resolves the delay of every target up front so a failing delay
    /// function aborts the render before anything is mutated.
    pub(crate) fn new(
        targets: &IndexMap<ElementKey, MarkerAttrs>,
        config: &ChartConfig,
    ) -> ChartResult<Self> {
        let mut delays = IndexMap::with_capacity(targets.len());
        for (index, (key, attrs)) in targets.iter().enumerate() {
            let delay = config.delay_fn().call(DelayInput {
                key,
                index,
                cx: attrs.cx,
                cy: attrs.cy,
            });
            if !delay.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "delay of `{key}` must be finite, got {delay}"
                )));
            }
            delays.insert(key.clone(), delay.max(0.0));
        }
        Ok(Self {
            delays,
            duration_ms: config.duration_ms(),
            easing: config.easing(),
            enter_opacity: config.enter_opacity(),
        })
    }
}

impl TransitionPlan<ElementKey, MarkerAttrs> for MarkerPlan {
    fn enter_state(&self, _key: &ElementKey, target: &MarkerAttrs) -> MarkerAttrs {
        MarkerAttrs {
            r: 0.0,
            opacity: self.enter_opacity,
            ..*target
        }
    }

    fn timing(&self, key: &ElementKey, _target: &MarkerAttrs) -> Timing {
        let delay_ms = self.delays.get(key).copied().unwrap_or(0.0);
        Timing::new(delay_ms, self.duration_ms)
    }

    fn easing(&self) -> Easing {
        self.easing
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerPlan, pack_targets, scatter_targets};
    use crate::api::ChartConfig;
    use crate::core::{
        DataPoint, DuplicateKeyPolicy, ElementKey, PackedCircle, ScaleMapping, TransitionPlan,
    };
    use crate::error::ChartError;
    use crate::render::Color;

    fn identity() -> ScaleMapping {
        ScaleMapping::new((0.0, 100.0), (0.0, 100.0)).expect("scale")
    }

    #[test]
    fn duplicate_ids_are_rejected_by_default() {
        let points = vec![DataPoint::new("a", 1.0, 1.0), DataPoint::new("a", 2.0, 2.0)];
        let err = scatter_targets(&points, identity(), identity(), &ChartConfig::default())
            .expect_err("duplicate must fail");
        assert!(matches!(err, ChartError::DuplicateKey { .. }));
    }

    #[test]
    fn last_wins_keeps_first_slot_and_last_value() {
        let mut config = ChartConfig::default();
        config.set_duplicate_keys(DuplicateKeyPolicy::LastWins);
        let points = vec![
            DataPoint::new("a", 1.0, 1.0),
            DataPoint::new("b", 5.0, 5.0),
            DataPoint::new("a", 9.0, 9.0),
        ];
        let targets =
            scatter_targets(&points, identity(), identity(), &config).expect("targets");
        let keys: Vec<_> = targets.keys().cloned().collect();
        assert_eq!(keys, vec![ElementKey::item("a"), ElementKey::item("b")]);
        assert_eq!(targets[&ElementKey::item("a")].cx, 9.0);
    }

    #[test]
    fn containers_are_outlined_and_leaves_filled() {
        let circles = vec![
            PackedCircle {
                x: 50.0,
                y: 50.0,
                r: 40.0,
                id: "g".to_owned(),
                group: "g".to_owned(),
                color: None,
                depth: 1,
                container: true,
            },
            PackedCircle {
                x: 50.0,
                y: 50.0,
                r: 10.0,
                id: "g".to_owned(),
                group: "g".to_owned(),
                color: Some("red".to_owned()),
                depth: 2,
                container: false,
            },
        ];
        let targets = pack_targets(&circles, identity(), identity(), &ChartConfig::default())
            .expect("targets");
        let container = targets[&ElementKey::group("g")];
        assert_eq!(container.fill, Color::TRANSPARENT);
        assert_eq!(container.stroke, Color::BLACK);
        let leaf = targets[&ElementKey::item("g")];
        assert_eq!(leaf.fill, Color::rgb(1.0, 0.0, 0.0));
        assert!(!leaf.stroke.is_visible());
    }

    #[test]
    fn entering_markers_grow_in_place_after_their_delay() {
        let config = ChartConfig::default();
        let points = vec![DataPoint::new("a", 20.0, 30.0)];
        let targets =
            scatter_targets(&points, identity(), identity(), &config).expect("targets");
        let plan = MarkerPlan::new(&targets, &config).expect("plan");
        let key = ElementKey::item("a");
        let target = targets[&key];

        let start = plan.enter_state(&key, &target);
        assert_eq!((start.cx, start.cy, start.r), (20.0, 30.0, 0.0));
        assert_eq!(start.opacity, 0.3);
        let timing = plan.timing(&key, &target);
        assert_eq!(timing.delay_ms, 100.0);
        assert_eq!(timing.duration_ms, 1_000.0);
    }
}
