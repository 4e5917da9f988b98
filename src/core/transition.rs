use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Timing curve applied to the normalized progress of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t * t / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * t + 2.0) / 2.0
                }
            }
        }
    }
}

/// Per-element timing directive handed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub delay_ms: f64,
    pub duration_ms: f64,
}

impl Timing {
    #[must_use]
    pub const fn new(delay_ms: f64, duration_ms: f64) -> Self {
        Self {
            delay_ms,
            duration_ms,
        }
    }

    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [(self.delay_ms, "delay_ms"), (self.duration_ms, "duration_ms")] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "transition `{name}` must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(self)
    }
}

/// Values that can be blended between two visual states.
///
/// `t` is eased progress in `[0, 1]`.
pub trait Interpolate: Clone {
    #[must_use]
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage<A> {
    pub target: A,
    pub timing: Timing,
    pub easing: Easing,
}

impl<A> Stage<A> {
    #[must_use]
    pub fn new(target: A, timing: Timing, easing: Easing) -> Self {
        Self {
            target,
            timing,
            easing,
        }
    }
}

/// Time-deferred animation of one attribute set.
///
/// Stages run back to back: each one starts when the previous completes,
/// then waits its own delay before blending towards its target.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<A> {
    from: A,
    start_ms: f64,
    stages: SmallVec<[Stage<A>; 2]>,
}

impl<A: Interpolate> Transition<A> {
    /// A transition that holds `value` forever.
    #[must_use]
    pub fn settled(value: A, now_ms: f64) -> Self {
        Self {
            from: value,
            start_ms: now_ms,
            stages: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn new(from: A, start_ms: f64, stage: Stage<A>) -> Self {
        Self::settled(from, start_ms).then(stage)
    }

    /// Chains `stage` after the last stage completes.
    #[must_use]
    pub fn then(mut self, stage: Stage<A>) -> Self {
        self.stages.push(stage);
        self
    }

    #[must_use]
    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage<A>] {
        &self.stages
    }

    /// Final value once every stage has completed.
    #[must_use]
    pub fn target(&self) -> &A {
        self.stages.last().map_or(&self.from, |stage| &stage.target)
    }

    #[must_use]
    pub fn end_ms(&self) -> f64 {
        self.stages.iter().fold(self.start_ms, |end, stage| {
            end + stage.timing.delay_ms + stage.timing.duration_ms
        })
    }

    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms >= self.end_ms()
    }

    /// Visual state at `now_ms`.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> A {
        let mut current = &self.from;
        let mut stage_origin = self.start_ms;
        for stage in &self.stages {
            let begin = stage_origin + stage.timing.delay_ms;
            let end = begin + stage.timing.duration_ms;
            if now_ms < begin {
                return current.clone();
            }
            if now_ms < end && stage.timing.duration_ms > 0.0 {
                let progress = (now_ms - begin) / stage.timing.duration_ms;
                return current.interpolate(&stage.target, stage.easing.apply(progress));
            }
            current = &stage.target;
            stage_origin = end;
        }
        current.clone()
    }
}
