use serde::{Deserialize, Serialize};

use crate::api::MarkerAttrs;
use crate::core::ElementKey;

/// Extra hit distance around outline-only markers, in pixels.
pub const STROKE_HIT_TOLERANCE_PX: f64 = 2.0;

/// Pointer hooks attached to every marker element.
///
/// What happens behind them (tooltips, highlighting) belongs to the host.
pub trait MarkerHooks {
    fn on_enter(&mut self, key: &ElementKey, attrs: &MarkerAttrs);
    fn on_leave(&mut self, key: &ElementKey);
}

/// Transition of the hovered marker caused by one pointer update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverChange {
    Unchanged,
    Entered(ElementKey),
    Left(ElementKey),
    Moved { from: ElementKey, to: ElementKey },
}

/// Pointer position and the marker currently under it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    position: Option<(f64, f64)>,
    hovered: Option<ElementKey>,
}

impl PointerState {
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&ElementKey> {
        self.hovered.as_ref()
    }

    pub(crate) fn hover(&mut self, position: (f64, f64), hit: Option<ElementKey>) -> HoverChange {
        self.position = Some(position);
        self.set_hovered(hit)
    }

    pub(crate) fn leave(&mut self) -> HoverChange {
        self.position = None;
        self.set_hovered(None)
    }

    /// Forgets the hovered marker if it is in `removed`.
    pub(crate) fn detach<'a>(
        &mut self,
        removed: impl IntoIterator<Item = &'a ElementKey>,
    ) -> Option<ElementKey> {
        let hovered = self.hovered.as_ref()?;
        if removed.into_iter().any(|key| key == hovered) {
            return self.hovered.take();
        }
        None
    }

    fn set_hovered(&mut self, hit: Option<ElementKey>) -> HoverChange {
        let previous = std::mem::replace(&mut self.hovered, hit);
        match (previous, self.hovered.clone()) {
            (None, None) => HoverChange::Unchanged,
            (Some(from), Some(to)) if from == to => HoverChange::Unchanged,
            (None, Some(to)) => HoverChange::Entered(to),
            (Some(from), None) => HoverChange::Left(from),
            (Some(from), Some(to)) => HoverChange::Moved { from, to },
        }
    }
}

/// True when `(x, y)` hits the painted part of a marker: its fill, or its
/// outline ring when the fill is transparent.
#[must_use]
pub fn hit_circle(attrs: &MarkerAttrs, x: f64, y: f64) -> bool {
    if attrs.opacity <= 0.0 || attrs.r <= 0.0 {
        return false;
    }
    let distance = ((x - attrs.cx).powi(2) + (y - attrs.cy).powi(2)).sqrt();
    if attrs.fill.is_visible() && distance <= attrs.r {
        return true;
    }
    attrs.stroke.is_visible() && (distance - attrs.r).abs() <= STROKE_HIT_TOLERANCE_PX
}
