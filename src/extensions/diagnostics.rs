use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ScaleMapping, Viewport};

/// Keyed element set a reconciliation event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderLayer {
    Markers,
    Curves,
    XAxisTicks,
    YAxisTicks,
}

/// Event stream exposed to render observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderEvent {
    ScaffoldCreated {
        viewport: Viewport,
    },
    ScalesFitted {
        x: ScaleMapping,
        y: ScaleMapping,
    },
    ModeChanged {
        pack: bool,
    },
    LayerReconciled {
        layer: RenderLayer,
        entering: usize,
        updating: usize,
        exiting: usize,
    },
    RenderFailed {
        error: String,
    },
}

/// Read-only snapshot passed with every event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    pub now_ms: f64,
    pub pack: bool,
    pub marker_count: usize,
    pub curve_count: usize,
}

/// Diagnostic hook interface.
///
/// Observers see render progress without access to chart internals.
pub trait RenderObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &RenderEvent, context: RenderContext);
}

/// Forwards every render event to `tracing` at debug level.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl RenderObserver for TracingObserver {
    fn id(&self) -> &str {
        "tracing"
    }

    fn on_event(&mut self, event: &RenderEvent, context: RenderContext) {
        debug!(
            now_ms = context.now_ms,
            pack = context.pack,
            markers = context.marker_count,
            curves = context.curve_count,
            event = ?event,
            "render event"
        );
    }
}
