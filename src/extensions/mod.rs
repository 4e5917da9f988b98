//! Optional diagnostic hooks live here.
//!
//! Observers only read render state; they never feed back into a pass.

pub mod diagnostics;

pub use diagnostics::{
    RenderContext, RenderEvent, RenderLayer, RenderObserver, TracingObserver,
};
