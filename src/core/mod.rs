pub mod coerce;
pub mod pack;
mod pack_siblings;
pub mod reconcile;
pub mod scale;
pub mod transition;
pub mod types;

pub use pack::{PackedCircle, pack};
pub use reconcile::{
    DuplicateKeyPolicy, KeyedElements, Reconciliation, TransitionPlan, index_by_key, partition,
};
pub use scale::ScaleMapping;
pub use transition::{Easing, Interpolate, Stage, Timing, Transition};
pub use types::{
    ChartData, CurvePoint, CurveSeries, DataPoint, ElementKey, HierarchyLeaf, Margin, PackRecord,
    Viewport,
};
