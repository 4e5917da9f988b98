use std::cell::RefCell;
use std::rc::Rc;

use scatter_pack::core::{ChartData, DataPoint, PackRecord};
use scatter_pack::extensions::{
    RenderContext, RenderEvent, RenderLayer, RenderObserver, TracingObserver,
};
use scatter_pack::render::NullRenderer;
use scatter_pack::{Chart, ChartError, Container};
use serde_json::json;

struct RecordingObserver {
    id: String,
    events: Rc<RefCell<Vec<(String, RenderContext)>>>,
}

impl RecordingObserver {
    fn boxed(id: &str, events: &Rc<RefCell<Vec<(String, RenderContext)>>>) -> Box<Self> {
        Box::new(Self {
            id: id.to_owned(),
            events: Rc::clone(events),
        })
    }
}

impl RenderObserver for RecordingObserver {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &RenderEvent, context: RenderContext) {
        self.events
            .borrow_mut()
            .push((event_kind(event), context));
    }
}

fn event_kind(event: &RenderEvent) -> String {
    match event {
        RenderEvent::ScaffoldCreated { .. } => "scaffold".to_owned(),
        RenderEvent::ScalesFitted { .. } => "scales".to_owned(),
        RenderEvent::ModeChanged { pack } => format!("mode:{pack}"),
        RenderEvent::LayerReconciled {
            layer,
            entering,
            updating,
            exiting,
        } => {
            let layer = match layer {
                RenderLayer::Markers => "markers",
                RenderLayer::Curves => "curves",
                RenderLayer::XAxisTicks => "x_ticks",
                RenderLayer::YAxisTicks => "y_ticks",
            };
            format!("{layer}:{entering}/{updating}/{exiting}")
        }
        RenderEvent::RenderFailed { .. } => "failed".to_owned(),
    }
}

fn kinds(events: &Rc<RefCell<Vec<(String, RenderContext)>>>) -> Vec<String> {
    events.borrow().iter().map(|(kind, _)| kind.clone()).collect()
}

fn scatter_data() -> ChartData {
    ChartData::new().with_scatter(vec![
        DataPoint::new("a", 10.0, 100.0),
        DataPoint::new("b", 20.0, 200.0),
        DataPoint::new("c", 30.0, 300.0),
    ])
}

#[test]
fn first_render_reports_scaffold_scales_and_layers_in_order() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut chart = Chart::default();
    chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect("register");
    let mut container = Container::new(NullRenderer::default());

    chart
        .render(&mut container, &scatter_data(), 0.0)
        .expect("render");

    assert_eq!(
        kinds(&events),
        vec![
            "scaffold",
            "scales",
            "x_ticks:13/0/0",
            "y_ticks:11/0/0",
            "markers:3/0/0",
            "curves:0/0/0",
        ]
    );
    let (_, context) = events.borrow()[0].clone();
    assert_eq!(context.now_ms, 0.0);
    assert!(!context.pack);
    assert_eq!(context.marker_count, 3);
    assert_eq!(context.curve_count, 0);
}

#[test]
fn switching_to_pack_mode_reports_mode_change() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut chart = Chart::default();
    let mut container = Container::new(NullRenderer::default());
    chart
        .render(&mut container, &scatter_data(), 0.0)
        .expect("scatter render");
    chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect("register");

    let data = scatter_data().with_pack(vec![
        PackRecord::new()
            .with_field("id", json!("a"))
            .with_field("group", json!("g"))
            .with_field("y", json!(1)),
    ]);
    chart.config_mut().set_pack(true);
    chart
        .render(&mut container, &data, 10_000.0)
        .expect("pack render");

    assert_eq!(
        kinds(&events),
        vec![
            "mode:true",
            "scales",
            "x_ticks:0/13/0",
            "y_ticks:0/11/0",
            "markers:1/1/2",
            "curves:0/0/0",
        ]
    );
    assert!(events.borrow().iter().all(|(_, context)| context.pack));
}

#[test]
fn rejected_render_reports_failure_only() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut chart = Chart::default();
    chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect("register");
    let mut container = Container::new(NullRenderer::default());

    let err = chart
        .render(&mut container, &ChartData::new(), 0.0)
        .expect_err("empty scatter");
    assert!(matches!(err, ChartError::InvalidDomain(_)));

    assert_eq!(kinds(&events), vec!["failed"]);
    let (_, context) = events.borrow()[0].clone();
    assert_eq!(context.marker_count, 0);
}

#[test]
fn observer_ids_must_be_unique_and_non_empty() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut chart = Chart::default();

    chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect("first registration");
    chart
        .register_observer(Box::new(TracingObserver))
        .expect("tracing observer");
    assert_eq!(chart.observer_count(), 2);
    assert!(chart.has_observer("tracing"));

    let err = chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect_err("duplicate id");
    assert!(matches!(err, ChartError::InvalidData(_)));
    let err = chart
        .register_observer(RecordingObserver::boxed("", &events))
        .expect_err("empty id");
    assert!(matches!(err, ChartError::InvalidData(_)));

    assert!(chart.unregister_observer("recorder"));
    assert!(!chart.unregister_observer("recorder"));
    assert_eq!(chart.observer_count(), 1);
}

#[test]
fn unregistered_observer_stops_receiving_events() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut chart = Chart::default();
    chart
        .register_observer(RecordingObserver::boxed("recorder", &events))
        .expect("register");
    assert!(chart.unregister_observer("recorder"));

    let mut container = Container::new(NullRenderer::default());
    chart
        .render(&mut container, &scatter_data(), 0.0)
        .expect("render");
    assert!(events.borrow().is_empty());
}
