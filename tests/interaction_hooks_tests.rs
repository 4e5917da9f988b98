use std::cell::RefCell;
use std::rc::Rc;

use scatter_pack::api::MarkerAttrs;
use scatter_pack::core::{ChartData, DataPoint, ElementKey, ScaleMapping};
use scatter_pack::interaction::{HoverChange, MarkerHooks};
use scatter_pack::render::NullRenderer;
use scatter_pack::{Chart, Container};

const SETTLED_MS: f64 = 10_000.0;
const PLOT_LEFT: f64 = 70.0;

struct RecordingHooks {
    log: Rc<RefCell<Vec<String>>>,
}

impl MarkerHooks for RecordingHooks {
    fn on_enter(&mut self, key: &ElementKey, attrs: &MarkerAttrs) {
        self.log
            .borrow_mut()
            .push(format!("enter:{key}:r={}", attrs.r));
    }

    fn on_leave(&mut self, key: &ElementKey) {
        self.log.borrow_mut().push(format!("leave:{key}"));
    }
}

fn scatter() -> Vec<DataPoint> {
    vec![
        DataPoint::new("a", 10.0, 100.0),
        DataPoint::new("b", 20.0, 200.0),
        DataPoint::new("c", 30.0, 300.0),
    ]
}

fn rendered(
    points: Vec<DataPoint>,
) -> (
    Chart,
    Container<NullRenderer>,
    Rc<RefCell<Vec<String>>>,
    (ScaleMapping, ScaleMapping),
) {
    let mut chart = Chart::default();
    let mut container = Container::new(NullRenderer::default());
    let pass = chart
        .render(&mut container, &ChartData::new().with_scatter(points), 0.0)
        .expect("render");
    let log = Rc::new(RefCell::new(Vec::new()));
    container.set_marker_hooks(Box::new(RecordingHooks {
        log: Rc::clone(&log),
    }));
    (chart, container, log, pass.axis_scales.expect("scales"))
}

fn viewport_point(scales: (ScaleMapping, ScaleMapping), x: f64, y: f64) -> (f64, f64) {
    (PLOT_LEFT + scales.0.map(x), scales.1.map(y))
}

#[test]
fn entering_and_leaving_a_marker_fires_hooks_once() {
    let (_chart, mut container, log, scales) = rendered(scatter());
    let (x, y) = viewport_point(scales, 10.0, 100.0);

    let change = container.pointer_move(x + 1.0, y - 1.0, SETTLED_MS);
    assert_eq!(change, HoverChange::Entered(ElementKey::item("a")));
    assert_eq!(
        container.pointer_move(x, y, SETTLED_MS),
        HoverChange::Unchanged
    );
    assert_eq!(container.pointer().hovered(), Some(&ElementKey::item("a")));

    let change = container.pointer_move(1.0, 1.0, SETTLED_MS);
    assert_eq!(change, HoverChange::Left(ElementKey::item("a")));
    assert_eq!(container.pointer().hovered(), None);

    assert_eq!(*log.borrow(), vec!["enter:a:r=6".to_owned(), "leave:a".to_owned()]);
}

#[test]
fn moving_between_markers_leaves_then_enters() {
    let (_chart, mut container, log, scales) = rendered(scatter());
    let (ax, ay) = viewport_point(scales, 10.0, 100.0);
    let (bx, by) = viewport_point(scales, 20.0, 200.0);

    container.pointer_move(ax, ay, SETTLED_MS);
    let change = container.pointer_move(bx, by, SETTLED_MS);
    assert_eq!(
        change,
        HoverChange::Moved {
            from: ElementKey::item("a"),
            to: ElementKey::item("b"),
        }
    );
    assert_eq!(container.pointer_leave(), HoverChange::Left(ElementKey::item("b")));
    assert_eq!(container.pointer().position(), None);

    assert_eq!(
        *log.borrow(),
        vec![
            "enter:a:r=6".to_owned(),
            "leave:a".to_owned(),
            "enter:b:r=6".to_owned(),
            "leave:b".to_owned(),
        ]
    );
}

#[test]
fn topmost_marker_wins_when_markers_overlap() {
    let points = vec![
        DataPoint::new("under", 10.0, 100.0),
        DataPoint::new("over", 10.0, 100.0),
        DataPoint::new("far", 30.0, 300.0),
    ];
    let (_chart, mut container, _log, scales) = rendered(points);
    let (x, y) = viewport_point(scales, 10.0, 100.0);

    assert_eq!(
        container.pointer_move(x, y, SETTLED_MS),
        HoverChange::Entered(ElementKey::item("over"))
    );
}

#[test]
fn markers_that_have_not_grown_yet_cannot_be_hovered() {
    let (_chart, mut container, log, scales) = rendered(scatter());
    let (x, y) = viewport_point(scales, 10.0, 100.0);

    // Still waiting for its entrance delay: zero radius.
    assert_eq!(container.pointer_move(x, y, 0.0), HoverChange::Unchanged);
    assert!(log.borrow().is_empty());
}

#[test]
fn removing_the_hovered_marker_fires_leave() {
    let (mut chart, mut container, log, scales) = rendered(scatter());
    let (x, y) = viewport_point(scales, 10.0, 100.0);
    container.pointer_move(x, y, SETTLED_MS);

    let next = vec![
        DataPoint::new("b", 20.0, 200.0),
        DataPoint::new("c", 30.0, 300.0),
    ];
    chart
        .render(&mut container, &ChartData::new().with_scatter(next), SETTLED_MS)
        .expect("render without a");

    assert_eq!(container.pointer().hovered(), None);
    assert_eq!(log.borrow().last().map(String::as_str), Some("leave:a"));
}

#[test]
fn detached_hooks_stop_receiving_events() {
    let (_chart, mut container, log, scales) = rendered(scatter());
    assert!(container.take_marker_hooks().is_some());
    let (x, y) = viewport_point(scales, 10.0, 100.0);

    assert_eq!(
        container.pointer_move(x, y, SETTLED_MS),
        HoverChange::Entered(ElementKey::item("a"))
    );
    assert!(log.borrow().is_empty());
}
