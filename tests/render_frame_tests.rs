use scatter_pack::api::RENDER_FRAME_JSON_SCHEMA_V1;
use scatter_pack::core::{ChartData, DataPoint, Viewport};
use scatter_pack::render::{
    CirclePrimitive, Color, LinePrimitive, NullRenderer, PathPrimitive, RenderFrame, TextHAlign,
    TextPrimitive,
};
use scatter_pack::{Chart, ChartError, Container};

fn circle(r: f64, opacity: f64) -> CirclePrimitive {
    CirclePrimitive {
        cx: 10.0,
        cy: 10.0,
        r,
        fill: Color::GREEN,
        stroke: Color::TRANSPARENT,
        stroke_width: 1.0,
        opacity,
    }
}

#[test]
fn frame_validation_rejects_bad_geometry() {
    let viewport = Viewport::new(200, 100);
    RenderFrame::new(viewport)
        .with_circle(circle(4.0, 0.5))
        .with_line(LinePrimitive::new(0.0, 0.0, 10.0, 0.0, 1.0, Color::BLACK))
        .with_text(TextPrimitive::new("$100", 5.0, 5.0, 10.0, Color::BLACK, TextHAlign::Right))
        .validate()
        .expect("valid frame");

    let err = RenderFrame::new(Viewport::new(0, 100))
        .validate()
        .expect_err("empty viewport");
    assert!(matches!(err, ChartError::InvalidViewport { .. }));

    for bad in [circle(-1.0, 1.0), circle(f64::NAN, 1.0), circle(4.0, 1.5)] {
        let err = RenderFrame::new(viewport)
            .with_circle(bad)
            .validate()
            .expect_err("bad circle");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }

    let path = PathPrimitive {
        points: vec![(0.0, 0.0), (3.0, 4.0)],
        stroke: Color::BLACK,
        stroke_width: 1.5,
        reveal: 2.0,
    };
    let err = RenderFrame::new(viewport)
        .with_path(path)
        .validate()
        .expect_err("reveal out of range");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let err = RenderFrame::new(viewport)
        .with_text(TextPrimitive::new("", 0.0, 0.0, 10.0, Color::BLACK, TextHAlign::Left))
        .validate()
        .expect_err("empty text");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn path_length_sums_segments() {
    let path = PathPrimitive {
        points: vec![(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)],
        stroke: Color::BLACK,
        stroke_width: 1.0,
        reveal: 1.0,
    };
    assert_eq!(path.length(), 11.0);
}

#[test]
fn color_tags_parse_hex_and_names() {
    assert_eq!(Color::from_tag("#f00"), Some(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(Color::from_tag("#0000ff"), Some(Color::rgb(0.0, 0.0, 1.0)));
    assert_eq!(Color::from_tag(" Green "), Some(Color::GREEN));
    assert_eq!(Color::from_tag("none"), Some(Color::TRANSPARENT));
    assert_eq!(Color::from_tag("#12"), None);
    assert_eq!(Color::from_tag("chartreuse-ish"), None);
}

#[test]
fn container_frame_round_trips_through_json_contract() {
    let mut chart = Chart::default();
    let mut container = Container::new(NullRenderer::default());
    let data = ChartData::new().with_scatter(vec![
        DataPoint::new("a", 1.0, 10.0),
        DataPoint::new("b", 2.0, 20.0),
    ]);
    chart.render(&mut container, &data, 0.0).expect("render");

    let json = container
        .frame_json_contract_v1_pretty(10_000.0)
        .expect("contract json");
    assert!(json.contains(&format!("\"schema_version\": {RENDER_FRAME_JSON_SCHEMA_V1}")));

    let restored = RenderFrame::from_json_compat_str(&json).expect("parse contract");
    let expected = container.frame(10_000.0).expect("frame");
    assert_eq!(restored, expected);

    let bare = expected.to_json_pretty().expect("bare json");
    assert_eq!(RenderFrame::from_json_compat_str(&bare).expect("parse bare"), expected);
}

#[test]
fn json_contract_rejects_unknown_versions_and_unrendered_containers() {
    let frame = RenderFrame::new(Viewport::new(100, 100));
    let json = frame
        .to_json_contract_v1_pretty()
        .expect("contract")
        .replace("\"schema_version\": 1", "\"schema_version\": 2");
    let err = RenderFrame::from_json_compat_str(&json).expect_err("unknown version");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let container = Container::new(NullRenderer::default());
    let err = container
        .frame_json_contract_v1_pretty(0.0)
        .expect_err("nothing rendered");
    assert!(matches!(err, ChartError::InvalidData(_)));
}
