#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use scatter_pack::core::{ChartData, CurvePoint, CurveSeries, DataPoint};
use scatter_pack::render::{CairoContextRenderer, CairoRenderer, Color};
use scatter_pack::{Chart, ChartError, Container};

fn data() -> ChartData {
    ChartData::new()
        .with_scatter(vec![
            DataPoint::new("a", 10.0, 100.0),
            DataPoint::new("b", 20.0, 200.0),
            DataPoint::new("c", 30.0, 300.0),
        ])
        .with_lines(vec![CurveSeries::new(
            "steelblue",
            vec![CurvePoint::new(10.0, 100.0), CurvePoint::new(30.0, 300.0)],
        )])
}

#[test]
fn cairo_renderer_rejects_invalid_surface_size() {
    let err = CairoRenderer::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn cairo_renderer_draws_markers_curves_and_axes() {
    let renderer = CairoRenderer::new(500, 500).expect("renderer");
    let mut chart = Chart::default();
    let mut container = Container::new(renderer);
    chart.render(&mut container, &data(), 0.0).expect("render");

    assert!(container.present(10_000.0).expect("present"));
    let stats = container.renderer().last_stats();
    assert_eq!(stats.circles_drawn, 3);
    assert_eq!(stats.paths_drawn, 1);
    // Two domain lines plus 13 x ticks and 11 y ticks.
    assert_eq!(stats.lines_drawn, 26);
    // Tick labels plus both titles.
    assert_eq!(stats.texts_drawn, 26);
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let mut renderer = CairoRenderer::new(500, 500).expect("renderer");
    renderer
        .set_clear_color(Color::rgb(0.95, 0.95, 0.95))
        .expect("clear color");
    let mut chart = Chart::default();
    let mut container = Container::new(renderer);
    chart.render(&mut container, &data(), 0.0).expect("render");
    let frame = container.frame(10_000.0).expect("frame");

    let surface = ImageSurface::create(Format::ARgb32, 500, 500).expect("surface");
    let context = Context::new(&surface).expect("context");
    container
        .renderer_mut()
        .render_on_cairo_context(&context, &frame)
        .expect("render on context");

    assert_eq!(container.renderer().last_stats().circles_drawn, 3);
}
