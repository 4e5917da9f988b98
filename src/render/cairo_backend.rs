use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use std::f64::consts::TAU;

use crate::error::{ChartError, ChartResult};
use crate::render::{CirclePrimitive, Color, PathPrimitive, RenderFrame, Renderer, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub circles_drawn: usize,
    pub paths_drawn: usize,
    pub lines_drawn: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// This renderer supports two modes:
/// - offscreen image-surface rendering through `Renderer::render`
/// - in-place rendering on an external Cairo context through
///   `CairoContextRenderer`
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color, 1.0);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();

        context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        if let Some(clip) = frame.plot_clip {
            context.rectangle(clip.x, clip.y, clip.width, clip.height);
            context.clip();
        }
        for circle in &frame.circles {
            draw_circle(context, *circle)?;
            stats.circles_drawn += 1;
        }
        for path in &frame.paths {
            if draw_path(context, path)? {
                stats.paths_drawn += 1;
            }
        }
        context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))?;

        for line in &frame.lines {
            apply_color(context, line.color, 1.0);
            context.set_line_width(line.stroke_width);
            context.move_to(line.x1, line.y1);
            context.line_to(line.x2, line.y2);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke line", err))?;
            stats.lines_drawn += 1;
        }

        for text in &frame.texts {
            let layout = pangocairo::functions::create_layout(context);
            let font_description =
                FontDescription::from_string(&format!("Sans {}", text.font_size_px));
            layout.set_font_description(Some(&font_description));
            layout.set_text(&text.text);

            let (text_width, _text_height) = layout.pixel_size();
            let offset = match text.h_align {
                TextHAlign::Left => 0.0,
                TextHAlign::Center => -f64::from(text_width) / 2.0,
                TextHAlign::Right => -f64::from(text_width),
            };

            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            context.translate(text.x, text.y);
            context.rotate(text.rotation_deg.to_radians());
            apply_color(context, text.color, 1.0);
            context.move_to(offset, 0.0);
            pangocairo::functions::show_layout(context, &layout);
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
            stats.texts_drawn += 1;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn draw_circle(context: &Context, circle: CirclePrimitive) -> ChartResult<()> {
    if circle.r <= 0.0 {
        return Ok(());
    }
    context.new_path();
    context.arc(circle.cx, circle.cy, circle.r, 0.0, TAU);
    if circle.fill.is_visible() {
        apply_color(context, circle.fill, circle.opacity);
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill circle", err))?;
    }
    if circle.stroke.is_visible() && circle.stroke_width > 0.0 {
        apply_color(context, circle.stroke, circle.opacity);
        context.set_line_width(circle.stroke_width);
        context
            .stroke_preserve()
            .map_err(|err| map_backend_error("failed to stroke circle", err))?;
    }
    context.new_path();
    Ok(())
}

/// Strokes the revealed prefix of `path`. Returns `false` when nothing is drawn.
fn draw_path(context: &Context, path: &PathPrimitive) -> ChartResult<bool> {
    let Some(&(start_x, start_y)) = path.points.first() else {
        return Ok(false);
    };
    let mut remaining = path.length() * path.reveal;
    if remaining <= 0.0 {
        return Ok(false);
    }

    context.new_path();
    context.move_to(start_x, start_y);
    for pair in path.points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let segment = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        if segment >= remaining && segment > 0.0 {
            let t = remaining / segment;
            context.line_to(x1 + (x2 - x1) * t, y1 + (y2 - y1) * t);
            break;
        }
        context.line_to(x2, y2);
        remaining -= segment;
    }

    apply_color(context, path.stroke, 1.0);
    context.set_line_width(path.stroke_width);
    context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke path", err))?;
    Ok(true)
}

fn apply_color(context: &Context, color: Color, opacity: f64) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha * opacity);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
