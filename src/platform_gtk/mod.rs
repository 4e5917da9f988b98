use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use tracing::warn;

use crate::api::{Chart, Container, RenderPass};
use crate::core::ChartData;
use crate::error::{ChartError, ChartResult};
use crate::interaction::MarkerHooks;
use crate::render::{CairoContextRenderer, CairoRenderer};

/// Host clock shared by renders and frame sampling, in milliseconds.
fn monotonic_ms() -> f64 {
    gtk::glib::monotonic_time() as f64 / 1_000.0
}

/// Embeds a chart into a GTK4 `DrawingArea`.
///
/// Draws sampled frames through Cairo, keeps redrawing from the widget frame
/// clock while transitions run, and forwards pointer motion to the marker
/// hooks.
pub struct GtkChartAdapter {
    chart: Rc<RefCell<Chart>>,
    container: Rc<RefCell<Container<CairoRenderer>>>,
    drawing_area: gtk::DrawingArea,
    animating: Rc<Cell<bool>>,
}

impl GtkChartAdapter {
    pub fn new(chart: Chart) -> ChartResult<Self> {
        let viewport = chart.config().viewport();
        let width = i32::try_from(viewport.width).map_err(|_| ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        })?;
        let height = i32::try_from(viewport.height).map_err(|_| ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        })?;
        let container = Rc::new(RefCell::new(Container::new(CairoRenderer::new(
            width, height,
        )?)));

        let drawing_area = gtk::DrawingArea::new();
        drawing_area.set_content_width(width);
        drawing_area.set_content_height(height);
        drawing_area.set_draw_func({
            let container = Rc::clone(&container);
            move |_widget, context, _width, _height| {
                let mut container = match container.try_borrow_mut() {
                    Ok(container) => container,
                    Err(_) => return,
                };
                let Some(frame) = container.frame(monotonic_ms()) else {
                    return;
                };
                if let Err(err) = container.renderer_mut().render_on_cairo_context(context, &frame)
                {
                    warn!(error = %err, "failed to draw chart frame");
                }
            }
        });

        let motion = gtk::EventControllerMotion::new();
        {
            let container = Rc::clone(&container);
            motion.connect_motion(move |_, x, y| {
                if let Ok(mut container) = container.try_borrow_mut() {
                    container.pointer_move(x, y, monotonic_ms());
                }
            });
        }
        {
            let container = Rc::clone(&container);
            motion.connect_leave(move |_| {
                if let Ok(mut container) = container.try_borrow_mut() {
                    container.pointer_leave();
                }
            });
        }
        drawing_area.add_controller(motion);

        Ok(Self {
            chart: Rc::new(RefCell::new(chart)),
            container,
            drawing_area,
            animating: Rc::new(Cell::new(false)),
        })
    }

    #[must_use]
    pub fn drawing_area(&self) -> &gtk::DrawingArea {
        &self.drawing_area
    }

    #[must_use]
    pub fn chart(&self) -> Rc<RefCell<Chart>> {
        Rc::clone(&self.chart)
    }

    pub fn set_marker_hooks(&self, hooks: Box<dyn MarkerHooks>) {
        self.container.borrow_mut().set_marker_hooks(hooks);
    }

    /// Renders `data` now and redraws on every frame until the transitions
    /// settle.
    pub fn render(&self, data: &ChartData) -> ChartResult<RenderPass> {
        let pass = {
            let mut chart = self.chart.borrow_mut();
            let mut container = self.container.borrow_mut();
            chart.render(&mut *container, data, monotonic_ms())?
        };
        self.drawing_area.queue_draw();

        if !self.animating.replace(true) {
            let container = Rc::clone(&self.container);
            let animating = Rc::clone(&self.animating);
            self.drawing_area.add_tick_callback(move |widget, _clock| {
                widget.queue_draw();
                let settled = container
                    .try_borrow()
                    .ok()
                    .and_then(|container| container.settled_at())
                    .is_none_or(|settles_at| monotonic_ms() >= settles_at);
                if settled {
                    animating.set(false);
                    gtk::glib::ControlFlow::Break
                } else {
                    gtk::glib::ControlFlow::Continue
                }
            });
        }
        Ok(pass)
    }
}
