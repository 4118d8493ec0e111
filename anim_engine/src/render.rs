//! Drawing seam.
//!
//! The kernel never rasterizes anything. Objects describe themselves as
//! primitive calls against a `Surface` supplied by the host.

use crate::object::{AnimatedObject, Edge, Shape};
use crate::world::World;

/// Primitive drawing operations a host renderer provides.
pub trait Surface {
    fn rect(
        &mut self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        fill: &str,
        stroke: &str,
        alpha: f64,
    );
    fn circle(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        fill: Option<&str>,
        stroke: &str,
        alpha: f64,
    );
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64, alpha: f64);
    fn text(&mut self, x: f64, y: f64, text: &str, color: &str, centered: bool, alpha: f64);
    /// Arrow head at `tip`, pointing away from `from`.
    fn arrow_head(&mut self, from: (f64, f64), tip: (f64, f64), color: &str, alpha: f64);
}

const HIGHLIGHT_COLOR: &str = "#FF0000";
const NORMAL_STROKE: f64 = 1.0;
const HIGHLIGHT_STROKE: f64 = 3.0;

impl AnimatedObject {
    /// Issue the primitive calls for this object.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let stroke = if self.highlighted {
            HIGHLIGHT_COLOR
        } else {
            self.foreground.as_str()
        };
        match &self.shape {
            Shape::Rectangle {
                label,
                label_color,
                null_marker,
                ..
            } => {
                surface.rect(
                    self.left(),
                    self.top(),
                    self.width(),
                    self.height(),
                    &self.background,
                    stroke,
                    self.alpha,
                );
                if *null_marker {
                    surface.line(
                        (self.left(), self.bottom()),
                        (self.right(), self.top()),
                        &self.foreground,
                        NORMAL_STROKE,
                        self.alpha,
                    );
                }
                surface.text(self.x, self.y, label, label_color, true, self.alpha);
            }
            Shape::SkipList {
                label, label_color, ..
            } => {
                surface.rect(
                    self.left(),
                    self.top(),
                    self.width(),
                    self.height(),
                    &self.background,
                    stroke,
                    self.alpha,
                );
                surface.text(self.x, self.y, label, label_color, true, self.alpha);
            }
            Shape::Circle { radius, label } => {
                surface.circle(self.x, self.y, *radius, Some(&self.background), stroke, self.alpha);
                surface.text(self.x, self.y, label, &self.foreground, true, self.alpha);
            }
            Shape::Label { text, centered } => {
                let color = if self.highlighted {
                    HIGHLIGHT_COLOR
                } else {
                    self.foreground.as_str()
                };
                surface.text(self.x, self.y, text, color, *centered, self.alpha);
            }
            Shape::HighlightCircle { radius } => {
                surface.circle(self.x, self.y, *radius, None, &self.foreground, self.alpha);
            }
            Shape::LinkedList {
                labels,
                label_colors,
                link_percent,
                vertical,
                link_at_end,
                null_pointer,
                ..
            } => self.draw_linked_list(
                surface,
                stroke,
                labels,
                label_colors,
                *link_percent,
                *vertical,
                *link_at_end,
                *null_pointer,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_linked_list(
        &self,
        surface: &mut dyn Surface,
        stroke: &str,
        labels: &[String],
        label_colors: &[String],
        link_percent: f64,
        vertical: bool,
        link_at_end: bool,
        null_pointer: bool,
    ) {
        let (w, h) = (self.width(), self.height());
        surface.rect(self.left(), self.top(), w, h, &self.background, stroke, self.alpha);

        // Value slots share what the link section leaves over.
        let n = labels.len().max(1) as f64;
        let (link_w, link_h) = if vertical {
            (w, h * link_percent)
        } else {
            (w * link_percent, h)
        };
        let (link_left, link_top, body_left, body_top) = match (vertical, link_at_end) {
            (false, true) => (self.right() - link_w, self.top(), self.left(), self.top()),
            (false, false) => (self.left(), self.top(), self.left() + link_w, self.top()),
            (true, true) => (self.left(), self.bottom() - link_h, self.left(), self.top()),
            (true, false) => (self.left(), self.top(), self.left(), self.top() + link_h),
        };
        surface.rect(link_left, link_top, link_w, link_h, &self.background, stroke, self.alpha);

        for (i, (label, color)) in labels.iter().zip(label_colors).enumerate() {
            let i = i as f64;
            let (cx, cy) = if vertical {
                let slot = (h - link_h) / n;
                (self.x, body_top + slot * (i + 0.5))
            } else {
                let slot = (w - link_w) / n;
                (body_left + slot * (i + 0.5), self.y)
            };
            surface.text(cx, cy, label, color, true, self.alpha);
        }

        if null_pointer {
            surface.line(
                (link_left, link_top + link_h),
                (link_left + link_w, link_top),
                &self.foreground,
                NORMAL_STROKE,
                self.alpha,
            );
        }
    }
}

/// Draw one edge between two placed objects.
pub fn draw_edge(
    surface: &mut dyn Surface,
    from: &AnimatedObject,
    to: &AnimatedObject,
    edge: &Edge,
) {
    let start = from.tail_attach_point((to.x, to.y), edge.anchor);
    let end = to.head_attach_point(start);
    let (color, width) = if edge.highlighted {
        (HIGHLIGHT_COLOR, HIGHLIGHT_STROKE)
    } else {
        (edge.color.as_str(), NORMAL_STROKE)
    };
    surface.line(start, end, color, width, edge.alpha);
    if edge.directed {
        surface.arrow_head(start, end, color, edge.alpha);
    }
    if !edge.label.is_empty() {
        let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
        surface.text(mid.0, mid.1, &edge.label, color, true, edge.alpha);
    }
}

impl World {
    /// Draw edges first, then objects by ascending layer (id breaks ties).
    pub fn draw(&self, surface: &mut dyn Surface) {
        for (from, to, edge) in self.edges() {
            if let (Some(a), Some(b)) = (self.object(from), self.object(to)) {
                draw_edge(surface, a, b, edge);
            }
        }
        let mut ordered: Vec<&AnimatedObject> = self.objects().collect();
        ordered.sort_by_key(|o| o.layer);
        for obj in ordered {
            obj.draw(surface);
        }
    }
}
