use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};
use pension_graph::graph::Position;
use pension_graph::layout::LayoutConfig;

/// Maps layout canvas coordinates onto the screen rect.
///
/// At zoom 1 the whole layout canvas fits the rect, centered.
#[derive(Clone, Copy, Debug)]
pub(super) struct Viewport {
    rect: Rect,
    pan: Vec2,
    scale: f32,
    canvas_center: Vec2,
}

impl Viewport {
    pub(super) fn new(rect: Rect, pan: Vec2, zoom: f32, layout: &LayoutConfig) -> Self {
        let fit = (rect.width() / layout.width).min(rect.height() / layout.height);
        Self {
            rect,
            pan,
            scale: (fit * zoom).max(f32::EPSILON),
            canvas_center: layout.center(),
        }
    }

    pub(super) fn scale(&self) -> f32 {
        self.scale
    }

    pub(super) fn to_screen(&self, position: Position) -> Pos2 {
        self.rect.center() + self.pan + (vec2(position.x, position.y) - self.canvas_center) * self.scale
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn node_radius(size: f32, scale: f32) -> f32 {
    ((6.0 + size * 0.6) * scale.powf(0.6)).clamp(3.0, 48.0)
}

/// Stable, well-spread hue per community id.
pub(super) fn community_color(community: u32) -> Color32 {
    let hue = (community as f32 * 137.508).rem_euclid(360.0);
    hsl(hue, 0.62, 0.56)
}

fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn viewport_fits_canvas_into_rect() {
        let layout = LayoutConfig::default();
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(600.0, 400.0));
        let viewport = Viewport::new(rect, Vec2::ZERO, 1.0, &layout);

        assert_eq!(viewport.scale(), 0.5);
        assert_eq!(viewport.to_screen(Position::new(0.0, 0.0)), Pos2::ZERO);
        assert_eq!(
            Viewport::new(rect, Vec2::ZERO, 1.0, &layout).to_screen(Position::new(600.0, 400.0)),
            rect.center()
        );
    }
}
