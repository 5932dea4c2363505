use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.0;

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

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 250));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 205, 212, 90));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let a_min_x = a1.x.min(a2.x);
    let a_max_x = a1.x.max(a2.x);
    let a_min_y = a1.y.min(a2.y);
    let a_max_y = a1.y.max(a2.y);
    let b_min_x = b1.x.min(b2.x);
    let b_max_x = b1.x.max(b2.x);
    let b_min_y = b1.y.min(b2.y);
    let b_max_y = b1.y.max(b2.y);

    if a_max_x < b_min_x || b_max_x < a_min_x || a_max_y < b_min_y || b_max_y < a_min_y {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Where an edge line should stop and the three corners of its arrowhead,
/// with the tip resting on the target marker's boundary. `None` when the
/// endpoints overlap too much to show a direction.
pub(super) fn arrow_geometry(
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    scale: f32,
) -> Option<(Pos2, [Pos2; 3])> {
    let delta = end - start;
    let length = delta.length();
    let arrow_length = ARROW_LENGTH * scale;
    if length <= target_radius + arrow_length {
        return None;
    }

    let direction = delta / length;
    let normal = Vec2::new(-direction.y, direction.x);
    let tip = end - direction * target_radius;
    let base = tip - direction * arrow_length;
    let half_width = ARROW_HALF_WIDTH * scale;

    Some((base, [tip, base + normal * half_width, base - normal * half_width]))
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn screen_and_world_coordinates_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(35.0, -12.0);
        let world = vec2(-140.0, 88.0);

        let screen = world_to_screen(rect, pan, 2.5, world);
        let back = screen_to_world(rect, pan, 2.5, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn arrow_tip_sits_on_the_target_boundary() {
        let (line_end, [tip, left, right]) =
            arrow_geometry(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0, 1.0).unwrap();

        assert_eq!(tip, pos2(90.0, 0.0));
        assert_eq!(line_end, pos2(81.0, 0.0));
        assert_eq!(left, pos2(81.0, 4.0));
        assert_eq!(right, pos2(81.0, -4.0));
    }

    #[test]
    fn overlapping_endpoints_have_no_arrow() {
        assert!(arrow_geometry(pos2(0.0, 0.0), pos2(12.0, 0.0), 10.0, 1.0).is_none());
        assert!(arrow_geometry(pos2(5.0, 5.0), pos2(5.0, 5.0), 0.0, 1.0).is_none());
    }

    #[test]
    fn offscreen_segments_crossing_the_view_are_visible() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 150.0), 0.0));
        assert!(circle_visible(rect, pos2(-5.0, 50.0), 8.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 8.0));
    }
}
