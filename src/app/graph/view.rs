use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use super::super::render_utils::{
    arrow_geometry, blend_color, circle_visible, draw_background, edge_visible, world_to_screen,
};
use super::super::surface::EMPTY_STATE_MESSAGE;
use super::super::{PointerDrag, ViewModel};

const LABEL_COLOR: Color32 = Color32::from_gray(60);
const MATCH_LABEL_COLOR: Color32 = Color32::from_gray(10);
const PIN_RING_COLOR: Color32 = Color32::from_rgb(96, 96, 96);
const SELECTED_RING_COLOR: Color32 = Color32::from_rgb(245, 166, 35);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        if self.session.is_none() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                EMPTY_STATE_MESSAGE,
                FontId::proportional(16.0),
                Color32::from_gray(90),
            );
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);

        // Hit testing runs against the previous projection, which is what the
        // user clicked on.
        self.update_screen_space(rect);
        let pressed_on = self.hovered_index(ui, rect);
        self.handle_node_drag(ui, rect, &response, pressed_on);
        self.handle_graph_pan(&response);
        self.handle_graph_clicks(&response, pressed_on);

        let layout_running = match (self.session.as_mut(), self.frame.as_mut()) {
            (Some(session), Some(frame)) => {
                let running = session.tick();
                frame.project(session);
                running
            }
            _ => return,
        };

        if layout_running || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.update_screen_space(rect);
        let hovered = self.hovered_index(ui, rect);

        match (hovered, self.pointer_drag) {
            (_, Some(PointerDrag::Node(_))) => {
                ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
            }
            (Some(_), _) => {
                ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
            }
            _ => {}
        }

        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let pan = self.pan;
        let zoom = self.zoom;

        for edge in &frame.edges {
            let start = world_to_screen(rect, pan, zoom, edge.from);
            let end = world_to_screen(rect, pan, zoom, edge.to);
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            let stroke = Stroke::new((edge.width * zoom).max(0.5), edge.color);
            let target_radius = (edge.target_radius * zoom).max(2.0);
            match arrow_geometry(start, end, target_radius, zoom.clamp(0.3, 2.5)) {
                Some((line_end, corners)) => {
                    painter.line_segment([start, line_end], stroke);
                    painter.add(Shape::convex_polygon(
                        corners.to_vec(),
                        edge.color,
                        Stroke::NONE,
                    ));
                }
                None => {
                    painter.line_segment([start, end], stroke);
                }
            }
        }

        let label_size = (11.0 * zoom).clamp(6.0, 24.0);
        for (sprite, (&position, &radius)) in frame.nodes.iter().zip(
            self.screen_scratch
                .positions
                .iter()
                .zip(&self.screen_scratch.radii),
        ) {
            let label_anchor = position + vec2(sprite.label_offset * zoom, 0.0);
            if !circle_visible(rect, position, radius + 6.0) && !rect.contains(label_anchor) {
                continue;
            }

            let fill = if hovered == Some(sprite.index) {
                blend_color(sprite.fill, Color32::WHITE, 0.3)
            } else {
                sprite.fill
            };

            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(position, radius, Stroke::new(1.5, Color32::WHITE));
            if sprite.pinned {
                painter.circle_stroke(position, radius + 3.0, Stroke::new(1.2, PIN_RING_COLOR));
            }
            if sprite.selected {
                painter.circle_stroke(
                    position,
                    radius + 5.5,
                    Stroke::new(2.5, SELECTED_RING_COLOR),
                );
            }

            let (font, color) = if sprite.search_match {
                (FontId::proportional(label_size * 1.2), MATCH_LABEL_COLOR)
            } else {
                (FontId::proportional(label_size), LABEL_COLOR)
            };
            painter.text(
                label_anchor,
                Align2::LEFT_CENTER,
                frame.label(sprite.index),
                font,
                color,
            );
        }

        if let Some(index) = hovered
            && let Some(session) = self.session.as_ref()
            && let Some(node) = session.graph().nodes.get(index)
        {
            let pinned = if session.layout().pin(index).is_some() {
                "  |  pinned (double-click to release)"
            } else {
                ""
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {} connections{pinned}",
                    node.id,
                    node.category.label(),
                    node.degree
                ),
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }
    }
}
