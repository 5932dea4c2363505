use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_utils::{circle_visible, screen_to_world, world_to_screen};
use super::super::session::Command;
use super::super::surface::Frame;
use super::super::{PointerDrag, ScreenScratch, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let view = self.settings.view;
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(view.min_zoom, view.max_zoom);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let canvas_drag = self.pointer_drag == Some(PointerDrag::Canvas)
            && response.dragged_by(egui::PointerButton::Primary);
        if canvas_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Turns primary-button drags into layout commands. A drag that starts
    /// on a node moves and pins that node; anything else pans the canvas.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if response.drag_started_by(egui::PointerButton::Primary) {
            let pressed_at = ui.input(|input| input.pointer.press_origin());
            let grabbed = pressed_at
                .and_then(|origin| {
                    self.frame
                        .as_ref()
                        .and_then(|frame| node_at(frame, &self.screen_scratch, rect, origin))
                })
                .or(hovered);

            self.pointer_drag = Some(match grabbed {
                Some(index) => {
                    session.dispatch(Command::DragStart(index));
                    PointerDrag::Node(index)
                }
                None => PointerDrag::Canvas,
            });
        }

        if let Some(PointerDrag::Node(index)) = self.pointer_drag {
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
            {
                let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                session.dispatch(Command::DragTo(index, world));
            }

            if response.drag_stopped() {
                session.dispatch(Command::DragEnd(index));
                self.pointer_drag = None;
            }
        } else if self.pointer_drag == Some(PointerDrag::Canvas) && response.drag_stopped() {
            self.pointer_drag = None;
        }
    }

    /// Primary click selects the node under the pointer or clears the
    /// selection on empty canvas. Double-clicking a pinned node releases it.
    pub(in crate::app) fn handle_graph_clicks(
        &mut self,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if response.double_clicked_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
            && session.layout().pin(index).is_some()
        {
            session.dispatch(Command::Unpin(index));
            return;
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            session.dispatch(Command::Select(hovered));
        }
    }

    pub(in crate::app) fn update_screen_space(&mut self, rect: Rect) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        project_to_screen(frame, &mut self.screen_scratch, rect, self.pan, self.zoom);
    }

    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let frame = self.frame.as_ref()?;
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        node_at(frame, &self.screen_scratch, rect, pointer)
    }
}

fn project_to_screen(frame: &Frame, scratch: &mut ScreenScratch, rect: Rect, pan: egui::Vec2, zoom: f32) {
    scratch.positions.clear();
    scratch.radii.clear();
    for sprite in &frame.nodes {
        scratch
            .positions
            .push(world_to_screen(rect, pan, zoom, sprite.world));
        scratch.radii.push((sprite.radius * zoom).max(2.0));
    }
}

/// Topmost visible node whose marker contains `pointer`. Later sprites are
/// painted over earlier ones, so ties go to the closest centre.
fn node_at(frame: &Frame, scratch: &ScreenScratch, rect: Rect, pointer: Pos2) -> Option<usize> {
    frame
        .nodes
        .iter()
        .zip(scratch.positions.iter().zip(&scratch.radii))
        .filter(|(_, (position, radius))| circle_visible(rect, **position, **radius))
        .filter_map(|(sprite, (position, radius))| {
            let distance = position.distance(pointer);
            (distance <= *radius).then_some((sprite.index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
