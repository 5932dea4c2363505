use eframe::egui::{self, Color32, RichText, Sense, Ui, vec2};

use super::super::ViewModel;
use super::super::interaction::Connection;
use super::super::session::Command;
use super::super::surface::EMPTY_STATE_MESSAGE;

const RELATION_BADGE_FILL: Color32 = Color32::from_gray(228);
const IMPLEMENTS_BADGE_FILL: Color32 = Color32::from_rgb(255, 224, 196);

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(session) = self.session.as_ref() else {
            ui.label(EMPTY_STATE_MESSAGE);
            return;
        };

        let Some(details) = session.interaction().details(session.graph()) else {
            ui.label("Select a node in the graph or the search results.");
            return;
        };

        ui.label(RichText::new(details.id.as_str()).strong().size(16.0));
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            if let Some(frame) = self.frame.as_ref() {
                let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter().circle_filled(
                    swatch.center(),
                    5.5,
                    frame.palette().color(details.category),
                );
            }
            ui.label(format!("Category: {}", details.category.label()));
        });
        ui.label(format!("Connections: {}", details.degree));

        if !session.interaction().is_enabled(details.category) {
            ui.small("Hidden by the current category filters.");
        }
        if let Some(index) = session.interaction().selected()
            && let Some(pin) = session.layout().pin(index)
        {
            ui.small(format!("Pinned at ({:.0}, {:.0})", pin.x, pin.y));
        }

        let mut pending_selection = None;

        ui.separator();
        connection_list(
            ui,
            "Incoming Connections",
            &details.incoming,
            &mut pending_selection,
        );
        ui.separator();
        connection_list(
            ui,
            "Outgoing Connections",
            &details.outgoing,
            &mut pending_selection,
        );

        if let Some(index) = pending_selection {
            self.dispatch(Command::Select(Some(index)));
        }
    }
}

fn connection_list(
    ui: &mut Ui,
    title: &str,
    connections: &[Connection],
    pending_selection: &mut Option<usize>,
) {
    ui.label(RichText::new(format!("{title} ({})", connections.len())).strong());
    if connections.is_empty() {
        ui.label("None");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt(title)
        .max_height(260.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for connection in connections {
                ui.horizontal(|ui| {
                    let fill = if connection.relation == "implements" {
                        IMPLEMENTS_BADGE_FILL
                    } else {
                        RELATION_BADGE_FILL
                    };
                    ui.label(
                        RichText::new(connection.relation.as_str())
                            .small()
                            .background_color(fill)
                            .color(Color32::from_gray(40)),
                    );
                    if ui
                        .link(connection.peer.as_str())
                        .on_hover_text("Select this node")
                        .clicked()
                    {
                        *pending_selection = Some(connection.peer_index);
                    }
                });
            }
        });
}
