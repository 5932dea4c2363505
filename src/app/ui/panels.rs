use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::config::Settings;
use crate::flow::FlowGraph;

use super::super::session::{Command, GraphSession};
use super::super::surface::Frame;
use super::super::{ScreenScratch, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(graph: FlowGraph, source_label: String, settings: Settings) -> Self {
        let session = GraphSession::new(graph, settings.layout);
        let frame = session
            .as_ref()
            .map(|session| Frame::new(session, &settings.view));

        Self {
            source_label,
            settings,
            session,
            frame,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            pointer_drag: None,
            search_results_cache: None,
            screen_scratch: ScreenScratch::default(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("code-flow-lens");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    if let Some(session) = &self.session {
                        let (visible_nodes, visible_edges) = session.visible_counts();
                        let graph = session.graph();
                        ui.label(format!("nodes: {visible_nodes}/{}", graph.node_count()));
                        ui.label(format!("edges: {visible_edges}/{}", graph.edge_count()));
                        if graph.dropped_edges > 0 {
                            ui.label(format!("dropped edges: {}", graph.dropped_edges))
                                .on_hover_text("Edges whose source or target is not a known node.");
                        }
                    }
                    if ui
                        .button("Reload")
                        .on_hover_text("Fetch the graph again. The current layout is discarded.")
                        .clicked()
                    {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(session) = &self.session {
                            ui.label(format!("pinned: {}", session.layout().pinned_count()));
                        }
                        ui.label(self.layout_status());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn dispatch(&mut self, command: Command) {
        if let Some(session) = self.session.as_mut() {
            session.dispatch(command);
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub(in crate::app) fn clear_interaction(&mut self) {
        self.search.clear();
        self.search_results_cache = None;
        if let Some(session) = self.session.as_mut() {
            session.clear_search_and_selection();
        }
    }

    pub(in crate::app) fn layout_status(&self) -> String {
        match &self.session {
            None => "layout: idle".to_owned(),
            Some(session) if session.layout().is_running() => {
                format!("layout: running (alpha {:.3})", session.layout().alpha())
            }
            Some(session) => format!("layout: settled after {} ticks", session.layout().ticks()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::build_flow_graph;

    #[test]
    fn empty_graph_gets_no_session_or_frame() {
        let graph = build_flow_graph(r#"{"nodes": [], "edges": []}"#).unwrap();
        let model = ViewModel::new(graph, "test".to_owned(), Settings::default());

        assert!(model.session.is_none());
        assert!(model.frame.is_none());
        assert_eq!(model.layout_status(), "layout: idle");
    }

    #[test]
    fn non_empty_graph_starts_a_session() {
        let graph = build_flow_graph(r#"{"nodes": ["a"], "edges": []}"#).unwrap();
        let model = ViewModel::new(graph, "test".to_owned(), Settings::default());

        assert!(model.session.is_some());
        assert!(model.frame.is_some());
        assert!(model.layout_status().starts_with("layout: running"));
    }

    #[test]
    fn clearing_interaction_keeps_category_filters() {
        let graph = build_flow_graph(r#"{"nodes": ["a", "b"], "edges": []}"#).unwrap();
        let mut model = ViewModel::new(graph, "test".to_owned(), Settings::default());
        model.search = "a".to_owned();
        model.dispatch(Command::SetSearch("a".to_owned()));
        model.dispatch(Command::SetCategory(crate::flow::Category::Function, false));

        model.clear_interaction();
        let session = model.session.as_ref().unwrap();
        assert!(model.search.is_empty());
        assert_eq!(session.interaction().search(), "");
        assert!(!session.interaction().is_enabled(crate::flow::Category::Function));
    }
}
