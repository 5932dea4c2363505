use std::sync::Arc;

use eframe::egui::{self, RichText, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::flow::FlowGraph;

use super::super::SearchResultsCache;
use super::super::ViewModel;
use super::super::interaction::InteractionState;
use super::super::session::Command;

const SEARCH_RESULT_ROW_HEIGHT: f32 = 20.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Nodes highlighted by the current search, best fuzzy score first. Ties
/// keep input order.
fn rank_search_results(graph: &FlowGraph, interaction: &InteractionState) -> Vec<usize> {
    let matcher = SkimMatcherV2::default();
    let query = interaction.search();

    let mut scored = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| interaction.matches_search(node))
        .map(|(index, node)| {
            let score = fuzzy_match_score(&matcher, &node.id, query).unwrap_or(0);
            (index, score)
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().map(|(index, _)| index).collect()
}

impl ViewModel {
    fn cached_search_results(&mut self) -> Option<Arc<Vec<usize>>> {
        let session = self.session.as_ref()?;
        let query = session.interaction().search();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_results_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.results));
        }

        let results = Arc::new(rank_search_results(session.graph(), session.interaction()));
        self.search_results_cache = Some(SearchResultsCache {
            query: query.to_owned(),
            results: Arc::clone(&results),
        });
        Some(results)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        if self.session.is_none() {
            ui.label("Nothing to filter yet.");
            return;
        }

        let mut commands = Vec::new();

        ui.label("Search")
            .on_hover_text("Highlights nodes whose name contains the text, ignoring case.");
        if ui.text_edit_singleline(&mut self.search).changed() {
            self.dispatch(Command::SetSearch(self.search.clone()));
        }

        if let Some(results) = self.cached_search_results()
            && let Some(session) = self.session.as_ref()
        {
            ui.small(format!("{} matching nodes", results.len()));
            egui::ScrollArea::vertical()
                .id_salt("search_results_scroll")
                .max_height(220.0)
                .auto_shrink([false, true])
                .show_rows(ui, SEARCH_RESULT_ROW_HEIGHT, results.len(), |ui, row_range| {
                    for &index in &results[row_range] {
                        let id = session.graph().nodes[index].id.as_str();
                        if ui.link(id).on_hover_text("Select this node").clicked() {
                            commands.push(Command::Select(Some(index)));
                        }
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Categories").strong());

        if let (Some(session), Some(frame)) = (self.session.as_ref(), self.frame.as_ref()) {
            let palette = frame.palette();
            for &category in palette.categories() {
                let mut enabled = session.interaction().is_enabled(category);
                ui.horizontal(|ui| {
                    let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                    ui.painter()
                        .circle_filled(swatch.center(), 5.5, palette.color(category));
                    if ui.checkbox(&mut enabled, category.label()).changed() {
                        commands.push(Command::SetCategory(category, enabled));
                    }
                });
            }
        }

        if ui.button("Reset filters").clicked() {
            commands.push(Command::ResetFilters);
        }

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        ui.label(self.layout_status());

        if let Some(session) = self.session.as_ref() {
            let pinned_count = session.layout().pinned_count();
            let selected_pinned = session
                .interaction()
                .selected()
                .filter(|&index| session.layout().pin(index).is_some());

            ui.label(format!("Pinned nodes: {pinned_count}"))
                .on_hover_text("Drag a node to pin it. Double-click a pinned node to release it.");
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(selected_pinned.is_some(), egui::Button::new("Unpin selected"))
                    .clicked()
                    && let Some(index) = selected_pinned
                {
                    commands.push(Command::Unpin(index));
                }
                if ui
                    .add_enabled(pinned_count > 0, egui::Button::new("Unpin all"))
                    .clicked()
                {
                    commands.push(Command::UnpinAll);
                }
            });
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
            if ui.button("Clear search and selection").clicked() {
                self.clear_interaction();
            }
        });

        for command in commands {
            self.dispatch(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::flow::build_flow_graph;

    #[test]
    fn search_results_are_exactly_the_highlighted_nodes() {
        let graph = build_flow_graph(
            r#"{"nodes": ["refund_payment", "PaymentClient", "charge", "pay"], "edges": []}"#,
        )
        .unwrap();
        let mut interaction = InteractionState::default();
        interaction.set_search("pay".to_owned());

        let mut ranked = rank_search_results(&graph, &interaction);
        assert_eq!(ranked.len(), 3);
        ranked.sort_unstable();
        assert_eq!(ranked, vec![0, 1, 3]);
    }

    #[test]
    fn empty_search_has_no_results() {
        let graph = build_flow_graph(r#"{"nodes": ["a", "b"], "edges": []}"#).unwrap();
        assert!(rank_search_results(&graph, &InteractionState::default()).is_empty());
    }
}
