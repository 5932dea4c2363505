use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::flow::{Category, FlowGraph};

use super::interaction::InteractionState;
use super::layout::LayoutEngine;

/// User input, already resolved to node indices and world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum Command {
    SetSearch(String),
    SetCategory(Category, bool),
    ResetFilters,
    Select(Option<usize>),
    DragStart(usize),
    DragTo(usize, Vec2),
    DragEnd(usize),
    Unpin(usize),
    UnpinAll,
}

/// The single live graph: model, layout and interaction state. Only built for
/// non-empty graphs, so an empty payload never starts a simulation.
pub(in crate::app) struct GraphSession {
    graph: FlowGraph,
    layout: LayoutEngine,
    interaction: InteractionState,
}

impl GraphSession {
    pub(in crate::app) fn new(graph: FlowGraph, config: LayoutConfig) -> Option<Self> {
        if graph.is_empty() {
            log::info!("code flow graph is empty; layout not started");
            return None;
        }

        let layout = LayoutEngine::new(&graph, config);
        Some(Self {
            graph,
            layout,
            interaction: InteractionState::default(),
        })
    }

    pub(in crate::app) fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub(in crate::app) fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub(in crate::app) fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub(in crate::app) fn dispatch(&mut self, command: Command) {
        log::trace!("dispatch {command:?}");
        match command {
            Command::SetSearch(term) => self.interaction.set_search(term),
            Command::SetCategory(category, enabled) => {
                log::debug!(
                    "{} category {}",
                    if enabled { "showing" } else { "hiding" },
                    category.label()
                );
                self.interaction.set_category(category, enabled);
            }
            Command::ResetFilters => self.interaction.reset_filters(),
            Command::Select(index) => self.interaction.select(&self.graph, index),
            Command::DragStart(index) => self.layout.drag_start(index),
            Command::DragTo(index, position) => self.layout.drag_to(index, position),
            Command::DragEnd(index) => self.layout.drag_end(index),
            Command::Unpin(index) => self.layout.unpin(index),
            Command::UnpinAll => self.layout.unpin_all(),
        }
    }

    pub(in crate::app) fn tick(&mut self) -> bool {
        self.layout.tick()
    }

    pub(in crate::app) fn clear_search_and_selection(&mut self) {
        self.interaction.clear_search_and_selection();
    }

    /// Cancels the layout before the session is dropped or replaced.
    pub(in crate::app) fn teardown(&mut self) {
        self.layout.stop();
    }

    pub(in crate::app) fn visible_counts(&self) -> (usize, usize) {
        let nodes = self
            .graph
            .nodes
            .iter()
            .filter(|node| self.interaction.node_visible(node))
            .count();
        let edges = self
            .graph
            .edges
            .iter()
            .filter(|edge| self.interaction.edge_visible(&self.graph, edge))
            .count();
        (nodes, edges)
    }
}
