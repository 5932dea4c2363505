use eframe::egui::{Color32, Vec2};

use crate::config::ViewConfig;
use crate::flow::Category;
use crate::util::truncate_label;

use super::session::GraphSession;

pub(in crate::app) const EMPTY_STATE_MESSAGE: &str = "No code flow data available.";

const CATEGORY_COLORS: [Color32; 6] = [
    Color32::from_rgb(0x69, 0xb3, 0xa2),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
];
pub(in crate::app) const SEARCH_MATCH_COLOR: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
// #ff7f0e and #999999 at 0.6 opacity, premultiplied.
const IMPLEMENTS_EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(153, 76, 8, 153);
const DEFAULT_EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(92, 92, 92, 153);

pub(in crate::app) fn node_radius(degree: usize, search_match: bool) -> f32 {
    let base = if search_match { 12.0 } else { 8.0 };
    base + degree.min(10) as f32
}

pub(in crate::app) fn label_offset(degree: usize) -> f32 {
    10.0 + degree.min(10) as f32
}

/// Ordinal colour scale over the categories present in a graph, in
/// first-appearance order.
#[derive(Clone, Debug)]
pub(in crate::app) struct CategoryPalette {
    order: Vec<Category>,
}

impl CategoryPalette {
    pub(in crate::app) fn new(categories: &[Category]) -> Self {
        Self {
            order: categories.to_vec(),
        }
    }

    pub(in crate::app) fn categories(&self) -> &[Category] {
        &self.order
    }

    pub(in crate::app) fn color(&self, category: Category) -> Color32 {
        let slot = self
            .order
            .iter()
            .position(|known| *known == category)
            .unwrap_or(self.order.len());
        CATEGORY_COLORS[slot % CATEGORY_COLORS.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct NodeSprite {
    pub index: usize,
    pub world: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub label_offset: f32,
    pub search_match: bool,
    pub selected: bool,
    pub pinned: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct EdgeSprite {
    pub edge: usize,
    pub source: usize,
    pub target: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub target_radius: f32,
    pub color: Color32,
    pub width: f32,
}

/// Per-frame projection of a [`GraphSession`] into drawable sprites. Labels
/// and palette are fixed for the session; sprite buffers are reused.
pub(in crate::app) struct Frame {
    palette: CategoryPalette,
    labels: Vec<String>,
    radii: Vec<f32>,
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSprite>,
}

impl Frame {
    pub(in crate::app) fn new(session: &GraphSession, view: &ViewConfig) -> Self {
        let graph = session.graph();
        Self {
            palette: CategoryPalette::new(&graph.categories),
            labels: graph
                .nodes
                .iter()
                .map(|node| truncate_label(&node.id, view.label_max_chars))
                .collect(),
            radii: Vec::with_capacity(graph.node_count()),
            nodes: Vec::with_capacity(graph.node_count()),
            edges: Vec::with_capacity(graph.edge_count()),
        }
    }

    pub(in crate::app) fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    pub(in crate::app) fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or_default()
    }

    pub(in crate::app) fn project(&mut self, session: &GraphSession) {
        let graph = session.graph();
        let layout = session.layout();
        let interaction = session.interaction();
        let selected = interaction.selected();

        self.nodes.clear();
        self.edges.clear();
        self.radii.clear();

        for (index, node) in graph.nodes.iter().enumerate() {
            let search_match = interaction.matches_search(node);
            let radius = node_radius(node.degree, search_match);
            self.radii.push(radius);

            if !interaction.node_visible(node) {
                continue;
            }

            self.nodes.push(NodeSprite {
                index,
                world: layout.position(index),
                radius,
                fill: if search_match {
                    SEARCH_MATCH_COLOR
                } else {
                    self.palette.color(node.category)
                },
                label_offset: label_offset(node.degree),
                search_match,
                selected: selected == Some(index),
                pinned: layout.pin(index).is_some(),
            });
        }

        for (edge_index, edge) in graph.edges.iter().enumerate() {
            if !interaction.edge_visible(graph, edge) {
                continue;
            }

            self.edges.push(EdgeSprite {
                edge: edge_index,
                source: edge.source,
                target: edge.target,
                from: layout.position(edge.source),
                to: layout.position(edge.target),
                target_radius: self.radii[edge.target],
                color: if edge.is_implements() {
                    IMPLEMENTS_EDGE_COLOR
                } else {
                    DEFAULT_EDGE_COLOR
                },
                width: 1.0 + graph.nodes[edge.source].degree.min(3) as f32,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::app::session::Command;
    use crate::config::LayoutConfig;
    use crate::flow::build_flow_graph;

    fn session(raw: &str) -> GraphSession {
        GraphSession::new(build_flow_graph(raw).unwrap(), LayoutConfig::default()).unwrap()
    }

    const FLOW: &str = r#"{
        "nodes": ["PaymentClient", "charge", "provider.ResourceKasmSessionCreate"],
        "edges": [
            {"source": "charge", "target": "PaymentClient", "type": "calls"},
            {"source": "provider.ResourceKasmSessionCreate", "target": "PaymentClient", "type": "implements"}
        ]
    }"#;

    #[test]
    fn projects_every_visible_node_and_edge() {
        let session = session(FLOW);
        let mut frame = Frame::new(&session, &ViewConfig::default());
        frame.project(&session);

        assert_eq!(frame.nodes.len(), 3);
        assert_eq!(frame.edges.len(), 2);
        assert_eq!(frame.nodes[0].radius, 10.0);
        assert_eq!(frame.nodes[1].radius, 9.0);
        assert_eq!(frame.nodes[0].label_offset, 12.0);
        assert_eq!(frame.edges[0].width, 2.0);
        assert_eq!(frame.edges[0].target_radius, 10.0);
    }

    #[test]
    fn implements_edges_have_their_own_colour() {
        let session = session(FLOW);
        let mut frame = Frame::new(&session, &ViewConfig::default());
        frame.project(&session);

        assert_eq!(frame.edges[0].color, DEFAULT_EDGE_COLOR);
        assert_eq!(frame.edges[1].color, IMPLEMENTS_EDGE_COLOR);
    }

    #[test]
    fn labels_are_truncated() {
        let session = session(FLOW);
        let frame = Frame::new(&session, &ViewConfig::default());
        assert_eq!(frame.label(0), "PaymentClient");
        assert_eq!(frame.label(2), "provider.ResourceKas...");
    }

    #[test]
    fn search_matches_grow_and_recolour() {
        let mut session = session(FLOW);
        session.dispatch(Command::SetSearch("CHARGE".to_owned()));
        let mut frame = Frame::new(&session, &ViewConfig::default());
        frame.project(&session);

        let charge = frame.nodes.iter().find(|sprite| sprite.index == 1).unwrap();
        assert!(charge.search_match);
        assert_eq!(charge.radius, 13.0);
        assert_eq!(charge.fill, SEARCH_MATCH_COLOR);
        assert!(!frame.nodes[0].search_match);
    }

    #[test]
    fn hidden_category_drops_nodes_and_touching_edges() {
        let mut session = session(FLOW);
        session.dispatch(Command::SetCategory(Category::Client, false));
        let mut frame = Frame::new(&session, &ViewConfig::default());
        frame.project(&session);

        assert_eq!(
            frame.nodes.iter().map(|sprite| sprite.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(frame.edges.is_empty());
    }

    #[test]
    fn selection_and_pins_are_flagged() {
        let mut session = session(FLOW);
        session.dispatch(Command::Select(Some(2)));
        session.dispatch(Command::DragStart(1));
        let mut frame = Frame::new(&session, &ViewConfig::default());
        frame.project(&session);

        assert!(frame.nodes[2].selected);
        assert!(!frame.nodes[0].selected);
        assert!(frame.nodes[1].pinned);
    }

    #[test]
    fn palette_follows_first_appearance() {
        let palette = CategoryPalette::new(&[Category::Api, Category::Function]);
        assert_eq!(palette.color(Category::Api), CATEGORY_COLORS[0]);
        assert_eq!(palette.color(Category::Function), CATEGORY_COLORS[1]);
        assert_eq!(palette.color(Category::Client), CATEGORY_COLORS[2]);
    }

    #[test]
    fn marker_radius_caps_degree() {
        assert_eq!(node_radius(0, false), 8.0);
        assert_eq!(node_radius(25, false), 18.0);
        assert_eq!(node_radius(25, true), 22.0);
        assert_eq!(label_offset(40), 20.0);
    }
}
