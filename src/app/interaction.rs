use std::collections::BTreeSet;

use crate::flow::{Category, Edge, FlowGraph, Node};

/// One row of the detail panel: the relation label and the node on the other
/// end of the edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct Connection {
    pub relation: String,
    pub peer: String,
    pub peer_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct NodeDetails {
    pub id: String,
    pub category: Category,
    pub degree: usize,
    pub incoming: Vec<Connection>,
    pub outgoing: Vec<Connection>,
}

/// Search term, category filters and selection. Everything derived from it
/// is a pure function of this state and the graph; nothing here touches
/// node positions.
#[derive(Clone, Debug)]
pub(in crate::app) struct InteractionState {
    search: String,
    search_lower: String,
    enabled: BTreeSet<Category>,
    selected: Option<usize>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            search: String::new(),
            search_lower: String::new(),
            enabled: Category::ALL.into_iter().collect(),
            selected: None,
        }
    }
}

impl InteractionState {
    pub(in crate::app) fn search(&self) -> &str {
        &self.search
    }

    pub(in crate::app) fn set_search(&mut self, term: String) {
        self.search_lower = term.to_lowercase();
        self.search = term;
    }

    pub(in crate::app) fn matches_search(&self, node: &Node) -> bool {
        !self.search_lower.is_empty() && node.id.to_lowercase().contains(&self.search_lower)
    }

    pub(in crate::app) fn is_enabled(&self, category: Category) -> bool {
        self.enabled.contains(&category)
    }

    pub(in crate::app) fn set_category(&mut self, category: Category, enabled: bool) {
        if enabled {
            self.enabled.insert(category);
        } else {
            self.enabled.remove(&category);
        }
    }

    pub(in crate::app) fn reset_filters(&mut self) {
        self.enabled = Category::ALL.into_iter().collect();
    }

    pub(in crate::app) fn node_visible(&self, node: &Node) -> bool {
        self.is_enabled(node.category)
    }

    pub(in crate::app) fn edge_visible(&self, graph: &FlowGraph, edge: &Edge) -> bool {
        self.node_visible(&graph.nodes[edge.source]) && self.node_visible(&graph.nodes[edge.target])
    }

    pub(in crate::app) fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Replaces the current selection. Out-of-range indices clear it.
    pub(in crate::app) fn select(&mut self, graph: &FlowGraph, index: Option<usize>) {
        self.selected = index.filter(|&index| index < graph.node_count());
    }

    /// Drops the search term and the selection. Category filters stay.
    pub(in crate::app) fn clear_search_and_selection(&mut self) {
        self.search.clear();
        self.search_lower.clear();
        self.selected = None;
    }

    pub(in crate::app) fn details(&self, graph: &FlowGraph) -> Option<NodeDetails> {
        let index = self.selected?;
        let node = graph.nodes.get(index)?;

        let connection = |edge_index: usize, peer_of: fn(&Edge) -> usize| {
            let edge = &graph.edges[edge_index];
            let peer_index = peer_of(edge);
            Connection {
                relation: edge.relation.clone(),
                peer: graph.nodes[peer_index].id.clone(),
                peer_index,
            }
        };

        Some(NodeDetails {
            id: node.id.clone(),
            category: node.category,
            degree: node.degree,
            incoming: graph.incoming[index]
                .iter()
                .map(|&edge_index| connection(edge_index, |edge| edge.source))
                .collect(),
            outgoing: graph.outgoing[index]
                .iter()
                .map(|&edge_index| connection(edge_index, |edge| edge.target))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::flow::RawEdge;

    fn sample_graph() -> FlowGraph {
        let ids = ["PaymentClient", "charge", "UserAPIHandler", "refund"]
            .map(str::to_owned)
            .to_vec();
        FlowGraph::build(
            &ids,
            &[
                RawEdge::new("charge", "PaymentClient", "calls"),
                RawEdge::new("UserAPIHandler", "charge", "calls"),
                RawEdge::new("refund", "PaymentClient", "calls"),
                RawEdge::new("PaymentClient", "refund", "implements"),
            ],
        )
    }

    fn visible_sets(state: &InteractionState, graph: &FlowGraph) -> (Vec<usize>, Vec<usize>) {
        let nodes = (0..graph.node_count())
            .filter(|&index| state.node_visible(&graph.nodes[index]))
            .collect();
        let edges = graph
            .edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| state.edge_visible(graph, edge))
            .map(|(index, _)| index)
            .collect();
        (nodes, edges)
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        assert!(!state.matches_search(&graph.nodes[0]));

        state.set_search("paymentc".to_owned());
        assert!(state.matches_search(&graph.nodes[0]));
        assert!(!state.matches_search(&graph.nodes[1]));

        state.set_search("API".to_owned());
        assert!(state.matches_search(&graph.nodes[2]));

        state.set_search(String::new());
        assert!(graph.nodes.iter().all(|node| !state.matches_search(node)));
    }

    #[test]
    fn hiding_a_category_hides_its_edges() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        let (all_nodes, all_edges) = visible_sets(&state, &graph);
        assert_eq!(all_nodes, vec![0, 1, 2, 3]);
        assert_eq!(all_edges, vec![0, 1, 2, 3]);

        state.set_category(Category::Client, false);
        let (nodes, edges) = visible_sets(&state, &graph);
        assert_eq!(nodes, vec![1, 2, 3]);
        assert_eq!(edges, vec![1]);
        for (index, edge) in graph.edges.iter().enumerate() {
            if edges.contains(&index) {
                assert!(nodes.contains(&edge.source) && nodes.contains(&edge.target));
            }
        }

        state.set_category(Category::Client, true);
        assert_eq!(visible_sets(&state, &graph), (all_nodes, all_edges));
    }

    #[test]
    fn reset_filters_enables_everything() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        state.set_category(Category::Function, false);
        state.set_category(Category::Api, false);
        state.reset_filters();
        assert_eq!(visible_sets(&state, &graph).0.len(), graph.node_count());
    }

    #[test]
    fn clearing_search_and_selection_keeps_filters() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        state.set_search("pay".to_owned());
        state.select(&graph, Some(0));
        state.set_category(Category::Api, false);

        state.clear_search_and_selection();
        assert_eq!(state.search(), "");
        assert_eq!(state.selected(), None);
        assert!(!state.matches_search(&graph.nodes[0]));
        assert!(!state.is_enabled(Category::Api));
        assert!(state.is_enabled(Category::Client));
    }

    #[test]
    fn details_list_incoming_and_outgoing_connections() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        state.select(&graph, Some(0));

        let details = state.details(&graph).unwrap();
        assert_eq!(details.id, "PaymentClient");
        assert_eq!(details.category, Category::Client);
        assert_eq!(details.degree, 3);
        assert_eq!(
            details.incoming,
            vec![
                Connection {
                    relation: "calls".to_owned(),
                    peer: "charge".to_owned(),
                    peer_index: 1,
                },
                Connection {
                    relation: "calls".to_owned(),
                    peer: "refund".to_owned(),
                    peer_index: 3,
                },
            ]
        );
        assert_eq!(
            details.outgoing,
            vec![Connection {
                relation: "implements".to_owned(),
                peer: "refund".to_owned(),
                peer_index: 3,
            }]
        );
    }

    #[test]
    fn selecting_another_node_replaces_details() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        state.select(&graph, Some(0));
        state.select(&graph, Some(2));

        let details = state.details(&graph).unwrap();
        assert_eq!(details.id, "UserAPIHandler");
        assert!(details.incoming.is_empty());
        assert_eq!(details.outgoing.len(), 1);
        assert_eq!(details.outgoing[0].peer, "charge");
    }

    #[test]
    fn invalid_selection_clears() {
        let graph = sample_graph();
        let mut state = InteractionState::default();
        state.select(&graph, Some(1));
        state.select(&graph, Some(99));
        assert_eq!(state.selected(), None);
        assert_eq!(state.details(&graph), None);
    }
}
