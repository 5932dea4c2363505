use std::collections::HashMap;

use super::parse::RawEdge;

/// Coarse classification of a code entity inferred from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Function,
    Client,
    Resource,
    Datasource,
    Provider,
    Api,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Function,
        Self::Client,
        Self::Resource,
        Self::Datasource,
        Self::Provider,
        Self::Api,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Client => "client",
            Self::Resource => "resource",
            Self::Datasource => "datasource",
            Self::Provider => "provider",
            Self::Api => "api",
        }
    }
}

/// Classifies a node id by ordered, case-sensitive substring checks.
pub fn classify(id: &str) -> Category {
    if id.contains("Client") {
        Category::Client
    } else if id.contains("Resource") {
        Category::Resource
    } else if id.contains("DataSource") {
        Category::Datasource
    } else if id.contains("Provider") {
        Category::Provider
    } else if id.contains("API") || id.contains("Api") {
        Category::Api
    } else {
        Category::Function
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub category: Category,
    pub degree: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub relation: String,
}

impl Edge {
    pub fn is_implements(&self) -> bool {
        self.relation == "implements"
    }
}

/// Typed, fully resolved code-flow graph. Every edge endpoint indexes into
/// `nodes`; `incoming`/`outgoing` hold edge indices in edge order.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub incoming: Vec<Vec<usize>>,
    pub outgoing: Vec<Vec<usize>>,
    /// Distinct categories in order of first appearance.
    pub categories: Vec<Category>,
    pub dropped_edges: usize,
}

impl FlowGraph {
    pub fn build(node_ids: &[String], raw_edges: &[RawEdge]) -> Self {
        let mut nodes = Vec::with_capacity(node_ids.len());
        let mut index_by_id = HashMap::with_capacity(node_ids.len());
        let mut categories = Vec::new();

        for id in node_ids {
            if index_by_id.contains_key(id) {
                log::debug!("merging duplicate node id {id}");
                continue;
            }

            let category = classify(id);
            if !categories.contains(&category) {
                categories.push(category);
            }

            index_by_id.insert(id.clone(), nodes.len());
            nodes.push(Node {
                id: id.clone(),
                category,
                degree: 0,
            });
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        let mut dropped_edges = 0usize;
        for raw in raw_edges {
            let source = index_by_id.get(&raw.source).copied();
            let target = index_by_id.get(&raw.target).copied();
            let (Some(source), Some(target)) = (source, target) else {
                log::debug!(
                    "dropping edge {} -[{}]-> {}: unknown endpoint",
                    raw.source,
                    raw.relation,
                    raw.target
                );
                dropped_edges += 1;
                continue;
            };

            edges.push(Edge {
                source,
                target,
                relation: raw.relation.clone(),
            });
        }

        if dropped_edges > 0 {
            log::warn!(
                "dropped {dropped_edges} of {} edges referencing unknown node ids",
                raw_edges.len()
            );
        }

        let mut incoming = vec![Vec::new(); nodes.len()];
        let mut outgoing = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            nodes[edge.source].degree += 1;
            nodes[edge.target].degree += 1;
            outgoing[edge.source].push(edge_index);
            incoming[edge.target].push(edge_index);
        }

        Self {
            nodes,
            edges,
            incoming,
            outgoing,
            categories,
            dropped_edges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
