use anyhow::{Context, Result};

use super::model::FlowGraph;
use super::parse::parse_flow_payload;
use super::source::FlowSource;

pub fn collect_flow_graph(source: &FlowSource) -> Result<FlowGraph> {
    log::info!("loading code flow data from {source}");

    let raw = source
        .fetch()
        .with_context(|| format!("Error loading code flow data from {source}"))?;
    let graph = build_flow_graph(&raw)
        .with_context(|| format!("failed to parse code flow data from {source}"))?;

    log::info!(
        "code flow graph ready: {} nodes, {} edges ({} dropped)",
        graph.node_count(),
        graph.edge_count(),
        graph.dropped_edges
    );
    Ok(graph)
}

pub fn build_flow_graph(raw: &str) -> Result<FlowGraph> {
    let flow = parse_flow_payload(raw)?;
    Ok(FlowGraph::build(&flow.nodes, &flow.edges))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builds_graph_from_payload() {
        let graph = build_flow_graph(
            r#"{"nodes": ["a", "b"], "edges": [{"source": "x", "target": "b"}]}"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node("b").map(|node| node.degree), Some(0));
    }

    #[test]
    fn collects_from_file() {
        let path = std::env::temp_dir().join(format!(
            "code-flow-lens-collect-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"nodes": ["PaymentClient", "charge"], "edges": [{"source": "charge", "target": "PaymentClient", "type": "calls"}]}"#)
            .unwrap();
        drop(file);

        let graph = collect_flow_graph(&FlowSource::File(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn fetch_failure_carries_context() {
        let error = collect_flow_graph(&FlowSource::File("/no/such/flow.json".into()))
            .unwrap_err()
            .to_string();
        assert!(error.starts_with("Error loading code flow data"), "{error}");
    }
}
