use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_RELATION: &str = "calls";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFlow {
    pub nodes: Vec<String>,
    pub edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_relation", rename = "type")]
    pub relation: String,
}

#[cfg(test)]
impl RawEdge {
    pub fn new(source: &str, target: &str, relation: &str) -> Self {
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
            relation: relation.to_owned(),
        }
    }
}

fn default_relation() -> String {
    DEFAULT_RELATION.to_owned()
}

/// Decodes the flow payload. Only invalid JSON or a non-object document is an
/// error; missing arrays and malformed entries degrade to partial data.
pub(super) fn parse_flow_payload(raw: &str) -> Result<RawFlow> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in flow payload")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for flow payload, expected an object"))?;

    let mut flow = RawFlow::default();

    match object.get("nodes") {
        Some(Value::Array(values)) => {
            for value in values {
                match value.as_str() {
                    Some(id) => flow.nodes.push(id.to_owned()),
                    None => log::warn!("dropping non-string node entry: {value}"),
                }
            }
        }
        Some(other) => log::warn!("flow payload `nodes` is not an array: {other}"),
        None => log::warn!("flow payload has no `nodes` array"),
    }

    match object.get("edges") {
        Some(Value::Array(values)) => {
            for value in values {
                let mut entry = value.clone();
                if let Some(fields) = entry.as_object_mut()
                    && fields.get("type").is_some_and(Value::is_null)
                {
                    fields.remove("type");
                }

                match RawEdge::deserialize(entry) {
                    Ok(edge) => flow.edges.push(edge),
                    Err(error) => log::warn!("dropping malformed edge {value}: {error}"),
                }
            }
        }
        Some(other) => log::warn!("flow payload `edges` is not an array: {other}"),
        None => log::warn!("flow payload has no `edges` array"),
    }

    Ok(flow)
}
