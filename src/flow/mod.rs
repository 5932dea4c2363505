mod collect;
mod model;
mod parse;
mod source;

pub use collect::collect_flow_graph;
#[cfg(test)]
pub use collect::build_flow_graph;
pub use model::{Category, Edge, FlowGraph, Node};
#[cfg(test)]
pub use parse::RawEdge;
pub use source::FlowSource;
