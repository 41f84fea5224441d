//! Feature slices

pub mod flow_graph;
pub mod liveness;
pub mod symbols;
