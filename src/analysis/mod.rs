//! Graph algorithms over the static topology.
pub mod topology;
