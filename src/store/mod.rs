//! Quantity storage: columnar arrays plus the static dependency topology.
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{DeriveFn, GraphError, QuantityId, QuantityKind, QuantityMeta};
