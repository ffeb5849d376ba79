//! Executes propagation cycles over the quantity graph.
pub mod engine;
pub mod ledger;

pub use engine::{Batch, Engine};
pub use ledger::{ComputeError, Ledger};
