use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compute::ComputeError;

/// A stable, dense identifier for a quantity in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct QuantityId(pub u32);

impl QuantityId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn new(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// The recompute function of a derived quantity.
///
/// Receives the current values of the declared dependencies, in declaration
/// order. Must be pure: the same dependency values always yield the same
/// result, with no side effects and no hidden state.
pub type DeriveFn = Box<dyn Fn(&[f64]) -> Result<f64, ComputeError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    /// A user-settable leaf, mutated through `Engine::set` or a batch scope.
    Input,
    /// Computed from its declared parents; never set directly.
    Derived,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityMeta {
    /// Human-readable name, unique within one registry.
    pub name: String,
}

impl QuantityMeta {
    pub fn named(name: &str) -> Self {
        Self { name: name.into() }
    }
}

/// Construction-time errors. The graph topology is fixed once built, so all
/// of these are fatal to model setup rather than runtime conditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Cycle detected involving quantity '{name}'")]
    CyclicDependency { name: String },

    #[error("Quantity '{name}' references unregistered dependency {id:?}")]
    UnknownDependency { name: String, id: QuantityId },

    #[error("Derived quantity '{name}' declares no dependencies")]
    InconsistentDependencyDeclaration { name: String },

    #[error("Quantity name '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("Initial evaluation failed")]
    Evaluation(#[from] ComputeError),
}
