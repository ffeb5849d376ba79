//! ledger.rs
//! Committed values, dense-indexed by `QuantityId`, plus the runtime error
//! taxonomy.

use thiserror::Error;

use crate::store::QuantityId;

/// Runtime errors raised during a propagation cycle. A failed cycle commits
/// nothing: every quantity keeps its pre-cycle value and no observer is
/// notified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("Cannot set derived quantity '{name}'")]
    InvalidMutation { name: String },

    #[error("Down payment percentage is undefined for a zero principal")]
    InvalidPercentage,

    #[error("No fixed rate for a {years}-year term")]
    UnknownTerm { years: f64 },
}

/// Dense storage of committed quantity values. Only the engine writes here,
/// and only during the commit phase, so a reader can never observe a
/// partially updated graph.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: Vec<f64>,
}

impl Ledger {
    pub fn with_len(count: usize) -> Self {
        Self {
            values: vec![0.0; count],
        }
    }

    #[inline(always)]
    pub fn get(&self, id: QuantityId) -> f64 {
        self.values[id.index()]
    }

    #[inline(always)]
    pub fn set(&mut self, id: QuantityId, value: f64) {
        self.values[id.index()] = value;
    }
}
