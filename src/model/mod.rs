//! The mortgage view-model built on the propagation engine.
pub mod mortgage;
pub mod rates;
pub mod term;

pub use mortgage::{MortgageBatch, MortgageModel, MortgageQuantity};
pub use rates::RateTable;
pub use term::MortgageTerm;
