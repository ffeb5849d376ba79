//! A reactive mortgage computation core.
//!
//! Derives mortgage figures (financed amount, monthly rate, payment count,
//! monthly payment) from three user-editable inputs plus an injected rate
//! table. All derived quantities live in one dependency graph driven by a
//! single propagation engine: every input change runs one mark/apply/commit
//! cycle in cached topological order, recomputing each affected quantity
//! exactly once and notifying observers only after the whole cycle has
//! committed. Observers therefore never see a value computed from a mix of
//! pre- and post-change inputs.
//!
//! ```
//! use mortgage_core::{MortgageModel, MortgageQuantity, MortgageTerm, RateTable};
//!
//! let mut model = MortgageModel::new(100_000.0, RateTable::sample()).unwrap();
//! let sub = model.subscribe(MortgageQuantity::MonthlyPayment, |payment| {
//!     println!("monthly payment is now {payment:.2}");
//! });
//!
//! // One coherent notification for both changes, not two.
//! model.batch(|b| {
//!     b.set_term(MortgageTerm::TwentyYear);
//!     b.set_down_payment(0.0);
//! }).unwrap();
//! sub.cancel();
//! ```

pub mod analysis;
pub mod channel;
pub mod compute;
pub mod model;
pub mod store;

pub use channel::Subscription;
pub use compute::{Batch, ComputeError, Engine, Ledger};
pub use model::{MortgageBatch, MortgageModel, MortgageQuantity, MortgageTerm, RateTable};
pub use store::{GraphError, QuantityId, QuantityKind, QuantityMeta, Registry};
