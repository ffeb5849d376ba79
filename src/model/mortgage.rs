//! The concrete mortgage graph: three inputs, six derived quantities, and
//! the injected rate table.
//!
//! The wiring is eager and explicit: every quantity and edge is registered
//! up front, so the dependency order is inspectable instead of implicit in
//! closure composition, and one engine owns the whole recomputation pass.

use log::debug;

use super::rates::RateTable;
use super::term::MortgageTerm;
use crate::channel::Subscription;
use crate::compute::{Batch, ComputeError, Engine};
use crate::store::{GraphError, QuantityId, QuantityMeta, Registry};

/// Selector for the quantities a mortgage model exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MortgageQuantity {
    PrincipalAmount,
    DownPaymentAmount,
    /// The term input, observed as its year count.
    Term,
    AnnualRate,
    MonthlyRate,
    NumberOfPayments,
    FinancedAmount,
    MonthlyPayment,
    DownPaymentPercentage,
}

#[derive(Clone, Copy)]
struct Wiring {
    principal: QuantityId,
    down_payment: QuantityId,
    term: QuantityId,
    annual_rate: QuantityId,
    monthly_rate: QuantityId,
    number_of_payments: QuantityId,
    financed_amount: QuantityId,
    monthly_payment: QuantityId,
    down_payment_percentage: QuantityId,
}

pub struct MortgageModel {
    engine: Engine,
    wiring: Wiring,
}

impl MortgageModel {
    /// Builds the model around an injected rate table.
    ///
    /// Seeds a 20% down payment and a thirty-year term. Fails if the initial
    /// evaluation cannot complete, e.g. a zero principal makes the down
    /// payment percentage undefined.
    pub fn new(principal: f64, rates: RateTable) -> Result<Self, GraphError> {
        let mut registry = Registry::new();

        let principal_id =
            registry.add_input(principal, QuantityMeta::named("principalAmount"))?;
        let down_payment =
            registry.add_input(principal * 0.2, QuantityMeta::named("downPaymentAmount"))?;
        let term = registry.add_input(
            f64::from(MortgageTerm::ThirtyYear.years()),
            QuantityMeta::named("mortgageTerm"),
        )?;

        let annual_rate = registry.add_derived(
            &[term],
            Box::new(move |d: &[f64]| {
                let term = MortgageTerm::from_years(d[0] as u32)
                    .ok_or(ComputeError::UnknownTerm { years: d[0] })?;
                Ok(rates.fixed_rate(term) * 0.01)
            }),
            QuantityMeta::named("annualRate"),
        )?;

        let monthly_rate = registry.add_derived(
            &[annual_rate],
            Box::new(|d: &[f64]| Ok(d[0] / 12.0)),
            QuantityMeta::named("monthlyRate"),
        )?;

        let number_of_payments = registry.add_derived(
            &[term],
            Box::new(|d: &[f64]| Ok(d[0] * 12.0)),
            QuantityMeta::named("numberOfPayments"),
        )?;

        let financed_amount = registry.add_derived(
            &[principal_id, down_payment],
            Box::new(|d: &[f64]| Ok(d[0] - d[1])),
            QuantityMeta::named("financedAmount"),
        )?;

        let monthly_payment = registry.add_derived(
            &[financed_amount, monthly_rate, number_of_payments],
            Box::new(|d: &[f64]| {
                let (financed, rate, payments) = (d[0], d[1], d[2]);
                if rate == 0.0 {
                    // Straight-line amortization; the closed form would
                    // divide by zero.
                    return Ok(financed / payments);
                }
                let growth = (1.0 + rate).powf(payments);
                Ok(financed * (rate * growth) / (growth - 1.0))
            }),
            QuantityMeta::named("monthlyPayment"),
        )?;

        let down_payment_percentage = registry.add_derived(
            &[down_payment, principal_id],
            Box::new(|d: &[f64]| {
                if d[1] == 0.0 {
                    return Err(ComputeError::InvalidPercentage);
                }
                Ok(d[0] / d[1])
            }),
            QuantityMeta::named("downPaymentPercentage"),
        )?;

        let engine = Engine::build(registry)?;
        debug!("mortgage model built: principal={principal}");

        Ok(Self {
            engine,
            wiring: Wiring {
                principal: principal_id,
                down_payment,
                term,
                annual_rate,
                monthly_rate,
                number_of_payments,
                financed_amount,
                monthly_payment,
                down_payment_percentage,
            },
        })
    }

    fn id(&self, quantity: MortgageQuantity) -> QuantityId {
        let w = &self.wiring;
        match quantity {
            MortgageQuantity::PrincipalAmount => w.principal,
            MortgageQuantity::DownPaymentAmount => w.down_payment,
            MortgageQuantity::Term => w.term,
            MortgageQuantity::AnnualRate => w.annual_rate,
            MortgageQuantity::MonthlyRate => w.monthly_rate,
            MortgageQuantity::NumberOfPayments => w.number_of_payments,
            MortgageQuantity::FinancedAmount => w.financed_amount,
            MortgageQuantity::MonthlyPayment => w.monthly_payment,
            MortgageQuantity::DownPaymentPercentage => w.down_payment_percentage,
        }
    }

    // --- Mutation ---

    pub fn set_principal(&mut self, value: f64) -> Result<(), ComputeError> {
        self.engine.set(self.wiring.principal, value)
    }

    pub fn set_down_payment(&mut self, value: f64) -> Result<(), ComputeError> {
        self.engine.set(self.wiring.down_payment, value)
    }

    pub fn set_term(&mut self, term: MortgageTerm) -> Result<(), ComputeError> {
        self.engine.set(self.wiring.term, f64::from(term.years()))
    }

    /// Applies several input changes as one propagation cycle, so observers
    /// see a single coherent notification per affected quantity.
    pub fn batch<F>(&mut self, scope: F) -> Result<(), ComputeError>
    where
        F: FnOnce(&mut MortgageBatch<'_>),
    {
        let wiring = self.wiring;
        self.engine.batch(|batch| {
            let mut scoped = MortgageBatch { batch, wiring };
            scope(&mut scoped);
        })
    }

    // --- Reads ---

    /// Last committed value of any quantity, synchronously.
    pub fn value(&self, quantity: MortgageQuantity) -> f64 {
        self.engine.get(self.id(quantity))
    }

    pub fn principal_amount(&self) -> f64 {
        self.value(MortgageQuantity::PrincipalAmount)
    }

    pub fn down_payment_amount(&self) -> f64 {
        self.value(MortgageQuantity::DownPaymentAmount)
    }

    pub fn term(&self) -> MortgageTerm {
        let years = self.engine.get(self.wiring.term) as u32;
        MortgageTerm::from_years(years)
            .expect("BUG: term input must hold a supported year count")
    }

    pub fn annual_rate(&self) -> f64 {
        self.value(MortgageQuantity::AnnualRate)
    }

    pub fn monthly_rate(&self) -> f64 {
        self.value(MortgageQuantity::MonthlyRate)
    }

    pub fn number_of_payments(&self) -> f64 {
        self.value(MortgageQuantity::NumberOfPayments)
    }

    pub fn financed_amount(&self) -> f64 {
        self.value(MortgageQuantity::FinancedAmount)
    }

    pub fn monthly_payment(&self) -> f64 {
        self.value(MortgageQuantity::MonthlyPayment)
    }

    pub fn down_payment_percentage(&self) -> f64 {
        self.value(MortgageQuantity::DownPaymentPercentage)
    }

    /// Observes future committed values of one quantity. No replay of the
    /// current value; cancel the returned handle to stop delivery.
    pub fn subscribe(
        &self,
        quantity: MortgageQuantity,
        f: impl FnMut(f64) + 'static,
    ) -> Subscription {
        self.engine.subscribe(self.id(quantity), f)
    }
}

/// Mutation scope handed to `MortgageModel::batch`.
pub struct MortgageBatch<'a> {
    batch: &'a mut Batch,
    wiring: Wiring,
}

impl MortgageBatch<'_> {
    pub fn set_principal(&mut self, value: f64) {
        self.batch.set(self.wiring.principal, value);
    }

    pub fn set_down_payment(&mut self, value: f64) {
        self.batch.set(self.wiring.down_payment, value);
    }

    pub fn set_term(&mut self, term: MortgageTerm) {
        self.batch.set(self.wiring.term, f64::from(term.years()));
    }
}
