//! A synchronous, single-threaded propagation engine.
//!
//! Every input mutation (or batch of mutations) runs one cycle:
//! mark the transitive dependents of the written inputs, recompute each of
//! them exactly once in cached topological order against staged values, and
//! only then commit and notify. Observers therefore see exactly one
//! consistent snapshot per root change, never a partially updated graph,
//! regardless of how many dependency paths reach a quantity.
//!
//! The engine is not internally synchronized: it assumes single-writer
//! access, matching the single-owner nature of a view-model. Observer
//! callbacks run on the same call stack that committed the cycle.

use log::{debug, trace};
use smallvec::SmallVec;

use crate::analysis::topology;
use crate::channel::{Channel, Subscription};
use crate::compute::ledger::{ComputeError, Ledger};
use crate::store::{GraphError, QuantityId, QuantityKind, Registry};

type WriteSet = SmallVec<[(QuantityId, f64); 4]>;

/// A scoped group of input writes processed as a single propagation cycle.
pub struct Batch {
    writes: WriteSet,
}

impl Batch {
    /// Buffers a write. Validation and propagation happen when the batch
    /// scope closes; a later write to the same input wins.
    pub fn set(&mut self, id: QuantityId, value: f64) {
        self.writes.push((id, value));
    }
}

pub struct Engine {
    registry: Registry,
    // Cached once; the topology never changes after construction.
    order: Vec<QuantityId>,
    ledger: Ledger,
    channels: Vec<Channel>,
}

impl Engine {
    /// Seals a registry into a runnable engine: caches the topological
    /// order, then runs one full evaluation pass to seed derived values.
    /// No notifications are emitted; channels have no subscribers yet.
    pub fn build(registry: Registry) -> Result<Self, GraphError> {
        let order = topology::sort(&registry)?;
        let mut ledger = Ledger::with_len(registry.count());

        for &id in &order {
            let value = match registry.kind(id) {
                QuantityKind::Input => registry.initial(id),
                QuantityKind::Derived => {
                    Self::recompute(&registry, id, |pid| ledger.get(pid))?
                }
            };
            ledger.set(id, value);
        }

        let channels = (0..registry.count()).map(|_| Channel::new()).collect();
        debug!("engine sealed: {} quantities", registry.count());

        Ok(Self {
            registry,
            order,
            ledger,
            channels,
        })
    }

    /// Returns the last committed value synchronously.
    pub fn get(&self, id: QuantityId) -> f64 {
        self.ledger.get(id)
    }

    /// Registers an observer for one quantity. Future committed values only;
    /// the current value is not replayed.
    pub fn subscribe(&self, id: QuantityId, f: impl FnMut(f64) + 'static) -> Subscription {
        self.channels[id.index()].subscribe(f)
    }

    /// Writes one input and runs a propagation cycle.
    pub fn set(&mut self, id: QuantityId, value: f64) -> Result<(), ComputeError> {
        let mut writes = WriteSet::new();
        writes.push((id, value));
        self.propagate(writes)
    }

    /// Runs several input writes as one cycle. Observers see a single
    /// coherent notification per affected quantity, reflecting every write
    /// in the batch. An empty batch is a no-op.
    pub fn batch<F>(&mut self, scope: F) -> Result<(), ComputeError>
    where
        F: FnOnce(&mut Batch),
    {
        let mut batch = Batch {
            writes: WriteSet::new(),
        };
        scope(&mut batch);
        self.propagate(batch.writes)
    }

    /// One mark/apply/commit cycle. All-or-nothing: any recompute error
    /// leaves the ledger at its pre-cycle state and emits nothing.
    fn propagate(&mut self, writes: WriteSet) -> Result<(), ComputeError> {
        if writes.is_empty() {
            return Ok(());
        }

        for &(id, _) in &writes {
            if self.registry.kind(id) != QuantityKind::Input {
                return Err(ComputeError::InvalidMutation {
                    name: self.registry.meta(id).name.clone(),
                });
            }
        }

        // Mark
        let roots: SmallVec<[QuantityId; 4]> = writes.iter().map(|&(id, _)| id).collect();
        let dirty = topology::downstream_from(&self.registry, &roots);
        trace!(
            "propagation cycle: {} root(s), {} affected",
            roots.len(),
            dirty.len()
        );

        // Apply, into a staging area so the ledger stays untouched until
        // every recompute has succeeded.
        let mut staged: Vec<Option<f64>> = vec![None; self.registry.count()];
        for &(id, value) in &writes {
            staged[id.index()] = Some(value);
        }
        for &id in &self.order {
            if self.registry.kind(id) != QuantityKind::Derived || !dirty.contains(&id) {
                continue;
            }
            let value = Self::recompute(&self.registry, id, |pid| {
                staged[pid.index()].unwrap_or_else(|| self.ledger.get(pid))
            })?;
            staged[id.index()] = Some(value);
        }

        // Commit every staged value first, then notify, so a callback that
        // reads back through `get` always sees the full post-cycle state.
        for &id in &self.order {
            if let Some(value) = staged[id.index()] {
                self.ledger.set(id, value);
            }
        }
        for &id in &self.order {
            if staged[id.index()].is_some() {
                self.channels[id.index()].emit(self.ledger.get(id));
            }
        }
        Ok(())
    }

    fn recompute(
        registry: &Registry,
        id: QuantityId,
        read: impl Fn(QuantityId) -> f64,
    ) -> Result<f64, ComputeError> {
        let parents = registry.get_parents(id);
        let mut args: SmallVec<[f64; 4]> = SmallVec::with_capacity(parents.len());
        for &pid in parents {
            args.push(read(pid));
        }
        let f = registry
            .derive_fn(id)
            .expect("BUG: derived quantity must carry a recompute closure");
        f(&args)
    }
}
