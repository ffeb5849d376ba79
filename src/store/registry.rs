//! registry.rs
//! Columnar quantity storage: CSR parent lists plus a linked-list child
//! adjacency for downstream traversal.

use std::collections::HashSet;
use std::fmt;

use super::types::{DeriveFn, GraphError, QuantityId, QuantityKind, QuantityMeta};

#[derive(Default)]
pub struct Registry {
    // Columnar arrays, index-aligned with QuantityId
    pub kinds: Vec<QuantityKind>,
    pub meta: Vec<QuantityMeta>,

    // Topology (CSR parents + adjacency-list children)
    pub parents_flat: Vec<QuantityId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)
    pub first_child: Vec<u32>,
    pub child_targets: Vec<QuantityId>,
    pub next_child: Vec<u32>,

    // Recompute closures (None for inputs) and seed values (inputs only;
    // derived slots are overwritten by the engine's seed pass).
    derive_fns: Vec<Option<DeriveFn>>,
    initial: Vec<f64>,

    used_names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.kinds.len()
    }

    /// Registers an input quantity seeded with `value`.
    pub fn add_input(&mut self, value: f64, meta: QuantityMeta) -> Result<QuantityId, GraphError> {
        self.claim_name(&meta)?;
        Ok(self.push(QuantityKind::Input, &[], None, value, meta))
    }

    /// Registers a derived quantity.
    ///
    /// Dependencies must already be registered (no forward references), so
    /// edges always point backwards and the topology stays acyclic by
    /// construction. The declared parent list must match exactly what
    /// `recompute` reads; the engine trusts the declaration, and an
    /// under-declared list is the classic source of stale-read bugs. The one
    /// mismatch that is statically checkable is an empty list, which is
    /// rejected here.
    pub fn add_derived(
        &mut self,
        parents: &[QuantityId],
        recompute: DeriveFn,
        meta: QuantityMeta,
    ) -> Result<QuantityId, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InconsistentDependencyDeclaration {
                name: meta.name.clone(),
            });
        }
        for &parent in parents {
            if parent.index() >= self.count() {
                return Err(GraphError::UnknownDependency {
                    name: meta.name.clone(),
                    id: parent,
                });
            }
        }
        self.claim_name(&meta)?;
        Ok(self.push(QuantityKind::Derived, parents, Some(recompute), 0.0, meta))
    }

    fn claim_name(&mut self, meta: &QuantityMeta) -> Result<(), GraphError> {
        if !self.used_names.insert(meta.name.clone()) {
            return Err(GraphError::DuplicateName {
                name: meta.name.clone(),
            });
        }
        Ok(())
    }

    fn push(
        &mut self,
        kind: QuantityKind,
        parents: &[QuantityId],
        recompute: Option<DeriveFn>,
        initial: f64,
        meta: QuantityMeta,
    ) -> QuantityId {
        let id = QuantityId(self.kinds.len() as u32);

        // 1. Parents (CSR append)
        let start = self.parents_flat.len() as u32;
        let count = parents.len() as u32;
        self.parents_flat.extend_from_slice(parents);
        self.parents_ranges.push((start, count));

        // 2. Children (adjacency list for downstream lookups)
        for &parent in parents {
            let p_idx = parent.index();
            let head = self.first_child[p_idx];
            let new_edge = self.child_targets.len() as u32;
            self.child_targets.push(id);
            self.next_child.push(head);
            self.first_child[p_idx] = new_edge;
        }

        // 3. Columns
        self.kinds.push(kind);
        self.first_child.push(u32::MAX);
        self.derive_fns.push(recompute);
        self.initial.push(initial);
        self.meta.push(meta);

        id
    }

    // --- Accessors ---

    #[inline(always)]
    pub fn get_parents(&self, id: QuantityId) -> &[QuantityId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    pub fn kind(&self, id: QuantityId) -> QuantityKind {
        self.kinds[id.index()]
    }

    pub fn meta(&self, id: QuantityId) -> &QuantityMeta {
        &self.meta[id.index()]
    }

    pub fn derive_fn(&self, id: QuantityId) -> Option<&DeriveFn> {
        self.derive_fns[id.index()].as_ref()
    }

    pub fn initial(&self, id: QuantityId) -> f64 {
        self.initial[id.index()]
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds)
            .field("meta", &self.meta)
            .field("parents_ranges", &self.parents_ranges)
            .finish_non_exhaustive()
    }
}
