// src/engine/resolver.rs

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

use super::error::EngineError;
use super::operation::Implementation;
use crate::core::kind::{OperandKindTag, Signature};

/// Signature table of one operation.
///
/// Among matching signatures the lowest total specificity wins; ties go to
/// the signature registered first.
pub struct Resolver {
    entries: Vec<(Signature, Implementation)>,
    cache: Option<RwLock<HashMap<Vec<OperandKindTag>, usize>>>,
}

impl Resolver {
    pub fn new(cache_resolutions: bool) -> Self {
        Self {
            entries: Vec::new(),
            cache: cache_resolutions.then(|| RwLock::new(HashMap::new())),
        }
    }

    pub fn register(&mut self, signature: Signature, implementation: Implementation) {
        self.entries.push((signature, implementation));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> + '_ {
        self.entries.iter().map(|(sig, _)| sig)
    }

    /// Implementation for the concrete tuple, or `UnsupportedOperandKinds`.
    pub fn resolve(
        &self,
        operation: &str,
        kinds: &[OperandKindTag],
    ) -> Result<&Implementation, EngineError> {
        self.resolve_index(operation, kinds)
            .map(|idx| &self.entries[idx].1)
    }

    /// Signature that would handle the tuple
    pub fn resolve_signature(
        &self,
        operation: &str,
        kinds: &[OperandKindTag],
    ) -> Result<&Signature, EngineError> {
        self.resolve_index(operation, kinds)
            .map(|idx| &self.entries[idx].0)
    }

    /// Number of memoised tuples (0 when caching is off)
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.read().len())
    }

    fn resolve_index(&self, operation: &str, kinds: &[OperandKindTag]) -> Result<usize, EngineError> {
        if let Some(cache) = &self.cache {
            if let Some(&idx) = cache.read().get(kinds) {
                trace!(operation, ?kinds, idx, "resolution cache hit");
                return Ok(idx);
            }
        }

        let idx = self
            .select(kinds)
            .ok_or_else(|| EngineError::unsupported(operation, kinds))?;
        debug!(
            operation,
            ?kinds,
            signature = %self.entries[idx].0,
            "resolved signature"
        );

        // Same key always maps to the same index, so racing writers agree.
        if let Some(cache) = &self.cache {
            cache.write().insert(kinds.to_vec(), idx);
        }
        Ok(idx)
    }

    fn select(&self, kinds: &[OperandKindTag]) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (idx, (signature, _)) in self.entries.iter().enumerate() {
            if !signature.matches(kinds) {
                continue;
            }
            let score = signature.specificity();
            match best {
                Some((_, best_score)) if best_score <= score => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}
