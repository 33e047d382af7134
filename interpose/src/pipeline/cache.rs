//! Per-method pipeline cache.

use super::HandlerPipeline;
use interpose_core::MethodDescriptor;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Caches one [`HandlerPipeline`] per method.
///
/// Lookups take a read lock. A miss builds the pipeline without holding any
/// lock and then publishes it; if another thread published first, its
/// pipeline wins, so every caller observes the same list for a method.
#[derive(Debug, Default)]
pub struct PipelineCache {
    entries: RwLock<HashMap<MethodDescriptor, Arc<HandlerPipeline>>>,
}

impl PipelineCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached pipeline for `method`, if any.
    pub fn get(&self, method: &MethodDescriptor) -> Option<Arc<HandlerPipeline>> {
        self.entries.read().get(method).cloned()
    }

    /// The cached pipeline for `method`, building it with `build` on a miss.
    ///
    /// A failed build caches nothing.
    pub fn get_or_try_insert_with<E>(
        &self,
        method: &MethodDescriptor,
        build: impl FnOnce() -> Result<HandlerPipeline, E>,
    ) -> Result<Arc<HandlerPipeline>, E> {
        if let Some(pipeline) = self.get(method) {
            return Ok(pipeline);
        }
        let built = Arc::new(build()?);
        let mut entries = self.entries.write();
        Ok(entries.entry(method.clone()).or_insert(built).clone())
    }

    /// Number of cached methods.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
