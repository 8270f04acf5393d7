// src/extractors/registry.rs

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::extractors::schema::{ResolvedSchema, SchemaBuilder, TableRecord};
use crate::utils::error::SchemaError;

type CachedSchema = Result<Arc<dyn Any + Send + Sync>, SchemaError>;

static GLOBAL_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// Write-once-per-type cache of resolved schemas.
///
/// The first `resolve::<T>()` scans `T`'s declaration under the write lock and
/// stores the outcome, success or failure. Every later call for `T` is served
/// from the cache under a shared read lock. Tests that need a clean cache
/// build their own registry with [`SchemaRegistry::new`].
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, CachedSchema>>,
    resolutions: AtomicUsize,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { schemas: RwLock::new(HashMap::new()), resolutions: AtomicUsize::new(0) }
    }

    /// The process-wide registry.
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL_REGISTRY
    }

    /// Number of declaration scans this registry has performed.
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    pub fn resolve<T: TableRecord>(&self) -> Result<Arc<ResolvedSchema<T>>, SchemaError> {
        let key = TypeId::of::<T>();

        // Fast path: shared read lock, served straight from the cache
        {
            let schemas = self.schemas.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(cached) = schemas.get(&key) {
                return Self::downcast::<T>(cached);
            }
        }

        // Slow path: take the write lock for the first resolution of T
        let mut schemas = self.schemas.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have resolved T while we waited for the lock.
        if let Some(cached) = schemas.get(&key) {
            return Self::downcast::<T>(cached);
        }

        // Scan T's declaration and bind each field to its extractor
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        let mut builder = SchemaBuilder::<T>::new();
        T::declare(&mut builder);

        let outcome: CachedSchema = match builder.resolve() {
            Ok(schema) => {
                tracing::debug!("Resolved schema for {}: {} fields", T::KIND, schema.field_count());
                Ok(Arc::new(schema) as Arc<dyn Any + Send + Sync>)
            }
            Err(e) => {
                tracing::error!("Schema resolution failed for {}: {}", T::KIND, e);
                Err(e)
            }
        };

        // Cache the outcome either way; a broken declaration stays broken
        let result = Self::downcast::<T>(&outcome);
        schemas.insert(key, outcome);
        result
    }

    fn downcast<T: TableRecord>(cached: &CachedSchema) -> Result<Arc<ResolvedSchema<T>>, SchemaError> {
        match cached {
            Ok(schema) => Arc::clone(schema)
                .downcast::<ResolvedSchema<T>>()
                .map_err(|_| SchemaError::CacheConflict(T::KIND)),
            Err(e) => Err(e.clone()),
        }
    }
}
