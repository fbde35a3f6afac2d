//! Compiled-schema caching.
//!
//! Schema analysis and signature synthesis are deterministic, so repeated
//! `decorate` calls over the same schema can share one [`CompiledSchema`].
//! The cache is an explicitly constructed, injected store keyed by
//! [`ModelSchema::fingerprint`] — not a hidden module-level singleton. The
//! memo is an optimization only; behavior with and without it is identical.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use command_bind_core::{ModelSchema, Outcome};

use crate::decorate::{BindError, BoundCommand, CompiledSchema, compile_schema, from_compiled};
use crate::validate::ModelInstance;

/// Keyed store of compiled schemas.
///
/// Each key is populated at most once; the interior lock makes concurrent
/// first-writes mutually exclusive while keeping lookups cheap.
///
/// # Examples
///
/// ```
/// use command_bind::WrapperCache;
/// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
///
/// let cache = WrapperCache::new();
/// let schema = ModelSchema::new("m").with_field(FieldSpec::required("f", TypeExpr::String));
///
/// let first = cache.get_or_compile(&schema).unwrap();
/// let second = cache.get_or_compile(&schema).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct WrapperCache {
    inner: Mutex<HashMap<String, Arc<CompiledSchema>>>,
}

impl WrapperCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled form of `schema`, compiling it on first use.
    ///
    /// Compilation errors are not cached: a schema that fails to compile is
    /// retried on the next call.
    pub fn get_or_compile(&self, schema: &ModelSchema) -> Result<Arc<CompiledSchema>, BindError> {
        let key = schema.fingerprint();
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(hit) = entries.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(compile_schema(schema)?);
        entries.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Number of compiled schemas currently held.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`decorate`](crate::decorate) through a cache: schema analysis runs once
/// per fingerprint, wrapper assembly still runs per call.
pub fn decorate_cached<F>(
    cache: &WrapperCache,
    schema: &ModelSchema,
    handler: F,
) -> Result<BoundCommand, BindError>
where
    F: Fn(&ModelInstance) -> Outcome + Send + Sync + 'static,
{
    let compiled = cache.get_or_compile(schema)?;
    from_compiled(
        std::slice::from_ref(&*compiled),
        Arc::new(move |instances: &[ModelInstance]| handler(&instances[0])),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use command_bind_core::{FieldSpec, TypeExpr};

    use super::*;

    fn schema() -> ModelSchema {
        ModelSchema::new("m")
            .with_field(FieldSpec::required("name", TypeExpr::String))
            .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)))
    }

    #[test]
    fn test_cache_populates_once_per_key() {
        let cache = WrapperCache::new();
        let s = schema();

        let first = cache.get_or_compile(&s).unwrap();
        let second = cache.get_or_compile(&s).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_schemas_get_distinct_entries() {
        let cache = WrapperCache::new();
        let other = ModelSchema::new("other")
            .with_field(FieldSpec::required("x", TypeExpr::Integer));

        cache.get_or_compile(&schema()).unwrap();
        cache.get_or_compile(&other).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_compilation_is_not_cached() {
        let cache = WrapperCache::new();
        let broken = ModelSchema::new("broken").with_field(
            FieldSpec::required("f", TypeExpr::String).with_metadata("extras", json!("nope")),
        );

        assert!(cache.get_or_compile(&broken).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_wrapper_matches_uncached_behavior() {
        let cache = WrapperCache::new();
        let s = schema();
        let handler =
            |m: &ModelInstance| Outcome::success(json!(format!("{}", m.get("retries").unwrap())));

        let cached = decorate_cached(&cache, &s, handler).unwrap();
        let plain = crate::decorate(&s, handler).unwrap();

        let args = [("name", json!("x"))];
        assert_eq!(cached.invoke(&args), plain.invoke(&args));
    }

    #[test]
    fn test_concurrent_first_writes_are_exclusive() {
        let cache = Arc::new(WrapperCache::new());
        let s = schema();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let s = s.clone();
                std::thread::spawn(move || cache.get_or_compile(&s).unwrap())
            })
            .collect();

        let compiled: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        for pair in compiled.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }
}
