//! Lazy component loading
//!
//! [`lazy`] wraps an import function so the component behind it is fetched at
//! most once. Concurrent callers share the in-flight import; a failed import
//! is forgotten so the next call retries, a successful one is kept for the
//! lifetime of the handle.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::component::ComponentClass;

/// Lazy loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The underlying import failed
    #[error("Component import failed: {0}")]
    Import(String),

    /// The module loaded but exports no usable component
    #[error("Module has no component export: {0}")]
    MissingExport(String),
}

/// Result type for lazy loading
pub type Result<T> = std::result::Result<T, LoadError>;

/// A loaded component module
#[derive(Debug, Clone)]
pub struct ComponentModule {
    class: ComponentClass,
}

impl ComponentModule {
    /// Create a module whose default export is `class`
    pub fn new(class: ComponentClass) -> Self {
        Self { class }
    }

    /// The module's component class
    pub fn class(&self) -> &ComponentClass {
        &self.class
    }
}

/// Future returned by an import function
pub type ImportFuture = BoxFuture<'static, Result<ComponentModule>>;

type SharedImport = Shared<ImportFuture>;

#[derive(Default)]
struct LazySlot {
    /// In-flight import, if any
    pending: Option<SharedImport>,
    /// Successfully loaded module
    module: Option<ComponentModule>,
}

struct LazyInner {
    import: Box<dyn Fn() -> ImportFuture + Send + Sync>,
    slot: Mutex<LazySlot>,
}

/// A memoizing wrapper around an import function
///
/// Clones share one cache. Two separate [`lazy`] calls never share state,
/// even when wrapping the same function.
#[derive(Clone)]
pub struct LazyComponent {
    inner: Arc<LazyInner>,
}

enum Begin {
    Ready(ComponentModule),
    Pending(SharedImport),
}

/// Wrap an import function in a [`LazyComponent`]
pub fn lazy<F, Fut>(import: F) -> LazyComponent
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ComponentModule>> + Send + 'static,
{
    LazyComponent {
        inner: Arc::new(LazyInner {
            import: Box::new(move || import().boxed()),
            slot: Mutex::new(LazySlot::default()),
        }),
    }
}

impl LazyComponent {
    /// Load the component, starting the import if nothing is cached or in flight
    ///
    /// Errors are returned to the caller and clear the in-flight import so a
    /// later call can retry.
    pub async fn load(&self) -> Result<ComponentModule> {
        let pending = match self.begin() {
            Begin::Ready(module) => return Ok(module),
            Begin::Pending(pending) => pending,
        };

        let result = pending.clone().await;
        self.settle(&pending, &result);
        result
    }

    /// Start loading in the background, logging instead of returning failures
    ///
    /// The import is registered before this returns, so a `load` issued right
    /// after shares it. Without a tokio runtime the import is only registered
    /// and runs on the next `load`.
    pub fn preload(&self) {
        let pending = match self.begin() {
            Begin::Ready(_) => return,
            Begin::Pending(pending) => pending,
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!("No runtime available, preload deferred to first load");
                return;
            }
        };

        let this = self.clone();
        handle.spawn(async move {
            let result = pending.clone().await;
            this.settle(&pending, &result);
            if let Err(e) = result {
                tracing::warn!(error = %e, "Component preload failed");
            }
        });
    }

    /// The loaded module, if the import has already succeeded
    pub fn loaded(&self) -> Option<ComponentModule> {
        self.inner.slot.lock().module.clone()
    }

    /// Whether the import has already succeeded
    pub fn is_loaded(&self) -> bool {
        self.inner.slot.lock().module.is_some()
    }

    /// Whether an import is currently in flight
    pub fn is_loading(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Return the cached module or the shared import, starting it if needed.
    /// Never suspends, so a second synchronous caller sees the stored import.
    fn begin(&self) -> Begin {
        let mut slot = self.inner.slot.lock();

        if let Some(module) = &slot.module {
            return Begin::Ready(module.clone());
        }

        if let Some(pending) = &slot.pending {
            return Begin::Pending(pending.clone());
        }

        tracing::debug!("Starting component import");
        let pending = (self.inner.import)().shared();
        slot.pending = Some(pending.clone());
        Begin::Pending(pending)
    }

    fn settle(&self, pending: &SharedImport, result: &Result<ComponentModule>) {
        let mut slot = self.inner.slot.lock();
        let is_current = slot.pending.as_ref().is_some_and(|p| p.ptr_eq(pending));

        if let Ok(module) = result {
            if slot.module.is_none() {
                slot.module = Some(module.clone());
            }
        }

        if is_current {
            slot.pending = None;
        }
    }
}

impl fmt::Debug for LazyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.slot.lock();
        f.debug_struct("LazyComponent")
            .field("loaded", &slot.module.is_some())
            .field("loading", &slot.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_lazy(calls: Arc<AtomicUsize>, name: &'static str) -> LazyComponent {
        lazy(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(ComponentModule::new(ComponentClass::new(name)))
            }
        })
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_import() {
        let calls = Arc::new(AtomicUsize::new(0));
        let component = counting_lazy(Arc::clone(&calls), "UserProfile");

        let results =
            futures::future::join_all((0..8).map(|_| component.load())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].as_ref().unwrap().class().clone();
        for result in &results {
            assert!(result.as_ref().unwrap().class().ptr_eq(&first));
        }
        assert!(component.is_loaded());
        assert!(!component.is_loading());
    }

    #[tokio::test]
    async fn test_loaded_module_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let component = counting_lazy(Arc::clone(&calls), "UserProfile");

        component.load().await.unwrap();
        component.load().await.unwrap();
        component.clone().load().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_import_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let component = lazy(move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(LoadError::Import("network down".to_string()))
                } else {
                    Ok(ComponentModule::new(ComponentClass::new("Retry")))
                }
            }
        });

        let err = component.load().await.unwrap_err();
        assert_eq!(err, LoadError::Import("network down".to_string()));
        assert!(!component.is_loading());
        assert!(!component.is_loaded());

        let module = component.load().await.unwrap();
        assert_eq!(module.class().name(), "Retry");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_preload_is_shared_with_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let component = counting_lazy(Arc::clone(&calls), "Drawer");

        component.preload();
        assert!(component.is_loading());
        component.load().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preload_swallows_errors() {
        let component = lazy(|| async { Err(LoadError::Import("boom".to_string())) });

        component.preload();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!component.is_loaded());
        assert!(!component.is_loading());
    }

    #[tokio::test]
    async fn test_separate_instances_do_not_share_cache() {
        let calls_a = Arc::new(AtomicUsize::new(0));
        let calls_b = Arc::new(AtomicUsize::new(0));
        let a = counting_lazy(Arc::clone(&calls_a), "Alpha");
        let b = counting_lazy(Arc::clone(&calls_b), "Beta");

        a.load().await.unwrap();
        assert!(!b.is_loaded());

        let module = b.load().await.unwrap();
        assert_eq!(module.class().name(), "Beta");
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(calls_b.load(Ordering::SeqCst), 1);
        assert!(!a.ptr_eq(&b));
    }
}
