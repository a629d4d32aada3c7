//! View registry: the resolution source for deferred views.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     registry.register_view("pkg.views", "home", view)
//!     registry.register_class::<PageView>("pkg.views", "PageView")
//!     registry.register_factory("pkg.views", "make_page", factory)
//!
//! First request on a deferred route:
//!     "pkg.views.home"
//!         → rsplit '.' → module "pkg.views", name "home"
//!         → module table lookup (ModuleNotFound on miss)
//!         → entry lookup (ViewNotFound on miss)
//!         → adapt entry into a ViewFn
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit handle, not a process-wide singleton
//! - Entries carry a unique origin id so every ViewFn they produce can be
//!   compared by target identity
//! - Module and attribute misses are two variants of one resolution error

pub mod entry;

pub use entry::{as_view, CallArgs, ClassView, ViewEntry};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::ResolveError;
use crate::registry::entry::RegisteredEntry;

/// A shared table of named views, keyed by dotted module path.
///
/// Clones share the same underlying table.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    modules: Arc<RwLock<HashMap<String, HashMap<String, RegisteredEntry>>>>,
    next_origin: Arc<AtomicU64>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry under `module.name`, replacing any previous entry.
    pub fn register(&self, module: &str, name: &str, entry: ViewEntry) {
        let origin = self.next_origin.fetch_add(1, Ordering::Relaxed);
        let registered = RegisteredEntry::new(entry, origin);
        let mut modules = self.modules.write().expect("registry lock poisoned");
        modules
            .entry(module.to_owned())
            .or_default()
            .insert(name.to_owned(), registered);
        tracing::debug!(module, name, "registered view entry");
    }

    /// Register a plain view function.
    pub fn register_view(&self, module: &str, name: &str, view: crate::view::ViewFn) {
        self.register(module, name, ViewEntry::func(view));
    }

    /// Register a class-based view type, adapted per resolution via
    /// [`ClassView::as_view`] semantics.
    pub fn register_class<T>(&self, module: &str, name: &str)
    where
        T: ClassView + Default,
    {
        self.register(module, name, ViewEntry::class::<T>());
    }

    /// Look up `path` (last `.` separates module from attribute name) and
    /// return the matching entry together with its origin id.
    pub(crate) fn lookup(&self, path: &str) -> Result<RegisteredEntry, ResolveError> {
        let (module, name) = split_path(path);
        let modules = self.modules.read().expect("registry lock poisoned");
        let table = modules
            .get(module)
            .ok_or_else(|| ResolveError::ModuleNotFound(module.to_owned()))?;
        table
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::ViewNotFound {
                module: module.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Whether any entry is registered under `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_ok()
    }
}

/// Split a dotted path into its module portion and attribute name.
///
/// A path without a separator is treated as an attribute in the root module
/// (empty module path).
fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((module, name)) => (module, name),
        None => ("", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewFn;
    use axum::response::IntoResponse;

    fn dummy_view() -> ViewFn {
        ViewFn::new(|_req| async { "ok".into_response() })
    }

    #[test]
    fn test_lookup_missing_module() {
        let registry = ViewRegistry::new();
        let err = registry.lookup("pkg.views.home").unwrap_err();
        assert_eq!(err, ResolveError::ModuleNotFound("pkg.views".into()));
    }

    #[test]
    fn test_lookup_missing_attribute() {
        let registry = ViewRegistry::new();
        registry.register_view("pkg.views", "home", dummy_view());
        let err = registry.lookup("pkg.views.other").unwrap_err();
        assert_eq!(
            err,
            ResolveError::ViewNotFound {
                module: "pkg.views".into(),
                name: "other".into(),
            }
        );
    }

    #[test]
    fn test_lookup_hit() {
        let registry = ViewRegistry::new();
        registry.register_view("pkg.views", "home", dummy_view());
        assert!(registry.contains("pkg.views.home"));
        assert!(!registry.contains("pkg.views"));
    }

    #[test]
    fn test_split_path_without_separator() {
        assert_eq!(split_path("home"), ("", "home"));
        assert_eq!(split_path("pkg.views.home"), ("pkg.views", "home"));
    }
}
