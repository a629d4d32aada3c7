//! Registry entry variants and call arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use serde_json::Value;

use crate::admin::AdminView;
use crate::error::ResolveError;
use crate::view::{ViewFn, ViewFuture};

/// Positional and keyword arguments supplied when a deferred target is a
/// factory that must be called to obtain the real view.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(key.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// A class-based view: a single shared instance dispatching every request.
///
/// Types implementing this trait are registered with
/// [`ViewRegistry::register_class`](crate::registry::ViewRegistry::register_class)
/// and adapted into a plain [`ViewFn`] when a deferred path resolves to them.
pub trait ClassView: Send + Sync + 'static {
    /// Handle one request.
    fn dispatch(&self, req: Request<Body>) -> ViewFuture;

    /// Doc string forwarded through lazy introspection.
    fn doc(&self) -> Option<&str> {
        None
    }
}

/// Adapt a class-based view type into a dispatchable [`ViewFn`].
///
/// `name` becomes part of the view's identity for introspection; the host
/// derives it from the dotted path when resolving lazily.
pub fn as_view<T>(name: &str) -> ViewFn
where
    T: ClassView + Default,
{
    let instance = Arc::new(T::default());
    let doc = instance.doc().map(|d| d.to_owned());
    let name = name.to_owned();
    let view = ViewFn::new(move |req| {
        let instance = Arc::clone(&instance);
        tracing::trace!(view = %name, "dispatching class-based view");
        async move { instance.dispatch(req).await }
    });
    match doc {
        Some(doc) => view.with_doc(doc),
        None => view,
    }
}

type FactoryFn = dyn Fn(&CallArgs) -> Result<ViewFn, ResolveError> + Send + Sync;
type AdminFactoryFn = dyn Fn(&CallArgs) -> Result<Arc<dyn AdminView>, ResolveError> + Send + Sync;
type ClassAdapterFn = dyn Fn(&str) -> ViewFn + Send + Sync;

/// What a dotted path can resolve to.
#[derive(Clone)]
pub enum ViewEntry {
    /// A plain view function, used as-is.
    Func(ViewFn),
    /// A class-based view type, adapted via `as_view` with a name derived
    /// from the dotted path.
    Class(Arc<ClassAdapterFn>),
    /// A factory called with the proxy's [`CallArgs`] to obtain the view.
    Factory(Arc<FactoryFn>),
    /// A factory producing an admin view instance for `add_admin`.
    Admin(Arc<AdminFactoryFn>),
}

impl ViewEntry {
    pub fn func(view: ViewFn) -> Self {
        ViewEntry::Func(view)
    }

    pub fn class<T>() -> Self
    where
        T: ClassView + Default,
    {
        ViewEntry::Class(Arc::new(|name| as_view::<T>(name)))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<ViewFn, ResolveError> + Send + Sync + 'static,
    {
        ViewEntry::Factory(Arc::new(factory))
    }

    pub fn admin<F>(factory: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Arc<dyn AdminView>, ResolveError> + Send + Sync + 'static,
    {
        ViewEntry::Admin(Arc::new(factory))
    }
}

impl fmt::Debug for ViewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ViewEntry::Func(_) => "Func",
            ViewEntry::Class(_) => "Class",
            ViewEntry::Factory(_) => "Factory",
            ViewEntry::Admin(_) => "Admin",
        };
        write!(f, "ViewEntry::{kind}")
    }
}

/// A registered entry plus the origin id stamped on every view it produces.
#[derive(Debug, Clone)]
pub(crate) struct RegisteredEntry {
    pub entry: ViewEntry,
    pub origin: u64,
}

impl RegisteredEntry {
    pub fn new(entry: ViewEntry, origin: u64) -> Self {
        Self { entry, origin }
    }
}
