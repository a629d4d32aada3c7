//! Type-erased view callables.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::view::lazy::LazyView;

/// Boxed future returned by every view invocation.
pub type ViewFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

type ViewInner = dyn Fn(Request<Body>) -> ViewFuture + Send + Sync;

/// A cheaply clonable, type-erased async view function.
///
/// Carries an optional doc string for introspection and an origin id used for
/// resolved-value equality: every `ViewFn` produced from the same registry
/// entry shares the entry's origin, even when the entry manufactures a fresh
/// closure per resolution (class views, factories).
#[derive(Clone)]
pub struct ViewFn {
    func: Arc<ViewInner>,
    doc: Option<Arc<str>>,
    origin: Option<u64>,
}

impl ViewFn {
    /// Wrap an async function from a raw request to a response.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            func: Arc::new(move |req: Request<Body>| -> ViewFuture { Box::pin(func(req)) }),
            doc: None,
            origin: None,
        }
    }

    /// Attach a doc string, the analogue of the wrapped function's docstring.
    pub fn with_doc(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub(crate) fn with_origin(mut self, origin: u64) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Invoke the view.
    pub fn call(&self, req: Request<Body>) -> ViewFuture {
        (self.func)(req)
    }

    /// The view's doc string, if one was attached.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Whether two views come from the same underlying target.
    ///
    /// Views produced by the same registry entry share an origin id; views
    /// built directly are compared by function pointer identity.
    pub fn same_target(&self, other: &ViewFn) -> bool {
        match (self.origin, other.origin) {
            (Some(a), Some(b)) => a == b,
            _ => Arc::ptr_eq(&self.func, &other.func),
        }
    }
}

impl fmt::Debug for ViewFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewFn")
            .field("doc", &self.doc)
            .field("origin", &self.origin)
            .finish()
    }
}

impl PartialEq for ViewFn {
    fn eq(&self, other: &Self) -> bool {
        self.same_target(other)
    }
}

/// A view as stored in a host's route table: either resolved up front or
/// deferred behind a [`LazyView`] proxy.
#[derive(Clone)]
pub enum BoundView {
    Direct(ViewFn),
    Lazy(Arc<LazyView>),
}

impl BoundView {
    /// Dispatch a request to the view, resolving lazily if needed.
    pub fn call(&self, req: Request<Body>) -> ViewFuture {
        match self {
            BoundView::Direct(view) => view.call(req),
            BoundView::Lazy(lazy) => {
                let lazy = Arc::clone(lazy);
                Box::pin(async move { lazy.call(req).await })
            }
        }
    }

    /// The view's doc string, if available without failing resolution.
    pub fn doc(&self) -> Option<String> {
        match self {
            BoundView::Direct(view) => view.doc().map(str::to_owned),
            BoundView::Lazy(lazy) => lazy.description(),
        }
    }
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundView::Direct(view) => write!(f, "BoundView::Direct({view:?})"),
            BoundView::Lazy(lazy) => write!(f, "BoundView::Lazy({})", lazy.display()),
        }
    }
}
