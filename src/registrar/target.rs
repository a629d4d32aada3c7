//! Registration target variants.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::admin::AdminView;
use crate::registry::CallArgs;
use crate::view::ViewFn;

/// What `add` accepts: a ready view or a dotted path resolved lazily at first
/// request.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    Direct(ViewFn),
    Deferred(String, CallArgs),
}

impl RouteTarget {
    /// A deferred target whose registry entry is a factory called with `args`
    /// at resolution time.
    pub fn deferred_with(path: impl Into<String>, args: CallArgs) -> Self {
        RouteTarget::Deferred(path.into(), args)
    }
}

impl From<&str> for RouteTarget {
    fn from(path: &str) -> Self {
        RouteTarget::Deferred(path.to_owned(), CallArgs::new())
    }
}

impl From<String> for RouteTarget {
    fn from(path: String) -> Self {
        RouteTarget::Deferred(path, CallArgs::new())
    }
}

impl From<ViewFn> for RouteTarget {
    fn from(view: ViewFn) -> Self {
        RouteTarget::Direct(view)
    }
}

/// What `add_admin` accepts.
#[derive(Clone)]
pub enum AdminTarget {
    Instance(Arc<dyn AdminView>),
    Deferred(String),
}

impl From<&str> for AdminTarget {
    fn from(path: &str) -> Self {
        AdminTarget::Deferred(path.to_owned())
    }
}

impl From<String> for AdminTarget {
    fn from(path: String) -> Self {
        AdminTarget::Deferred(path)
    }
}

impl From<Arc<dyn AdminView>> for AdminTarget {
    fn from(view: Arc<dyn AdminView>) -> Self {
        AdminTarget::Instance(view)
    }
}

impl fmt::Debug for AdminTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminTarget::Instance(view) => write!(f, "AdminTarget::Instance({:?})", view.name()),
            AdminTarget::Deferred(path) => write!(f, "AdminTarget::Deferred({path:?})"),
        }
    }
}

type ContextFn = dyn Fn() -> Map<String, Value> + Send + Sync;

/// Context for template-rendering routes: a fixed mapping reused across
/// requests, or a callable re-evaluated on every request.
#[derive(Clone, Default)]
pub enum TemplateContext {
    #[default]
    Empty,
    Static(Map<String, Value>),
    Dynamic(Arc<ContextFn>),
}

impl TemplateContext {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> Map<String, Value> + Send + Sync + 'static,
    {
        TemplateContext::Dynamic(Arc::new(f))
    }

    /// The context for one request. Dynamic contexts are evaluated fresh on
    /// every call.
    pub fn evaluate(&self) -> Map<String, Value> {
        match self {
            TemplateContext::Empty => Map::new(),
            TemplateContext::Static(map) => map.clone(),
            TemplateContext::Dynamic(f) => f(),
        }
    }
}

impl From<Map<String, Value>> for TemplateContext {
    fn from(map: Map<String, Value>) -> Self {
        TemplateContext::Static(map)
    }
}

impl fmt::Debug for TemplateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateContext::Empty => write!(f, "TemplateContext::Empty"),
            TemplateContext::Static(map) => write!(f, "TemplateContext::Static({map:?})"),
            TemplateContext::Dynamic(_) => write!(f, "TemplateContext::Dynamic"),
        }
    }
}
