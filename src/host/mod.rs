//! Host layer: applications, blueprints, and router assembly.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     App::new("testapp") / Blueprint::new("testapp.test")
//!     registrar.add(...) → Host::add_url_rule(RouteRule)
//!     app.register_blueprint(bp, "/test")
//!         → bp rules re-prefixed and merged into the app
//!         → bp app-level error handlers merged into the app table
//!
//! Serving:
//!     app.into_router() → axum::Router
//!         each rule → handler that merges path params + rule defaults
//!         into a ViewArgs extension, dispatches the BoundView, and
//!         re-routes error statuses through registered error views
//! ```
//!
//! # Design Decisions
//! - Hosts are clonable handles over Arc<Mutex<inner>>; registration is a
//!   startup-time activity, so an uncontended mutex is enough
//! - Route patterns use axum's syntax ("/page/{page_id}", "/{*rest}")
//! - Blueprint-local error handlers apply only to the blueprint's own rules;
//!   app-level handlers apply everywhere
//! - An app constructed without an import name gets the "main" placeholder,
//!   which cannot anchor relative import prefixes

pub mod app;
pub mod blueprint;
pub mod statics;
pub mod templates;

pub use app::App;
pub use blueprint::Blueprint;
pub use templates::Templates;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::Value;

use crate::error::RegistrarError;
use crate::registry::ViewRegistry;
use crate::view::{BoundView, ViewFn};

/// Import name given to hosts constructed without one; relative import
/// prefixes cannot be resolved against it.
pub const GENERIC_IMPORT_NAME: &str = "main";

/// Per-rule registration options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// HTTP methods the rule answers to; empty means GET.
    pub methods: Vec<Method>,
    /// Endpoint name for logging and introspection; defaults to the pattern.
    pub endpoint: Option<String>,
    /// Default view arguments, merged under the request's path parameters.
    pub defaults: BTreeMap<String, Value>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn default_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }
}

/// A registered URL rule, as stored in a host's route table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: String,
    pub options: RouteOptions,
    pub view: BoundView,
    /// Error views scoped to this rule (set when the rule came in through a
    /// blueprint with local error handlers).
    pub local_errors: Option<Arc<HashMap<u16, BoundView>>>,
}

impl RouteRule {
    pub fn new(pattern: impl Into<String>, options: RouteOptions, view: BoundView) -> Self {
        Self {
            pattern: pattern.into(),
            options,
            view,
            local_errors: None,
        }
    }

    /// Methods this rule answers to, with the GET default applied.
    pub fn effective_methods(&self) -> Vec<Method> {
        if self.options.methods.is_empty() {
            vec![Method::GET]
        } else {
            self.options.methods.clone()
        }
    }

    /// Endpoint name for logs: explicit or derived from the pattern.
    pub fn endpoint(&self) -> &str {
        self.options.endpoint.as_deref().unwrap_or(&self.pattern)
    }
}

/// View arguments available to a view through the request extensions: the
/// rule's default arguments overlaid with the matched path parameters.
#[derive(Debug, Clone, Default)]
pub struct ViewArgs(BTreeMap<String, Value>);

impl ViewArgs {
    pub fn new(args: BTreeMap<String, Value>) -> Self {
        Self(args)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Inserted into the synthetic request an error view receives.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext {
    /// The status the original response carried.
    pub status: StatusCode,
}

/// A bound registration target: a top-level application or a blueprint.
#[derive(Clone)]
pub enum Host {
    App(App),
    Blueprint(Blueprint),
}

impl Host {
    pub fn import_name(&self) -> String {
        match self {
            Host::App(app) => app.import_name(),
            Host::Blueprint(bp) => bp.import_name(),
        }
    }

    pub fn registry(&self) -> ViewRegistry {
        match self {
            Host::App(app) => app.registry(),
            Host::Blueprint(bp) => bp.registry(),
        }
    }

    pub fn templates(&self) -> Templates {
        match self {
            Host::App(app) => app.templates(),
            Host::Blueprint(bp) => bp.templates(),
        }
    }

    /// The host's built-in static-file view, reading from its static root.
    pub fn static_view(&self) -> ViewFn {
        match self {
            Host::App(app) => app.static_view(),
            Host::Blueprint(bp) => bp.static_view(),
        }
    }

    pub fn add_url_rule(&self, rule: RouteRule) -> Result<(), RegistrarError> {
        match self {
            Host::App(app) => app.add_url_rule(rule),
            Host::Blueprint(bp) => bp.add_url_rule(rule),
        }
    }

    /// Register an error view local to this host.
    pub fn register_error_handler(&self, status: StatusCode, view: BoundView) {
        match self {
            Host::App(app) => app.register_error_handler(status, view),
            Host::Blueprint(bp) => bp.register_error_handler(status, view),
        }
    }

    /// Register an application-level error view. On an app host this is the
    /// same table as [`Host::register_error_handler`]; on a blueprint it is
    /// merged into the app when the blueprint is registered.
    pub fn app_error_handler(&self, status: StatusCode, view: BoundView) {
        match self {
            Host::App(app) => app.register_error_handler(status, view),
            Host::Blueprint(bp) => bp.register_app_error_handler(status, view),
        }
    }
}

impl From<App> for Host {
    fn from(app: App) -> Self {
        Host::App(app)
    }
}

impl From<Blueprint> for Host {
    fn from(bp: Blueprint) -> Self {
        Host::Blueprint(bp)
    }
}
