//! The lazy view proxy.

use std::fmt;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use once_cell::sync::OnceCell;

use crate::error::ResolveError;
use crate::registry::{CallArgs, ViewEntry, ViewRegistry};
use crate::view::ViewFn;

/// A stand-in for a view that is resolved against the registry only when the
/// first matching request arrives (or when first introspected).
///
/// Resolution happens at most once per instance; the outcome is cached in a
/// once-cell and reused for the instance's lifetime. Failures are reported on
/// every call but are never cached, so a path registered after the first
/// failed request starts working on the next one.
pub struct LazyView {
    registry: ViewRegistry,
    import_name: String,
    args: CallArgs,
    resolved: OnceCell<ViewFn>,
}

impl LazyView {
    /// Create a proxy for `import_name`, resolved against `registry`.
    pub fn new(registry: ViewRegistry, import_name: impl Into<String>) -> Self {
        Self {
            registry,
            import_name: import_name.into(),
            args: CallArgs::new(),
            resolved: OnceCell::new(),
        }
    }

    /// Create a proxy whose target is a factory called with `args` to obtain
    /// the real view.
    pub fn with_args(registry: ViewRegistry, import_name: impl Into<String>, args: CallArgs) -> Self {
        Self {
            registry,
            import_name: import_name.into(),
            args,
            resolved: OnceCell::new(),
        }
    }

    /// The dotted path this proxy resolves.
    pub fn import_name(&self) -> &str {
        &self.import_name
    }

    /// Resolve the target, caching the result. Subsequent calls return the
    /// cached view without consulting the registry again.
    pub fn resolve(&self) -> Result<&ViewFn, ResolveError> {
        self.resolved.get_or_try_init(|| {
            let registered = self.registry.lookup(&self.import_name)?;
            let origin = registered.origin;
            let view = match registered.entry {
                ViewEntry::Func(view) => {
                    if !self.args.is_empty() {
                        return Err(ResolveError::NotAFactory(self.import_name.clone()));
                    }
                    view
                }
                ViewEntry::Class(adapt) => adapt(&derive_view_name(&self.import_name)),
                ViewEntry::Factory(factory) => factory(&self.args)?,
                ViewEntry::Admin(_) => {
                    return Err(ResolveError::NotAFactory(self.import_name.clone()))
                }
            };
            tracing::debug!(path = %self.import_name, "resolved lazy view");
            Ok(view.with_origin(origin))
        })
    }

    /// Dispatch a request, resolving first if needed.
    ///
    /// A resolution failure becomes a 500 response; the error is logged, not
    /// propagated, since by this point we are inside the request cycle.
    pub async fn call(&self, req: Request<Body>) -> Response {
        match self.resolve() {
            Ok(view) => view.call(req).await,
            Err(err) => {
                tracing::error!(path = %self.import_name, error = %err, "lazy view failed to resolve");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    /// Doc string of the resolved target; `None` when resolution fails.
    pub fn description(&self) -> Option<String> {
        self.resolve().ok()?.doc().map(str::to_owned)
    }

    /// Textual representation: the resolved target's when resolution
    /// succeeds, a generic unresolved form otherwise.
    pub fn display(&self) -> String {
        match self.resolve() {
            Ok(view) => format!("view {:?} for {:?}", view, self.import_name),
            Err(_) => format!("<lazy view {:?}>", self.import_name),
        }
    }
}

/// Two proxies are equal when their resolved targets are the same underlying
/// registry entry. Any resolution failure compares unequal; equality never
/// propagates resolution errors.
impl PartialEq for LazyView {
    fn eq(&self, other: &Self) -> bool {
        match (self.resolve(), other.resolve()) {
            (Ok(a), Ok(b)) => a.same_target(b),
            _ => false,
        }
    }
}

impl fmt::Display for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView")
            .field("import_name", &self.import_name)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

/// View name for class-based adaptation: the dotted path lower-cased with the
/// literal substring `"view"` stripped.
fn derive_view_name(path: &str) -> String {
    path.to_lowercase().replace("view", "")
}
