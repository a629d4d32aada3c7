//! The route registrar façade.
//!
//! # Data Flow
//! ```text
//! RouteRegistrar::new()            (Unbound)
//!     .bind(host, import_prefix)   (Bound; relative prefixes resolved
//!                                   against the host's import name)
//!
//! add(pattern, target, options):
//!     Direct(view)        → used as-is
//!     Deferred(path,args) → build_import_name(path) → LazyView
//!     → Host::add_url_rule
//!
//! add_static / add_template / add_error / add_admin:
//!     thin delegation over the same target wrapping
//! ```
//!
//! # Design Decisions
//! - Every method other than the bind calls fails while unbound
//! - Deferred targets fail at first request, never at registration; a route
//!   can be registered before its view exists in the registry
//! - add_admin resolves eagerly: an admin panel missing from the registry is
//!   a registration-time error, matching its application-startup role

pub mod target;

pub use target::{AdminTarget, RouteTarget, TemplateContext};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

use crate::admin::AdminView;
use crate::error::{RegistrarError, ResolveError};
use crate::host::{Host, RouteOptions, RouteRule};
use crate::registry::{CallArgs, ViewEntry};
use crate::view::{BoundView, LazyView, ViewFn};

/// Registers routes, error handlers, static and template routes, and admin
/// views onto a bound application or blueprint, wrapping dotted-path targets
/// into lazy proxies.
#[derive(Default)]
pub struct RouteRegistrar {
    host: Option<Host>,
    import_prefix: Option<String>,
}

impl RouteRegistrar {
    /// An unbound registrar; call [`bind`](Self::bind) before registering.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registrar bound immediately.
    pub fn bound(
        host: impl Into<Host>,
        import_prefix: Option<&str>,
    ) -> Result<Self, RegistrarError> {
        let mut registrar = Self::new();
        registrar.bind(host, import_prefix)?;
        Ok(registrar)
    }

    /// Bind a host and store the import prefix.
    ///
    /// A prefix starting with `.` is relative to the host's own namespace and
    /// is resolved by prepending the host's import name; that fails when the
    /// host carries the generic `"main"` placeholder name. A `None` prefix
    /// keeps whatever prefix was stored earlier.
    pub fn bind(
        &mut self,
        host: impl Into<Host>,
        import_prefix: Option<&str>,
    ) -> Result<(), RegistrarError> {
        let host = host.into();
        let prefix = match import_prefix {
            Some(prefix) if prefix.starts_with('.') => {
                let name = host.import_name();
                if name == crate::host::GENERIC_IMPORT_NAME {
                    return Err(RegistrarError::AmbiguousPrefix {
                        prefix: prefix.to_owned(),
                        host: name,
                    });
                }
                Some(format!("{name}{prefix}"))
            }
            Some(prefix) => Some(prefix.to_owned()),
            None => self.import_prefix.take(),
        };
        self.import_prefix = prefix;
        self.host = Some(host);
        Ok(())
    }

    /// Alias of [`bind`](Self::bind) for binding a blueprint; there is no
    /// behavioral difference, the name exists for call-site clarity.
    pub fn bind_for_secondary_host(
        &mut self,
        host: impl Into<Host>,
        import_prefix: Option<&str>,
    ) -> Result<(), RegistrarError> {
        self.bind(host, import_prefix)
    }

    /// Join the stored prefix and `name` with a `.`, omitting empty parts.
    pub fn build_import_name(&self, name: &str) -> String {
        let parts: Vec<&str> = [self.import_prefix.as_deref().unwrap_or(""), name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(".")
    }

    /// Register a URL rule. String targets are deferred until first request.
    pub fn add(
        &self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        options: RouteOptions,
    ) -> Result<(), RegistrarError> {
        let host = self.host()?;
        let view = self.wrap_target(host, target.into());
        host.add_url_rule(RouteRule::new(pattern, options, view))
    }

    /// Register a rule serving files from the host's static root. When
    /// `filename` is given it becomes the rule's default `filename` argument,
    /// so a fixed file can back a fixed pattern.
    pub fn add_static(
        &self,
        pattern: &str,
        filename: Option<&str>,
        mut options: RouteOptions,
    ) -> Result<(), RegistrarError> {
        let host = self.host()?;
        if let Some(filename) = filename {
            options = options.default_arg("filename", filename);
        }
        self.add(pattern, RouteTarget::Direct(host.static_view()), options)
    }

    /// Register a rule rendering `template_name` through the host's template
    /// engine. Dynamic contexts are re-evaluated on every request.
    pub fn add_template(
        &self,
        pattern: &str,
        template_name: &str,
        context: impl Into<TemplateContext>,
        options: RouteOptions,
    ) -> Result<(), RegistrarError> {
        let host = self.host()?;
        let templates = host.templates();
        let name = template_name.to_owned();
        let context = context.into();

        let view = ViewFn::new(move |_req| {
            let templates = templates.clone();
            let name = name.clone();
            let context = context.clone();
            async move {
                let ctx = context.evaluate();
                match templates.render(&name, &ctx) {
                    Ok(body) => Html(body).into_response(),
                    Err(err) => {
                        tracing::error!(template = %name, error = %err, "template rendering failed");
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    }
                }
            }
        })
        .with_doc("Render a named template with a per-request context.");

        self.add(pattern, RouteTarget::Direct(view), options)
    }

    /// Register an error view for `status`. With `app = true` on a blueprint
    /// host the view goes to the application-level table instead of the
    /// blueprint-local one.
    pub fn add_error(
        &self,
        status: StatusCode,
        target: impl Into<RouteTarget>,
        app: bool,
    ) -> Result<(), RegistrarError> {
        let host = self.host()?;
        let view = self.wrap_target(host, target.into());
        if app {
            host.app_error_handler(status, view);
        } else {
            host.register_error_handler(status, view);
        }
        Ok(())
    }

    /// Register an application-level error view from a blueprint.
    pub fn add_app_error(
        &self,
        status: StatusCode,
        target: impl Into<RouteTarget>,
    ) -> Result<(), RegistrarError> {
        self.add_error(status, target, true)
    }

    /// Register an admin panel view. Application hosts only; the admin
    /// extension must already be attached. Deferred targets must name an
    /// admin factory entry, which is invoked with `args` right away.
    pub fn add_admin(
        &self,
        target: impl Into<AdminTarget>,
        args: CallArgs,
    ) -> Result<(), RegistrarError> {
        let host = self.host()?;
        let app = match host {
            Host::App(app) => app,
            Host::Blueprint(bp) => {
                return Err(RegistrarError::BlueprintHost(bp.import_name()));
            }
        };
        let admin = app
            .admin()
            .ok_or_else(|| RegistrarError::MissingExtension(app.import_name()))?;

        let view: Arc<dyn AdminView> = match target.into() {
            AdminTarget::Instance(view) => view,
            AdminTarget::Deferred(path) => {
                let path = self.build_import_name(&path);
                let registered = app.registry().lookup(&path)?;
                match registered.entry {
                    ViewEntry::Admin(factory) => factory(&args)?,
                    _ => return Err(ResolveError::NotAnAdminView(path).into()),
                }
            }
        };
        admin.add_view(view);
        Ok(())
    }

    fn host(&self) -> Result<&Host, RegistrarError> {
        self.host.as_ref().ok_or(RegistrarError::Unbound)
    }

    fn wrap_target(&self, host: &Host, target: RouteTarget) -> BoundView {
        match target {
            RouteTarget::Direct(view) => BoundView::Direct(view),
            RouteTarget::Deferred(path, args) => {
                let import_name = self.build_import_name(&path);
                BoundView::Lazy(Arc::new(LazyView::with_args(
                    host.registry(),
                    import_name,
                    args,
                )))
            }
        }
    }
}
