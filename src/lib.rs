//! Lazy route registration for axum applications and blueprints.
//!
//! Routes can target a dotted view path (`"testapp.views.home"`) instead of a
//! ready callable; the path is resolved against a [`ViewRegistry`] only when
//! the first matching request arrives, and the resolution is cached. On top
//! of that sits a [`RouteRegistrar`] façade with helpers for static-file
//! routes, template-rendering routes, error handlers, and admin panel views,
//! all registered onto an [`App`] or a [`Blueprint`].
//!
//! ```no_run
//! use axum::response::IntoResponse;
//! use lazy_routes::{App, RouteOptions, RouteRegistrar, ViewFn};
//!
//! let app = App::new("testapp");
//! app.registry().register_view(
//!     "testapp.views",
//!     "home",
//!     ViewFn::new(|_req| async { "hello".into_response() }),
//! );
//!
//! let registrar = RouteRegistrar::bound(app.clone(), Some("testapp")).unwrap();
//! registrar.add("/", "views.home", RouteOptions::new()).unwrap();
//!
//! let router = app.into_router();
//! # let _ = router;
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod host;
pub mod observability;
pub mod registrar;
pub mod registry;
pub mod view;

pub use admin::{AdminExt, AdminView};
pub use config::{load_routes, RoutesConfig};
pub use error::{RegistrarError, ResolveError, TemplateError};
pub use host::{App, Blueprint, ErrorContext, Host, RouteOptions, RouteRule, Templates, ViewArgs};
pub use registrar::{AdminTarget, RouteRegistrar, RouteTarget, TemplateContext};
pub use registry::{CallArgs, ClassView, ViewEntry, ViewRegistry};
pub use view::{BoundView, LazyView, ViewFn};
