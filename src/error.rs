//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised by [`RouteRegistrar`](crate::registrar::RouteRegistrar)
/// operations at registration time.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// A registration method was called before a host was bound.
    #[error("registrar is not bound to an application or blueprint")]
    Unbound,

    /// A relative import prefix (leading `.`) was combined with a host whose
    /// import name is the generic `"main"` placeholder, so there is nothing
    /// meaningful to prepend.
    #[error(
        "cannot resolve relative import prefix {prefix:?}: host {host:?} has no usable import name"
    )]
    AmbiguousPrefix { prefix: String, host: String },

    /// An application-only operation was attempted on a blueprint host.
    #[error("cannot register admin views on blueprint {0:?}")]
    BlueprintHost(String),

    /// The bound application has no admin extension attached.
    #[error("no admin extension attached to application {0:?}")]
    MissingExtension(String),

    /// A rule with the same pattern and overlapping methods already exists.
    #[error("a rule for {pattern:?} is already registered")]
    DuplicateRule { pattern: String },

    /// A deferred admin target failed to resolve. Admin registration is the
    /// one place resolution is eager, since it happens at startup by design.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised when a lazy view fails to resolve against the registry.
///
/// Both `ModuleNotFound` and `ViewNotFound` are the same kind of failure from
/// the caller's point of view: the dotted path does not name a registered
/// view. They are raised at first use, never at registration time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No module is registered under the given path.
    #[error("no module registered under {0:?}")]
    ModuleNotFound(String),

    /// The module exists but has no entry with the given name.
    #[error("module {module:?} has no view named {name:?}")]
    ViewNotFound { module: String, name: String },

    /// Call arguments were supplied but the entry is a plain view function,
    /// not a factory.
    #[error("{0:?} is not a view factory and cannot take call arguments")]
    NotAFactory(String),

    /// An admin view was requested but the entry does not produce one.
    #[error("{0:?} does not resolve to an admin view")]
    NotAnAdminView(String),
}

/// Errors raised while rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {0:?} is not registered")]
    UnknownTemplate(String),

    #[error("template rendering failed: {0}")]
    Render(#[from] minijinja::Error),
}
