//! Modular sub-application host.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;

use crate::error::RegistrarError;
use crate::host::statics;
use crate::host::templates::Templates;
use crate::host::{RouteRule, GENERIC_IMPORT_NAME};
use crate::registry::ViewRegistry;
use crate::view::{BoundView, ViewFn};

struct BlueprintInner {
    import_name: String,
    rules: Vec<RouteRule>,
    error_views: HashMap<u16, BoundView>,
    app_error_views: HashMap<u16, BoundView>,
    static_root: Option<PathBuf>,
    templates: Templates,
    registry: ViewRegistry,
}

/// A mountable sub-application: collects rules and error handlers of its own,
/// merged into an [`App`](crate::host::App) via `register_blueprint`.
///
/// Clones share the same underlying blueprint.
#[derive(Clone)]
pub struct Blueprint {
    inner: Arc<Mutex<BlueprintInner>>,
}

impl Blueprint {
    pub fn new(import_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BlueprintInner {
                import_name: import_name.into(),
                rules: Vec::new(),
                error_views: HashMap::new(),
                app_error_views: HashMap::new(),
                static_root: None,
                templates: Templates::new(),
                registry: ViewRegistry::new(),
            })),
        }
    }

    /// A blueprint with the generic `"main"` import name.
    pub fn unnamed() -> Self {
        Self::new(GENERIC_IMPORT_NAME)
    }

    pub fn import_name(&self) -> String {
        self.lock().import_name.clone()
    }

    pub fn registry(&self) -> ViewRegistry {
        self.lock().registry.clone()
    }

    pub fn templates(&self) -> Templates {
        self.lock().templates.clone()
    }

    pub fn set_static_root(&self, root: impl Into<PathBuf>) {
        self.lock().static_root = Some(root.into());
    }

    pub fn static_view(&self) -> ViewFn {
        statics::static_view(self.lock().static_root.clone())
    }

    pub fn add_url_rule(&self, rule: RouteRule) -> Result<(), RegistrarError> {
        let mut inner = self.lock();
        if inner.rules.iter().any(|r| {
            r.pattern == rule.pattern
                && r.effective_methods()
                    .iter()
                    .any(|m| rule.effective_methods().contains(m))
        }) {
            return Err(RegistrarError::DuplicateRule {
                pattern: rule.pattern,
            });
        }
        tracing::debug!(
            blueprint = %inner.import_name,
            pattern = %rule.pattern,
            "added blueprint url rule"
        );
        inner.rules.push(rule);
        Ok(())
    }

    /// Register an error view local to this blueprint's rules.
    pub fn register_error_handler(&self, status: StatusCode, view: BoundView) {
        self.lock().error_views.insert(status.as_u16(), view);
    }

    /// Register an error view destined for the application-level table; it
    /// takes effect when the blueprint is registered on an app.
    pub fn register_app_error_handler(&self, status: StatusCode, view: BoundView) {
        self.lock().app_error_views.insert(status.as_u16(), view);
    }

    /// Snapshot of rules and error tables, consumed by
    /// [`App::register_blueprint`](crate::host::App::register_blueprint).
    pub(crate) fn parts(
        &self,
    ) -> (
        Vec<RouteRule>,
        HashMap<u16, BoundView>,
        HashMap<u16, BoundView>,
    ) {
        let inner = self.lock();
        (
            inner.rules.clone(),
            inner.error_views.clone(),
            inner.app_error_views.clone(),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BlueprintInner> {
        self.inner.lock().expect("blueprint lock poisoned")
    }
}
