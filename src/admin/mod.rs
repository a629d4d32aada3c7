//! Administrative panel extension.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     app.attach_admin(AdminExt::new("/admin"))
//!     registrar.add_admin(target, args)
//!         → resolve target (direct instance or registry admin factory)
//!         → AdminExt::add_view(instance)
//!
//! Router build:
//!     each admin view mounted at "<base>/<view url>"
//! ```
//!
//! # Design Decisions
//! - Admin registration is application-only; blueprints are rejected upstream
//! - Views are trait objects so panels can come from any module
//! - The extension lives in the app's extensions map under the "admin" key

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;

use crate::view::ViewFuture;

/// Key under which the extension is stored in the app's extensions map.
pub const ADMIN_EXTENSION: &str = "admin";

/// A panel view registered with the admin extension.
pub trait AdminView: Send + Sync + 'static {
    /// Human-readable panel name.
    fn name(&self) -> &str;

    /// Path segment the panel is mounted under, relative to the extension's
    /// base path.
    fn url(&self) -> String {
        self.name().to_lowercase().replace(' ', "-")
    }

    /// Handle one request to the panel.
    fn dispatch(&self, req: Request<Body>) -> ViewFuture;
}

/// The admin extension: a base mount path plus the registered panel views.
#[derive(Clone)]
pub struct AdminExt {
    base_path: String,
    views: Arc<Mutex<Vec<Arc<dyn AdminView>>>>,
}

impl AdminExt {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            views: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Register a panel view.
    pub fn add_view(&self, view: Arc<dyn AdminView>) {
        tracing::debug!(name = view.name(), "registered admin view");
        self.views.lock().expect("admin lock poisoned").push(view);
    }

    /// Snapshot of the registered views, in registration order.
    pub fn views(&self) -> Vec<Arc<dyn AdminView>> {
        self.views.lock().expect("admin lock poisoned").clone()
    }
}

impl Default for AdminExt {
    fn default() -> Self {
        Self::new("/admin")
    }
}
