//! Routes file schema.

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistrarError;
use crate::host::RouteOptions;
use crate::registrar::{RouteRegistrar, TemplateContext};

/// Root of a routes file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutesConfig {
    /// Plain routes targeting dotted view paths.
    pub routes: Vec<RouteEntry>,

    /// Static-file routes.
    pub static_routes: Vec<StaticEntry>,

    /// Template-rendering routes.
    pub template_routes: Vec<TemplateEntry>,

    /// Error handlers keyed by HTTP status.
    pub error_handlers: Vec<ErrorEntry>,
}

/// One URL rule targeting a dotted view path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteEntry {
    /// Route pattern, axum syntax (e.g. "/page/{page_id}").
    pub pattern: String,

    /// Dotted path of the view, resolved lazily at first request.
    pub view: String,

    /// HTTP methods; empty means GET.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Endpoint name for logging.
    pub endpoint: Option<String>,
}

/// One static-file rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticEntry {
    pub pattern: String,

    /// Fixed file to serve; when absent, the pattern must capture
    /// `{*filename}` itself.
    pub filename: Option<String>,

    pub endpoint: Option<String>,
}

/// One template-rendering rule with a fixed context.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateEntry {
    pub pattern: String,

    /// Template name known to the host's template engine.
    pub template: String,

    /// Static context mapping passed to every render.
    #[serde(default)]
    pub context: Map<String, Value>,

    pub endpoint: Option<String>,
}

/// One error-handler registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorEntry {
    /// HTTP status code the view handles.
    pub status: u16,

    /// Dotted path of the error view.
    pub view: String,

    /// On a blueprint host, register at the application level.
    #[serde(default)]
    pub app: bool,
}

impl RoutesConfig {
    /// Register everything in this config through `registrar`.
    ///
    /// Assumes the config was validated; unparsable methods or statuses that
    /// slipped through are skipped with a warning rather than aborting the
    /// remaining registrations.
    pub fn apply(&self, registrar: &RouteRegistrar) -> Result<(), RegistrarError> {
        for route in &self.routes {
            let mut options = RouteOptions::new();
            for method in &route.methods {
                match Method::from_str(&method.to_uppercase()) {
                    Ok(method) => options = options.method(method),
                    Err(_) => {
                        tracing::warn!(pattern = %route.pattern, method, "skipping unknown method");
                    }
                }
            }
            if let Some(endpoint) = &route.endpoint {
                options = options.endpoint(endpoint.clone());
            }
            registrar.add(&route.pattern, route.view.as_str(), options)?;
        }

        for entry in &self.static_routes {
            let mut options = RouteOptions::new();
            if let Some(endpoint) = &entry.endpoint {
                options = options.endpoint(endpoint.clone());
            }
            registrar.add_static(&entry.pattern, entry.filename.as_deref(), options)?;
        }

        for entry in &self.template_routes {
            let mut options = RouteOptions::new();
            if let Some(endpoint) = &entry.endpoint {
                options = options.endpoint(endpoint.clone());
            }
            registrar.add_template(
                &entry.pattern,
                &entry.template,
                TemplateContext::Static(entry.context.clone()),
                options,
            )?;
        }

        for entry in &self.error_handlers {
            let Ok(status) = StatusCode::from_u16(entry.status) else {
                tracing::warn!(status = entry.status, "skipping invalid error status");
                continue;
            };
            registrar.add_error(status, entry.view.as_str(), entry.app)?;
        }

        Ok(())
    }
}
