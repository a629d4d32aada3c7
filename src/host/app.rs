//! Top-level application host.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::RawPathParams;
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::Response;
use axum::routing::{on, MethodFilter};
use axum::Router;
use serde_json::{json, Value};

use crate::admin::{AdminExt, AdminView, ADMIN_EXTENSION};
use crate::error::RegistrarError;
use crate::host::blueprint::Blueprint;
use crate::host::statics;
use crate::host::templates::Templates;
use crate::host::{ErrorContext, RouteRule, ViewArgs, GENERIC_IMPORT_NAME};
use crate::registry::ViewRegistry;
use crate::view::{BoundView, ViewFn};

struct AppInner {
    import_name: String,
    rules: Vec<RouteRule>,
    error_views: HashMap<u16, BoundView>,
    static_root: Option<PathBuf>,
    templates: Templates,
    extensions: HashMap<String, AdminExt>,
    registry: ViewRegistry,
}

/// A top-level application: the owner of the final route table, the global
/// error-handler table, the extensions map, and the view registry.
///
/// Clones share the same underlying application.
#[derive(Clone)]
pub struct App {
    inner: Arc<Mutex<AppInner>>,
}

impl App {
    pub fn new(import_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppInner {
                import_name: import_name.into(),
                rules: Vec::new(),
                error_views: HashMap::new(),
                static_root: None,
                templates: Templates::new(),
                extensions: HashMap::new(),
                registry: ViewRegistry::new(),
            })),
        }
    }

    /// An app with the generic `"main"` import name. Relative import
    /// prefixes cannot be anchored to it.
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

    /// Attach the admin extension under the `"admin"` key.
    pub fn attach_admin(&self, ext: AdminExt) {
        self.lock().extensions.insert(ADMIN_EXTENSION.to_owned(), ext);
    }

    /// The attached admin extension, if any.
    pub fn admin(&self) -> Option<AdminExt> {
        self.lock().extensions.get(ADMIN_EXTENSION).cloned()
    }

    /// Append a rule to the route table.
    pub fn add_url_rule(&self, rule: RouteRule) -> Result<(), RegistrarError> {
        let mut inner = self.lock();
        check_duplicate(&inner.rules, &rule)?;
        tracing::debug!(
            pattern = %rule.pattern,
            endpoint = %rule.endpoint(),
            "added url rule"
        );
        inner.rules.push(rule);
        Ok(())
    }

    /// Register a global error view for `status`. Later registrations win.
    pub fn register_error_handler(&self, status: StatusCode, view: BoundView) {
        tracing::debug!(status = status.as_u16(), "registered error handler");
        self.lock().error_views.insert(status.as_u16(), view);
    }

    /// Merge a blueprint's rules into this app, optionally re-rooted under
    /// `url_prefix`. Blueprint-local error handlers stay scoped to the
    /// blueprint's rules; app-level handlers land in the global table.
    pub fn register_blueprint(
        &self,
        blueprint: &Blueprint,
        url_prefix: Option<&str>,
    ) -> Result<(), RegistrarError> {
        let (rules, local_errors, app_errors) = blueprint.parts();
        let local_errors = if local_errors.is_empty() {
            None
        } else {
            Some(Arc::new(local_errors))
        };

        for mut rule in rules {
            if let Some(prefix) = url_prefix {
                rule.pattern = join_pattern(prefix, &rule.pattern);
            }
            rule.local_errors = local_errors.clone();
            self.add_url_rule(rule)?;
        }
        let mut inner = self.lock();
        for (status, view) in app_errors {
            inner.error_views.insert(status, view);
        }
        tracing::info!(
            blueprint = %blueprint.import_name(),
            url_prefix = url_prefix.unwrap_or(""),
            "registered blueprint"
        );
        Ok(())
    }

    /// Compile the application into a servable axum router.
    pub fn into_router(self) -> Router {
        let (rules, error_views, admin) = {
            let inner = self.lock();
            (
                inner.rules.clone(),
                inner.error_views.clone(),
                inner.extensions.get(ADMIN_EXTENSION).cloned(),
            )
        };
        let global_errors = Arc::new(error_views);

        let mut router = Router::new();
        for rule in rules {
            let filter = method_filter(&rule.effective_methods());
            let pattern = rule.pattern.clone();
            router = router.route(
                &pattern,
                on(filter, rule_handler(rule, Arc::clone(&global_errors))),
            );
        }

        if let Some(admin) = admin {
            router = mount_admin(router, &admin);
        }

        if let Some(not_found) = global_errors.get(&404).cloned() {
            router = router.fallback(move |req: Request<Body>| {
                let view = not_found.clone();
                async move {
                    invoke_error_view(&view, req.method().clone(), req.uri().clone(), StatusCode::NOT_FOUND)
                        .await
                }
            });
        }

        router
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AppInner> {
        self.inner.lock().expect("app lock poisoned")
    }
}

/// The per-rule axum handler: merges rule defaults and path parameters into a
/// `ViewArgs` extension, dispatches the view, and re-routes error statuses
/// through the registered error views.
type RouteFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>;

fn rule_handler(
    rule: RouteRule,
    global_errors: Arc<HashMap<u16, BoundView>>,
) -> impl Fn(RawPathParams, Request<Body>) -> RouteFuture + Clone + Send + Sync + 'static {
    let view = rule.view.clone();
    let defaults = Arc::new(rule.options.defaults.clone());
    let local_errors = rule.local_errors.clone();

    move |params: RawPathParams, mut req: Request<Body>| -> RouteFuture {
        let view = view.clone();
        let defaults = Arc::clone(&defaults);
        let local_errors = local_errors.clone();
        let global_errors = Arc::clone(&global_errors);
        Box::pin(async move {
            let mut args = (*defaults).clone();
            for (key, value) in params.iter() {
                args.insert(key.to_owned(), Value::String(value.to_owned()));
            }
            req.extensions_mut().insert(ViewArgs::new(args));

            let method = req.method().clone();
            let uri = req.uri().clone();
            let response = view.call(req).await;

            let status = response.status();
            if !(status.is_client_error() || status.is_server_error()) {
                return response;
            }
            let handler = local_errors
                .as_deref()
                .and_then(|table| table.get(&status.as_u16()).cloned())
                .or_else(|| global_errors.get(&status.as_u16()).cloned());
            match handler {
                Some(error_view) => invoke_error_view(&error_view, method, uri, status).await,
                None => response,
            }
        })
    }
}

/// Call an error view with a synthetic request describing the failure. An
/// error view that leaves its status at 200 inherits the original one.
async fn invoke_error_view(
    view: &BoundView,
    method: Method,
    uri: Uri,
    status: StatusCode,
) -> Response {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("synthetic error request from valid parts");
    req.extensions_mut().insert(ErrorContext { status });

    let mut response = view.call(req).await;
    if response.status() == StatusCode::OK {
        *response.status_mut() = status;
    }
    response
}

fn mount_admin(mut router: Router, admin: &AdminExt) -> Router {
    let base = admin.base_path().trim_end_matches('/').to_owned();
    let views = admin.views();

    let index: Vec<Value> = views
        .iter()
        .map(|v| json!({ "name": v.name(), "url": v.url() }))
        .collect();
    let index_path = if base.is_empty() { "/".to_owned() } else { base.clone() };
    router = router.route(
        &index_path,
        axum::routing::get(move || {
            let index = index.clone();
            async move { axum::Json(index) }
        }),
    );

    for view in views {
        let path = format!("{base}/{}", view.url());
        let panel = Arc::clone(&view);
        router = router.route(
            &path,
            axum::routing::get(move |req: Request<Body>| {
                let panel: Arc<dyn AdminView> = Arc::clone(&panel);
                async move { panel.dispatch(req).await }
            }),
        );
        tracing::debug!(path = %path, name = view.name(), "mounted admin view");
    }
    router
}

fn method_filter(methods: &[Method]) -> MethodFilter {
    let mut filters = methods
        .iter()
        .filter_map(|m| MethodFilter::try_from(m.clone()).ok());
    let first = filters.next().unwrap_or(MethodFilter::GET);
    filters.fold(first, MethodFilter::or)
}

fn check_duplicate(rules: &[RouteRule], candidate: &RouteRule) -> Result<(), RegistrarError> {
    let candidate_methods = candidate.effective_methods();
    for rule in rules {
        if rule.pattern == candidate.pattern
            && rule
                .effective_methods()
                .iter()
                .any(|m| candidate_methods.contains(m))
        {
            return Err(RegistrarError::DuplicateRule {
                pattern: candidate.pattern.clone(),
            });
        }
    }
    Ok(())
}

/// Join a blueprint url prefix with a rule pattern, keeping the result a
/// valid axum path.
fn join_pattern(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if pattern == "/" {
        if prefix.is_empty() {
            "/".to_owned()
        } else {
            format!("{prefix}/")
        }
    } else {
        format!("{prefix}{pattern}")
    }
}
