//! Admin extension registration and mounting.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;

use lazy_routes::view::ViewFuture;
use lazy_routes::{
    AdminExt, AdminView, App, CallArgs, RouteRegistrar, ViewEntry,
};

mod common;
use common::get;

struct StatsPanel {
    label: String,
}

impl AdminView for StatsPanel {
    fn name(&self) -> &str {
        &self.label
    }

    fn dispatch(&self, _req: Request<Body>) -> ViewFuture {
        let label = self.label.clone();
        Box::pin(async move { format!("panel: {label}").into_response() })
    }
}

fn admin_app() -> App {
    let app = App::new("testapp");
    app.attach_admin(AdminExt::new("/admin"));
    app.registry().register(
        "testapp.admin",
        "StatsPanel",
        ViewEntry::admin(|args| {
            let label = args
                .positional()
                .first()
                .and_then(Value::as_str)
                .unwrap_or("stats")
                .to_owned();
            Ok(Arc::new(StatsPanel { label }) as Arc<dyn AdminView>)
        }),
    );
    app
}

#[tokio::test]
async fn test_deferred_admin_view_instantiated_with_args() {
    let app = admin_app();
    let registrar = RouteRegistrar::bound(app.clone(), Some("testapp")).unwrap();
    registrar
        .add_admin("admin.StatsPanel", CallArgs::new().arg("user stats"))
        .unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/admin/user-stats").await,
        (StatusCode::OK, "panel: user stats".into())
    );

    let (status, body) = get(&router, "/admin").await;
    assert_eq!(status, StatusCode::OK);
    let index: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(index[0]["name"], "user stats");
    assert_eq!(index[0]["url"], "user-stats");
}

#[tokio::test]
async fn test_admin_instance_target() {
    let app = admin_app();
    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    let panel: Arc<dyn AdminView> = Arc::new(StatsPanel {
        label: "direct".into(),
    });
    registrar.add_admin(panel, CallArgs::new()).unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/admin/direct").await,
        (StatusCode::OK, "panel: direct".into())
    );
}

#[tokio::test]
async fn test_deferred_admin_target_must_be_admin_entry() {
    let app = admin_app();
    app.registry().register_view(
        "testapp.views",
        "home",
        lazy_routes::ViewFn::new(|_req| async { "home".into_response() }),
    );
    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    let err = registrar
        .add_admin("testapp.views.home", CallArgs::new())
        .unwrap_err();
    assert!(matches!(
        err,
        lazy_routes::RegistrarError::Resolve(lazy_routes::ResolveError::NotAnAdminView(_))
    ));
}

#[tokio::test]
async fn test_unknown_admin_path_fails_at_registration() {
    let app = admin_app();
    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    let err = registrar
        .add_admin("testapp.admin.Missing", CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, lazy_routes::RegistrarError::Resolve(_)));
}
