//! End-to-end registration and dispatch through a compiled router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Map};

use lazy_routes::{
    App, Blueprint, ErrorContext, RouteOptions, RouteRegistrar, TemplateContext, ViewFn,
};

mod common;
use common::{dispatch, fixed_view, get, PageView};

#[tokio::test]
async fn test_deferred_route_resolves_on_first_request() {
    let app = App::new("testapp");
    let resolutions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&resolutions);
    app.registry().register(
        "testapp.views",
        "home",
        lazy_routes::ViewEntry::factory(move |_args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(fixed_view("home"))
        }),
    );

    let registrar = RouteRegistrar::bound(app.clone(), Some("testapp")).unwrap();
    registrar.add("/", "views.home", RouteOptions::new()).unwrap();

    // Registration alone must not resolve anything.
    assert_eq!(resolutions.load(Ordering::SeqCst), 0);

    let router = app.into_router();
    assert_eq!(get(&router, "/").await, (StatusCode::OK, "home".into()));
    assert_eq!(get(&router, "/").await, (StatusCode::OK, "home".into()));

    // Two requests, one resolution.
    assert_eq!(resolutions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_route_registered_before_view_exists() {
    let app = App::new("testapp");
    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    registrar
        .add("/later", "testapp.views.later", RouteOptions::new())
        .unwrap();

    let router = app.clone().into_router();
    let (status, _) = get(&router, "/later").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The implementation module shows up afterwards; traffic recovers.
    app.registry()
        .register_view("testapp.views", "later", fixed_view("late but fine"));
    let (status, body) = get(&router, "/later").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "late but fine");
}

#[tokio::test]
async fn test_class_view_with_path_parameter() {
    let app = App::new("testapp");
    app.registry()
        .register_class::<PageView>("testapp.views", "PageView");

    let registrar = RouteRegistrar::bound(app.clone(), Some(".views")).unwrap();
    registrar
        .add(
            "/page/{page_id}",
            "PageView",
            RouteOptions::new().endpoint("flatpage"),
        )
        .unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/page/7").await,
        (StatusCode::OK, "page 7".into())
    );
}

#[tokio::test]
async fn test_methods_are_respected() {
    let app = App::new("testapp");
    app.registry()
        .register_view("testapp.views", "submit", fixed_view("submitted"));

    let registrar = RouteRegistrar::bound(app.clone(), Some("testapp")).unwrap();
    registrar
        .add(
            "/submit",
            "views.submit",
            RouteOptions::new().method(Method::POST),
        )
        .unwrap();

    let router = app.into_router();
    let (status, body) = dispatch(&router, Method::POST, "/submit").await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "submitted"));
    let (status, _) = get(&router, "/submit").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_static_route_with_default_filename() {
    let root = std::env::temp_dir().join(format!("lazy-routes-static-{}", std::process::id()));
    tokio::fs::create_dir_all(root.join("img")).await.unwrap();
    tokio::fs::write(root.join("img/favicon.ico"), b"icon-bytes")
        .await
        .unwrap();

    let app = App::new("testapp");
    app.set_static_root(&root);

    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    registrar
        .add_static(
            "/favicon.ico",
            Some("img/favicon.ico"),
            RouteOptions::new().endpoint("favicon"),
        )
        .unwrap();
    registrar
        .add_static("/static/{*filename}", None, RouteOptions::new())
        .unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/favicon.ico").await,
        (StatusCode::OK, "icon-bytes".into())
    );
    assert_eq!(
        get(&router, "/static/img/favicon.ico").await,
        (StatusCode::OK, "icon-bytes".into())
    );

    // Traversal and absent files both come back as 404.
    let (status, _) = get(&router, "/static/..%2Fsecret").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&router, "/static/img/missing.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn test_template_static_context_is_stable() {
    let app = App::new("testapp");
    app.templates().add("t.html", "x is {{ x }}").unwrap();

    let mut ctx = Map::new();
    ctx.insert("x".into(), json!(1));

    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    registrar
        .add_template("/t", "t.html", TemplateContext::Static(ctx), RouteOptions::new())
        .unwrap();

    let router = app.into_router();
    assert_eq!(get(&router, "/t").await, (StatusCode::OK, "x is 1".into()));
    assert_eq!(get(&router, "/t").await, (StatusCode::OK, "x is 1".into()));
}

#[tokio::test]
async fn test_template_dynamic_context_reevaluates() {
    let app = App::new("testapp");
    app.templates().add("t.html", "x is {{ x }}").unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    let source = Arc::clone(&counter);
    let context = TemplateContext::dynamic(move || {
        let mut map = Map::new();
        map.insert("x".into(), json!(source.fetch_add(1, Ordering::SeqCst)));
        map
    });

    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    registrar
        .add_template("/t2", "t.html", context, RouteOptions::new())
        .unwrap();

    let router = app.into_router();
    assert_eq!(get(&router, "/t2").await, (StatusCode::OK, "x is 0".into()));
    assert_eq!(get(&router, "/t2").await, (StatusCode::OK, "x is 1".into()));
}

#[tokio::test]
async fn test_deferred_factory_target_with_args() {
    let app = App::new("testapp");
    app.registry().register(
        "testapp.views",
        "make_greeter",
        lazy_routes::ViewEntry::factory(|args| {
            let who = args
                .positional()
                .first()
                .and_then(serde_json::Value::as_str)
                .unwrap_or("world")
                .to_owned();
            Ok(ViewFn::new(move |_req| {
                let who = who.clone();
                async move { format!("hello {who}").into_response() }
            }))
        }),
    );

    let registrar = RouteRegistrar::bound(app.clone(), Some("testapp")).unwrap();
    registrar
        .add(
            "/greet",
            lazy_routes::RouteTarget::deferred_with(
                "views.make_greeter",
                lazy_routes::CallArgs::new().arg("igor"),
            ),
            RouteOptions::new(),
        )
        .unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/greet").await,
        (StatusCode::OK, "hello igor".into())
    );
}

#[tokio::test]
async fn test_error_handler_and_fallback() {
    let app = App::new("testapp");
    let error_view = ViewFn::new(|req: Request<Body>| async move {
        let status = req
            .extensions()
            .get::<ErrorContext>()
            .map(|ctx| ctx.status.as_u16())
            .unwrap_or(0);
        format!("error page for {status}").into_response()
    });

    let registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    registrar
        .add_error(StatusCode::NOT_FOUND, error_view, false)
        .unwrap();

    let router = app.into_router();
    let (status, body) = get(&router, "/nowhere").await;
    // The error view inherits the original status when it leaves its own at 200.
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "error page for 404");
}

#[tokio::test]
async fn test_blueprint_rules_and_error_scoping() {
    let bp = Blueprint::new("testapp.test");
    bp.registry()
        .register_view("testapp.test.views", "index", fixed_view("test index"));
    bp.registry().register_view(
        "testapp.test.views",
        "fail",
        ViewFn::new(|_req| async { StatusCode::IM_A_TEAPOT.into_response() }),
    );

    let mut registrar = RouteRegistrar::new();
    registrar
        .bind_for_secondary_host(bp.clone(), Some(".views"))
        .unwrap();
    registrar.add("/", "index", RouteOptions::new()).unwrap();
    registrar.add("/fail", "fail", RouteOptions::new()).unwrap();
    registrar
        .add_error(
            StatusCode::IM_A_TEAPOT,
            fixed_view("local teapot page"),
            false,
        )
        .unwrap();
    registrar
        .add_app_error(StatusCode::NOT_FOUND, fixed_view("global 404"))
        .unwrap();

    let app = App::new("testapp");
    app.register_blueprint(&bp, Some("/test")).unwrap();

    // An app route hitting 418 is outside the blueprint's local handlers.
    let teapot = ViewFn::new(|_req| async { StatusCode::IM_A_TEAPOT.into_response() });
    let app_registrar = RouteRegistrar::bound(app.clone(), None).unwrap();
    app_registrar
        .add("/teapot", teapot, RouteOptions::new())
        .unwrap();

    let router = app.into_router();
    assert_eq!(
        get(&router, "/test/").await,
        (StatusCode::OK, "test index".into())
    );
    assert_eq!(
        get(&router, "/test/fail").await,
        (StatusCode::IM_A_TEAPOT, "local teapot page".into())
    );
    assert_eq!(
        get(&router, "/teapot").await,
        (StatusCode::IM_A_TEAPOT, String::new())
    );
    // The blueprint's app-level 404 handler is global after registration.
    assert_eq!(
        get(&router, "/missing").await,
        (StatusCode::NOT_FOUND, "global 404".into())
    );
}
