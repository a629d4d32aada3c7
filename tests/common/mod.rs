//! Shared helpers for integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use lazy_routes::view::ViewFuture;
use lazy_routes::{ClassView, ViewArgs, ViewFn};

/// Dispatch a GET in-process and return status plus body text.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    dispatch(router, Method::GET, uri).await
}

pub async fn dispatch(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// A plain view returning a fixed body.
pub fn fixed_view(body: &'static str) -> ViewFn {
    ViewFn::new(move |_req| async move { body.into_response() })
}

/// A class-based view echoing the `page_id` view argument.
#[derive(Default)]
pub struct PageView;

impl ClassView for PageView {
    fn dispatch(&self, req: Request<Body>) -> ViewFuture {
        Box::pin(async move {
            let page_id = req
                .extensions()
                .get::<ViewArgs>()
                .and_then(|args| args.get_str("page_id"))
                .unwrap_or("?")
                .to_owned();
            format!("page {page_id}").into_response()
        })
    }

    fn doc(&self) -> Option<&str> {
        Some("Render a single flat page.")
    }
}
