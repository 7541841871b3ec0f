//! Router-level tests for the context middleware and extractor.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{HeaderMap, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use strata_context::{
    get_context, new_context, Context, ContextSettings, Error, Payload, TeraRenderer,
};
use tower::ServiceExt as _;

async fn send(
    router: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

fn renderer() -> ContextSettings {
    let renderer = TeraRenderer::from_raw([("page.html", "<h1>{{ title }}</h1>")])
        .unwrap()
        .into_shared();
    ContextSettings::new().with_renderer(renderer)
}

async fn page(mut ctx: Context) -> Result<Response, Error> {
    ctx.display("page.html", Payload::merge([("title", "Welcome")]))
}

async fn profile(mut ctx: Context) -> Result<Response, Error> {
    ctx.set_data("user", "ada");
    let ajax = ctx.is_ajax();
    ctx.set_data("ajax", ajax);
    let format = ctx.get_format().to_string();
    ctx.set_data("format", format);
    ctx.ret_data(Payload::Empty)
}

async fn echo_twice(mut ctx: Context) -> Result<Response, Error> {
    let first = ctx.get_body().await?;
    let req = ctx.into_request();
    // Read again through the framework's own extractor.
    let second = String::from_request(req, &())
        .await
        .map_err(|e| Error::Bind(e.to_string()))?;

    let mut ctx = get_context(Request::new(Body::empty()));
    ctx.ret_data(Payload::Replace(json!({ "first": first, "second": second })))
}

#[tokio::test]
async fn context_extractor_emits_envelope() {
    let router = Router::new()
        .route("/profile", get(profile))
        .layer(from_fn_with_state(ContextSettings::new(), new_context));

    let (status, headers, body) = send(
        router,
        Method::GET,
        "/profile",
        &[("x-requested-with", "XMLHttpRequest")],
        "",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "application/json");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({
            "Code": 0,
            "Message": "ok",
            "Data": {"user": "ada", "ajax": true, "format": ""}
        })
    );
}

#[tokio::test]
async fn middleware_applied_twice_keeps_first_state() {
    // The outer layer runs first; the inner one must not replace its state.
    let router = Router::new()
        .route("/page", get(page))
        .layer(from_fn_with_state(ContextSettings::new(), new_context))
        .layer(from_fn_with_state(renderer(), new_context));

    let (status, headers, body) = send(router, Method::GET, "/page", &[], "").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body.as_ref(), b"<h1>Welcome</h1>");
}

#[tokio::test]
async fn state_set_by_earlier_middleware_survives_adaptation() {
    async fn force_jsonp(req: Request, next: Next) -> Response {
        let mut ctx = get_context(req);
        ctx.set_format("jsonp");
        ctx.set_data("seen_by", "outer");
        next.run(ctx.into_request()).await
    }

    let router = Router::new()
        .route("/profile", get(profile))
        .layer(from_fn_with_state(ContextSettings::new(), new_context))
        .layer(from_fn(force_jsonp));

    let (status, headers, body) =
        send(router, Method::GET, "/profile?callback=cb", &[], "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers["content-type"],
        "application/javascript; charset=utf-8"
    );
    let script = String::from_utf8(body.to_vec()).unwrap();
    assert!(script.starts_with("cb("), "unexpected body: {script}");
    assert!(script.contains(r#""seen_by":"outer""#));
    assert!(script.contains(r#""format":"jsonp""#));
}

#[tokio::test]
async fn settings_apply_to_context_adapted_before_middleware() {
    async fn adapt_early(req: Request, next: Next) -> Response {
        let mut ctx = get_context(req);
        ctx.set_data("seen_by", "outer");
        next.run(ctx.into_request()).await
    }

    async fn page_with_outer_data(mut ctx: Context) -> Result<Response, Error> {
        let seen_by = ctx.data()["seen_by"].clone();
        ctx.display("page.html", Payload::merge([("title", seen_by)]))
    }

    async fn read(mut ctx: Context) -> Result<String, Error> {
        ctx.get_body().await
    }

    let router = Router::new()
        .route("/page", get(page_with_outer_data))
        .route("/read", post(read))
        .layer(from_fn_with_state(renderer().with_body_limit(8), new_context))
        .layer(from_fn(adapt_early));

    let (status, _, body) = send(router.clone(), Method::GET, "/page", &[], "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"<h1>outer</h1>");

    let (status, _, _) = send(router, Method::POST, "/read", &[], "this body is too long").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn middleware_negotiates_format() {
    let router = Router::new().route("/profile", get(profile)).layer(from_fn_with_state(
        ContextSettings::new().with_format_negotiation(true),
        new_context,
    ));

    let (_, _, body) = send(
        router,
        Method::GET,
        "/profile",
        &[("accept", "application/xml")],
        "",
    )
    .await;

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["Data"]["format"], "xml");
}

#[tokio::test]
async fn body_is_replayed_to_framework_extractors() {
    let router = Router::new()
        .route("/echo", post(echo_twice))
        .layer(from_fn_with_state(ContextSettings::new(), new_context));

    let (status, _, body) = send(
        router,
        Method::POST,
        "/echo",
        &[("content-type", "text/plain")],
        "payload-bytes",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["Data"],
        json!({"first": "payload-bytes", "second": "payload-bytes"})
    );
}

#[tokio::test]
async fn body_limit_from_settings_is_enforced() {
    async fn read(mut ctx: Context) -> Result<String, Error> {
        ctx.get_body().await
    }

    let router = Router::new()
        .route("/read", post(read))
        .layer(from_fn_with_state(
            ContextSettings::new().with_body_limit(8),
            new_context,
        ));

    let (status, _, body) =
        send(router, Method::POST, "/read", &[], "this body is too long").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["Code"], 400);
}

#[tokio::test]
async fn extractor_works_without_middleware() {
    let router = Router::new().route("/page", get(page));

    let (status, _, body) = send(router, Method::GET, "/page", &[], "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({"Code": 500, "Message": "Internal server error", "Data": null})
    );
}
