//! Middleware ordering and failure handling around the demo's schemas.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use waypoint::prelude::*;
use waypoint_demo::routes::simple::message_body;

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(name: &'static str, log: Log) -> impl Middleware {
    FnMiddleware::new(name, move |ctx, next| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().push(format!("{name}:pre"));
            let response = next.run(ctx).await;
            log.lock().push(format!("{name}:post:{}", response.status().as_u16()));
            response
        })
    })
}

fn post(uri: &str, body: &Value) -> Request {
    http::Request::post(uri)
        .body(Bytes::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_global_wraps_route_wraps_handler() {
    let log: Log = Arc::default();
    let handler_log = Arc::clone(&log);

    let app = App::builder()
        .middleware(recorder("global", Arc::clone(&log)))
        .middleware(recorder("route", Arc::clone(&log)))
        .global("global")
        .route(
            RouteDefinition::new("/simple/:id?").post(
                MethodDefinition::new(move |_ctx: RequestContext| {
                    let log = Arc::clone(&handler_log);
                    async move {
                        log.lock().push("handler".to_string());
                        Ok::<_, HandlerError>(response::created(&"ok"))
                    }
                })
                .schema(RequestSchema::new().body(message_body()))
                .middleware(["route"]),
            ),
        )
        .build()
        .unwrap();

    let response = app.dispatch(post("/simple", &json!({"text": "hi"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        *log.lock(),
        [
            "global:pre",
            "route:pre",
            "handler",
            "route:post:201",
            "global:post:201"
        ]
    );
}

#[tokio::test]
async fn test_invalid_body_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&calls);

    let app = App::builder()
        .route(
            RouteDefinition::new("/simple/:id?").post(
                MethodDefinition::new(move |_ctx: RequestContext| {
                    probe.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, HandlerError>(response::created(&"ok")) }
                })
                .schema(RequestSchema::new().body(message_body())),
            ),
        )
        .build()
        .unwrap();

    let response = app.dispatch(post("/simple", &json!({"priority": "low"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["details"][0]["field"], "text");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = app.dispatch(post("/simple", &json!({"text": "ok"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_route_middleware_still_runs_global_post_phase() {
    let log: Log = Arc::default();

    let app = App::builder()
        .middleware(recorder("global", Arc::clone(&log)))
        .middleware(FnMiddleware::new("explode", |_ctx, _next| {
            Box::pin(async {
                let missing: Option<Response> = None;
                missing.expect("route middleware exploded")
            })
        }))
        .global("global")
        .route(
            RouteDefinition::new("/users/:id").get(
                MethodDefinition::new(|_ctx: RequestContext| async {
                    Ok::<_, HandlerError>(response::ok(&"unreachable"))
                })
                .middleware(["explode"]),
            ),
        )
        .build()
        .unwrap();

    let response = app
        .dispatch(http::Request::get("/users/1").body(Bytes::new()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["message"].is_string());

    assert_eq!(*log.lock(), ["global:pre", "global:post:500"]);
}

#[tokio::test]
async fn test_handler_error_becomes_500_envelope() {
    let app = App::builder()
        .route(RouteDefinition::new("/users/:id").delete(MethodDefinition::new(
            |_ctx: RequestContext| async {
                Err::<Response, _>(HandlerError::new("database unavailable"))
            },
        )))
        .build()
        .unwrap();

    let response = app
        .dispatch(http::Request::delete("/users/1").body(Bytes::new()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_unknown_route_middleware_fails_startup() {
    let err = App::builder()
        .route(
            RouteDefinition::new("/simple/:id?").get(
                MethodDefinition::new(|_ctx: RequestContext| async {
                    Ok::<_, HandlerError>(response::no_content())
                })
                    .middleware(["request_track"]),
            ),
        )
        .build()
        .unwrap_err();

    assert!(matches!(err, RegistrationError::UnknownMiddleware { .. }));
}
