//! Serves an app over a real socket and talks raw HTTP/1.1 to it.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use waypoint_core::{response, HandlerError, Response};
use waypoint_middleware::stages::RequestLogMiddleware;
use waypoint_middleware::RequestContext;
use waypoint_schema::{RequestSchema, Shape};
use waypoint_server::{App, MethodDefinition, RouteDefinition, Server, ShutdownSignal};

async fn echo(ctx: RequestContext) -> Result<Response, HandlerError> {
    Ok(response::created(&ctx.json()))
}

async fn slow(_ctx: RequestContext) -> Result<Response, HandlerError> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Ok(response::no_content())
}

fn app() -> Arc<App> {
    let app = App::builder()
        .middleware(RequestLogMiddleware::new())
        .global("logger")
        .route(
            RouteDefinition::new("/echo").post(
                MethodDefinition::new(echo).schema(
                    RequestSchema::new().body(Shape::object().field("text", Shape::string())),
                ),
            ),
        )
        .route(RouteDefinition::new("/slow").get(MethodDefinition::new(slow)))
        .build()
        .unwrap();
    Arc::new(app)
}

async fn start(server: Server) -> (std::net::SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.serve(listener, signal).await.unwrap();
    });
    (addr, shutdown, handle)
}

async fn send(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn test_post_round_trip() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app());
    let (addr, shutdown, handle) = start(server).await;

    let body = r#"{"text":"hi","extra":1}"#;
    let raw = format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let reply = send(addr, &raw).await;

    assert!(reply.starts_with("HTTP/1.1 201"), "{reply}");
    assert!(reply.ends_with(r#"{"text":"hi"}"#), "{reply}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app()).max_body_size(16);
    let (addr, shutdown, handle) = start(server).await;

    let body = format!(r#"{{"text":"{}"}}"#, "x".repeat(64));
    let raw = format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let reply = send(addr, &raw).await;

    assert!(reply.starts_with("HTTP/1.1 413"), "{reply}");
    assert!(reply.contains(r#""error":"Payload Too Large""#), "{reply}");
    assert!(reply.contains(r#""kind":"payload_too_large""#), "{reply}");
    assert!(reply.contains("limit of 16 bytes"), "{reply}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_body_within_limit_is_served() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app()).max_body_size(16);
    let (addr, shutdown, handle) = start(server).await;

    let body = r#"{"text":"hi"}"#;
    let raw = format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let reply = send(addr, &raw).await;
    assert!(reply.starts_with("HTTP/1.1 201"), "{reply}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_not_found_over_the_wire() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app());
    let (addr, shutdown, handle) = start(server).await;

    let reply = send(
        addr,
        "GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(reply.starts_with("HTTP/1.1 404"), "{reply}");
    assert!(reply.contains(r#""error":"Not Found""#), "{reply}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_request_timeout_is_504() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app())
        .request_timeout(Duration::from_millis(50));
    let (addr, shutdown, handle) = start(server).await;

    let reply = send(
        addr,
        "GET /slow HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(reply.starts_with("HTTP/1.1 504"), "{reply}");
    assert!(reply.contains(r#""kind":"timeout""#), "{reply}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_serving() {
    let server = Server::new("127.0.0.1:0".parse().unwrap(), app())
        .shutdown_timeout(Duration::from_millis(200));
    let (_addr, shutdown, handle) = start(server).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
}
