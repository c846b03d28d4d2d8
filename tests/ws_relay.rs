//! End-to-end relay tests.
//!
//! Spins up a real server on an ephemeral port and drives it with
//! `tokio-tungstenite` clients: fan-out, echo to sender, disconnect
//! cleanup, origin gating, and per-sender ordering.

#![allow(clippy::expect_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::domain::PeerRegistry;
use chat_relay::ws::handler::ws_handler;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Starts a relay on an ephemeral port, returning its address and a handle
/// to its registry for state assertions.
async fn spawn_relay() -> (SocketAddr, Arc<PeerRegistry>) {
    let registry = Arc::new(PeerRegistry::new());
    let state = AppState {
        registry: Arc::clone(&registry),
        config: Arc::new(RelayConfig {
            listen_addr: "127.0.0.1:0".parse().expect("valid addr"),
            allowed_origin: ALLOWED_ORIGIN.to_string(),
        }),
    };

    let app = Router::new()
        .merge(api::routes())
        .route("/ws", get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, registry)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _response) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket handshake");
    ws
}

/// Polls until the registry holds `expected` peers; connection lifecycle
/// events are processed by the server asynchronously.
async fn wait_for_peers(registry: &PeerRegistry, expected: usize) {
    for _ in 0..200 {
        if registry.len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "registry never reached {expected} peers (now {})",
        registry.len().await
    );
}

/// Reads frames until the next text frame and parses it as JSON.
async fn next_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended unexpectedly")
            .expect("websocket transport error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("frame is valid JSON");
        }
    }
}

fn send_message_frame(data: serde_json::Value) -> Message {
    Message::text(format!(
        "{{\"event\":\"send_message\",\"data\":{data}}}"
    ))
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (addr, _registry) = spawn_relay().await;

    let response = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("health body");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn broadcast_reaches_all_peers_including_sender() {
    let (addr, registry) = spawn_relay().await;

    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&registry, 2).await;

    a.send(send_message_frame(serde_json::json!({"text": "hi"})))
        .await
        .expect("send");

    for client in [&mut a, &mut b] {
        let frame = next_json(client).await;
        assert_eq!(frame["event"], "receive_message");
        assert_eq!(frame["data"]["text"], "hi");
    }
}

#[tokio::test]
async fn disconnected_peer_is_excluded_from_broadcasts() {
    let (addr, registry) = spawn_relay().await;

    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&registry, 2).await;

    a.send(send_message_frame(serde_json::json!({"text": "hi"})))
        .await
        .expect("send hi");
    assert_eq!(next_json(&mut a).await["data"]["text"], "hi");
    assert_eq!(next_json(&mut b).await["data"]["text"], "hi");

    b.close(None).await.expect("close b");
    wait_for_peers(&registry, 1).await;

    a.send(send_message_frame(serde_json::json!({"text": "bye"})))
        .await
        .expect("send bye");
    assert_eq!(next_json(&mut a).await["data"]["text"], "bye");
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn messages_from_one_peer_arrive_in_order() {
    let (addr, registry) = spawn_relay().await;

    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&registry, 2).await;

    for i in 0..5 {
        a.send(send_message_frame(serde_json::json!({"seq": i})))
            .await
            .expect("send");
    }
    for i in 0..5 {
        let frame = next_json(&mut b).await;
        assert_eq!(frame["event"], "receive_message");
        assert_eq!(frame["data"]["seq"], i);
    }
}

#[tokio::test]
async fn malformed_frame_disconnects_peer() {
    let (addr, registry) = spawn_relay().await;

    let mut a = connect(addr).await;
    wait_for_peers(&registry, 1).await;

    a.send(Message::text("not json")).await.expect("send");
    wait_for_peers(&registry, 0).await;

    // The connection terminates without any relayed frame coming back.
    let msg = tokio::time::timeout(Duration::from_secs(5), a.next())
        .await
        .expect("timed out waiting for close");
    match msg {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected connection to close, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_origin_is_rejected_before_any_peer_exists() {
    let (addr, registry) = spawn_relay().await;

    let mut request = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("client request");
    request.headers_mut().insert(
        "Origin",
        "http://evil.example".parse().expect("header value"),
    );

    match connect_async(request).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 403),
        Err(other) => panic!("expected HTTP 403 rejection, got: {other}"),
        Ok(_) => panic!("handshake should have been refused"),
    }
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn allow_listed_origin_is_admitted() {
    let (addr, registry) = spawn_relay().await;

    let mut request = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("client request");
    request
        .headers_mut()
        .insert("Origin", ALLOWED_ORIGIN.parse().expect("header value"));

    let (_ws, _response) = connect_async(request).await.expect("handshake");
    wait_for_peers(&registry, 1).await;
}
