//! End-to-end relay behaviour over real sockets.

#![allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use blackjack_relay::api::handlers::system::HealthResponse;
use blackjack_relay::app_state::AppState;
use blackjack_relay::config::{Heartbeat, SocketSettings};
use blackjack_relay::server;

type Peer = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn test_state() -> AppState {
    AppState::new(SocketSettings {
        heartbeat: Heartbeat::DISABLED,
        ..SocketSettings::default()
    })
}

async fn start() -> (SocketAddr, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let state = test_state();
    tokio::spawn(server::serve(listener, state.clone()));
    (addr, state)
}

async fn connect(addr: SocketAddr, path: &str) -> Peer {
    let (peer, _) = tokio_test::assert_ok!(connect_async(format!("ws://{addr}{path}")).await);
    peer
}

async fn wait_for_clients(state: &AppState, expected: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while state.registry.len().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("registry never reached the expected size");
}

async fn wait_for_dealer(state: &AppState, attached: bool) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while state.dealer.is_occupied() != attached {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("dealer seat never changed");
}

/// Next data frame, skipping control frames.
async fn next_frame(peer: &mut Peer) -> Message {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match peer.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(message)) => return message,
                other => panic!("client stream ended: {other:?}"),
            }
        }
    })
    .await
    .expect("no frame received")
}

async fn assert_silent(peer: &mut Peer) {
    let extra = tokio::time::timeout(Duration::from_millis(200), peer.next()).await;
    assert!(extra.is_err(), "unexpected extra frame: {extra:?}");
}

#[tokio::test]
async fn binary_frame_reaches_every_client_once() {
    let (addr, state) = start().await;
    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(connect(addr, "/ws/blackjack").await);
    }
    wait_for_clients(&state, 3).await;

    let mut dealer = connect(addr, "/ws/dealer").await;
    dealer
        .send(Message::binary(vec![0x01, 0x02]))
        .await
        .expect("dealer send");

    for client in &mut clients {
        assert_eq!(next_frame(client).await, Message::binary(vec![0x01, 0x02]));
        assert_silent(client).await;
    }
}

#[tokio::test]
async fn disconnected_client_is_skipped() {
    let (addr, state) = start().await;
    let mut stays = connect(addr, "/ws/blackjack").await;
    let mut leaves = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 2).await;

    leaves.close(None).await.expect("client close");
    wait_for_clients(&state, 1).await;

    let mut dealer = connect(addr, "/ws/dealer").await;
    dealer
        .send(Message::text("state:X"))
        .await
        .expect("dealer send");

    assert_eq!(next_frame(&mut stays).await, Message::text("state:X"));
}

#[tokio::test]
async fn clients_see_dealer_order() {
    let (addr, state) = start().await;
    let mut a = connect(addr, "/ws/blackjack").await;
    let mut b = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 2).await;

    let mut dealer = connect(addr, "/ws/dealer").await;
    for text in ["F1", "F2", "F3"] {
        dealer.send(Message::text(text)).await.expect("dealer send");
    }

    for client in [&mut a, &mut b] {
        for text in ["F1", "F2", "F3"] {
            assert_eq!(next_frame(client).await, Message::text(text));
        }
    }
}

#[tokio::test]
async fn malformed_dealer_handshake_is_server_error() {
    let (addr, state) = start().await;
    let mut client = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 1).await;

    let response = reqwest::get(format!("http://{addr}/ws/dealer"))
        .await
        .expect("http request");
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["error"]["code"], 3001);

    assert!(!state.dealer.is_occupied());
    assert_eq!(state.registry.len().await, 1);
    assert_silent(&mut client).await;

    // the table keeps working once a real dealer shows up
    let mut dealer = connect(addr, "/ws/dealer").await;
    dealer.send(Message::text("deal")).await.expect("dealer send");
    assert_eq!(next_frame(&mut client).await, Message::text("deal"));
}

#[tokio::test]
async fn second_dealer_is_rejected_until_first_leaves() {
    let (addr, state) = start().await;
    let mut first = connect(addr, "/ws/dealer").await;
    wait_for_dealer(&state, true).await;

    match connect_async(format!("ws://{addr}/ws/dealer")).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 409);
        }
        other => panic!("second dealer should be refused, got {other:?}"),
    }

    first.close(None).await.expect("dealer close");
    wait_for_dealer(&state, false).await;
    let _second = connect(addr, "/ws/dealer").await;
    wait_for_dealer(&state, true).await;
}

#[tokio::test]
async fn clients_survive_dealer_disconnect() {
    let (addr, state) = start().await;
    let mut client = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 1).await;

    let mut dealer = connect(addr, "/ws/dealer").await;
    dealer.send(Message::text("round 1")).await.expect("dealer send");
    assert_eq!(next_frame(&mut client).await, Message::text("round 1"));
    dealer.close(None).await.expect("dealer close");
    wait_for_dealer(&state, false).await;

    assert_eq!(state.registry.len().await, 1);

    let mut dealer = connect(addr, "/ws/dealer").await;
    dealer.send(Message::text("round 2")).await.expect("dealer send");
    assert_eq!(next_frame(&mut client).await, Message::text("round 2"));
}

#[tokio::test]
async fn scanner_frames_are_not_relayed() {
    let (addr, state) = start().await;
    let mut client = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 1).await;

    let mut scanner = connect(addr, "/ws/scanner").await;
    scanner
        .send(Message::text("/9j/4AAQSkZJRg=="))
        .await
        .expect("scanner send");

    assert_silent(&mut client).await;
    assert_eq!(state.registry.len().await, 1);
}

#[tokio::test]
async fn health_reports_table_state() {
    let (addr, state) = start().await;
    let _client = connect(addr, "/ws/blackjack").await;
    wait_for_clients(&state, 1).await;
    let _dealer = connect(addr, "/ws/dealer").await;
    wait_for_dealer(&state, true).await;

    let health: HealthResponse = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("http request")
        .json()
        .await
        .expect("json body");

    assert_eq!(health.status, "healthy");
    assert_eq!(health.clients, 1);
    assert!(health.dealer_connected);
}

#[tokio::test]
async fn plain_get_on_client_path_is_server_error() {
    let app = server::build_app(test_state());
    let request = Request::builder()
        .uri("/ws/blackjack")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
