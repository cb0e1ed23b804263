//! Gateway session tests over a real WebSocket connection
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    dispatch, heartbeat_ack, message_create, ready, FakeGateway, TEST_CHANNEL, TEST_TIMEOUT,
    TEST_TOKEN,
};
use relay_gateway::{
    CloseCode, CloseReason, DispatchEvent, DispatchHandler, GatewaySession, SessionConfig,
    SessionState, StatusProvider, WebSocketTransport,
};
use serde_json::json;
use tokio::sync::mpsc;

fn session(
    gateway: &FakeGateway,
) -> (GatewaySession, mpsc::UnboundedReceiver<DispatchEvent>) {
    let (tx, events) = mpsc::unbounded_channel();
    let handler: Arc<dyn DispatchHandler> = Arc::new(move |event: &DispatchEvent| {
        let _ = tx.send(event.clone());
    });
    let status: StatusProvider = Arc::new(|| "a test server".to_string());

    let session = GatewaySession::new(
        SessionConfig::new(TEST_TOKEN, gateway.url()),
        Arc::new(WebSocketTransport::new()),
        handler,
        status,
    );
    (session, events)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<DispatchEvent>) -> DispatchEvent {
    tokio::time::timeout(TEST_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for a dispatch")
        .expect("handler dropped")
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_after_hello() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, _events) = session(&gateway);

    session.connect().await.unwrap();
    let (_peer, identify) = gateway.accept_identified(45_000).await.unwrap();

    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert_eq!(identify["d"]["intents"], 1 << 9);
    assert_eq!(
        identify["d"]["presence"]["activities"][0],
        json!({"name": "a test server", "type": 0})
    );
    assert!(identify["d"]["properties"]["os"].is_string());

    session.close().await;
}

#[tokio::test]
async fn test_string_encoded_hello() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, _events) = session(&gateway);

    session.connect().await.unwrap();
    let mut peer = gateway.accept().await.unwrap();
    peer.send_text(r#"{"op":"10","d":{"heartbeat_interval":"41250"}}"#)
        .await
        .unwrap();

    let identify = peer.recv_op(2).await.unwrap();
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert_eq!(
        session.heartbeat_interval(),
        Some(Duration::from_millis(41_250))
    );
}

// ============================================================================
// Heartbeats and sequence tracking
// ============================================================================

#[tokio::test]
async fn test_heartbeats_carry_last_sequence() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, mut events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(100).await.unwrap();

    // Nothing dispatched yet
    let beat = peer.recv_op(1).await.unwrap();
    assert_eq!(beat["d"], serde_json::Value::Null);
    peer.send_json(&heartbeat_ack()).await.unwrap();

    peer.send_json(&ready(1)).await.unwrap();
    peer.send_json(&dispatch(2, "GUILD_CREATE", json!({"id": "1"})))
        .await
        .unwrap();
    peer.send_json(&dispatch(3, "GUILD_CREATE", json!({"id": "2"})))
        .await
        .unwrap();
    for seq in 1..=3 {
        assert_eq!(next_event(&mut events).await.sequence, Some(seq));
    }
    assert_eq!(session.last_sequence(), Some(3));

    // A beat already in flight may still carry an older sequence
    loop {
        let beat = peer.recv_op(1).await.unwrap();
        if beat["d"] == 3 {
            break;
        }
        assert!(beat["d"].is_null() || beat["d"].as_u64() < Some(3));
    }

    session.close().await;
}

#[tokio::test]
async fn test_malformed_frame_keeps_session_open() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, mut events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(45_000).await.unwrap();

    peer.send_text("this is not json").await.unwrap();
    peer.send_text(r#"{"op":0,"s":"x"}"#).await.unwrap();
    peer.send_json(&message_create(1, TEST_CHANNEL, "alice", "still here", false))
        .await
        .unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.event_type, "MESSAGE_CREATE");
    assert_eq!(event.as_message_create().unwrap().content, "still here");
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_server_requested_heartbeat() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, mut events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(45_000).await.unwrap();

    peer.send_json(&ready(4)).await.unwrap();
    next_event(&mut events).await;
    peer.send_json(&json!({"op": 1, "d": null})).await.unwrap();

    let beat = peer.recv_op(1).await.unwrap();
    assert_eq!(beat["d"], 4);
    session.close().await;
}

// ============================================================================
// Closing
// ============================================================================

#[tokio::test]
async fn test_server_close_code_is_reported() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, _events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(45_000).await.unwrap();
    peer.close(4004, "Authentication failed").await.unwrap();

    let reason = tokio::time::timeout(TEST_TIMEOUT, session.wait_closed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reason.close_code(), Some(CloseCode::AuthenticationFailed));
    assert!(!reason.should_reconnect());
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_reconnect_opcode_closes_session() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, _events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(45_000).await.unwrap();
    peer.send_json(&json!({"op": 7, "d": null})).await.unwrap();

    let reason = tokio::time::timeout(TEST_TIMEOUT, session.wait_closed())
        .await
        .unwrap();
    assert_eq!(reason, Some(CloseReason::ReconnectRequested));

    // The client hangs up its side
    peer.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_client_close_releases_connection() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, _events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut peer, _) = gateway.accept_identified(100).await.unwrap();

    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.close_reason(), Some(CloseReason::Requested));

    peer.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_new_session_after_close() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (mut session, mut events) = session(&gateway);

    session.connect().await.unwrap();
    let (mut first, _) = gateway.accept_identified(45_000).await.unwrap();
    first.send_json(&ready(10)).await.unwrap();
    next_event(&mut events).await;
    session.close().await;

    session.connect().await.unwrap();
    let (mut second, identify) = gateway.accept_identified(100).await.unwrap();
    assert_eq!(identify["op"], 2);
    assert!(session.last_sequence().is_none());

    let beat = second.recv_op(1).await.unwrap();
    assert_eq!(beat["d"], serde_json::Value::Null);
    session.close().await;
}

#[tokio::test]
async fn test_connect_failure() {
    // Nothing listens on a port we just released
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, _rx) = mpsc::unbounded_channel::<DispatchEvent>();
    let handler: Arc<dyn DispatchHandler> = Arc::new(move |event: &DispatchEvent| {
        let _ = tx.send(event.clone());
    });
    let mut session = GatewaySession::new(
        SessionConfig::new(TEST_TOKEN, format!("ws://{addr}")),
        Arc::new(WebSocketTransport::new()),
        handler,
        Arc::new(|| "x".to_string()),
    );

    assert!(session.connect().await.is_err());
    assert_eq!(session.state(), SessionState::Closed);
}
