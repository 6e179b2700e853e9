//! End-to-end broker/transport tests against a fake panel client.

use easel_bridge::{BridgeConfig, ExecuteOptions, PanelBridge};
use easel_types::{ScriptRequest, ScriptResponse};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type PanelSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_config() -> BridgeConfig {
    BridgeConfig {
        ws_port: 0, // ephemeral
        http_port: None,
        timeout_secs: 5.0,
    }
}

async fn connect_panel(port: u16) -> PanelSocket {
    let (socket, _) = connect_async(format!("ws://127.0.0.1:{port}"))
        .await
        .expect("panel connects");
    socket
}

async fn read_request(socket: &mut PanelSocket) -> ScriptRequest {
    loop {
        match socket.next().await.expect("frame").expect("frame ok") {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("request"),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn send_response(socket: &mut PanelSocket, id: u64, result: Value) {
    let response = ScriptResponse {
        id,
        result,
        error: None,
        command: None,
        duration: Some(1.0),
    };
    socket
        .send(Message::text(serde_json::to_string(&response).unwrap()))
        .await
        .expect("response sent");
}

/// Polls until the bridge observes the connection handshake.
async fn wait_connected(bridge: &PanelBridge) {
    for _ in 0..100 {
        if bridge.is_connected() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("panel never connected");
}

#[tokio::test]
async fn script_roundtrip_returns_the_correlated_result() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    let panel_task = tokio::spawn(async move {
        let request = read_request(&mut panel).await;
        assert!(request.script.contains("activeDocument"));
        assert!(request.trace_id.is_some());
        send_response(&mut panel, request.id, json!({"ok": true})).await;
    });

    let response = bridge
        .execute_script("app.activeDocument.name", ExecuteOptions::default())
        .await
        .unwrap();
    assert_eq!(response.parsed_result(), json!({"ok": true}));
    assert_eq!(bridge.pending_requests(), 0);
    panel_task.await.unwrap();
}

#[tokio::test]
async fn send_without_panel_fails_immediately() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let err = bridge
        .execute_script("1 + 1", ExecuteOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DISCONNECTED");
    assert!(err.to_string().contains(&bridge.port().to_string()));
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn out_of_order_responses_reach_their_own_awaiters() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    // Answer the two requests in reverse order.
    let panel_task = tokio::spawn(async move {
        let first = read_request(&mut panel).await;
        let second = read_request(&mut panel).await;
        send_response(&mut panel, second.id, json!("answer-for-second")).await;
        send_response(&mut panel, first.id, json!("answer-for-first")).await;
    });

    let (a, b) = tokio::join!(
        bridge.execute_script("first()", ExecuteOptions::default()),
        bridge.execute_script("second()", ExecuteOptions::default()),
    );
    assert_eq!(a.unwrap().parsed_result(), json!("answer-for-first"));
    assert_eq!(b.unwrap().parsed_result(), json!("answer-for-second"));
    panel_task.await.unwrap();
}

#[tokio::test]
async fn timeout_forgets_the_id_and_late_responses_are_dropped() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    let opts = ExecuteOptions {
        timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    };
    let err = bridge.execute_script("slow()", opts).await.unwrap_err();
    assert_eq!(err.code(), "TIMEOUT");
    assert_eq!(bridge.pending_requests(), 0);

    // The panel answers late; the bridge must drop it and keep working.
    let request = read_request(&mut panel).await;
    send_response(&mut panel, request.id, json!("too late")).await;

    let panel_task = tokio::spawn(async move {
        let request = read_request(&mut panel).await;
        send_response(&mut panel, request.id, json!("fresh")).await;
    });
    let response = bridge
        .execute_script("fast()", ExecuteOptions::default())
        .await
        .unwrap();
    assert_eq!(response.parsed_result(), json!("fresh"));
    panel_task.await.unwrap();
}

#[tokio::test]
async fn new_connection_replaces_the_old_and_rejects_its_requests() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut stale_panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    // A request the stale panel will never answer.
    let bridge = std::sync::Arc::new(bridge);
    let waiting = tokio::spawn({
        let bridge = std::sync::Arc::clone(&bridge);
        async move {
            bridge
                .execute_script("never()", ExecuteOptions::default())
                .await
        }
    });

    // Make sure the request is in flight before replacing.
    let _ = read_request(&mut stale_panel).await;

    let mut fresh_panel = connect_panel(bridge.port()).await;
    let err = waiting.await.unwrap().unwrap_err();
    assert_eq!(err.code(), "DISCONNECTED");

    // The fresh connection serves traffic normally.
    let panel_task = tokio::spawn(async move {
        let request = read_request(&mut fresh_panel).await;
        send_response(&mut fresh_panel, request.id, json!("from-fresh")).await;
    });
    let response = bridge
        .execute_script("hello()", ExecuteOptions::default())
        .await
        .unwrap();
    assert_eq!(response.parsed_result(), json!("from-fresh"));
    panel_task.await.unwrap();
}

#[tokio::test]
async fn disconnect_rejects_outstanding_requests() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    let bridge = std::sync::Arc::new(bridge);
    let waiting = tokio::spawn({
        let bridge = std::sync::Arc::clone(&bridge);
        async move {
            bridge
                .execute_script("never()", ExecuteOptions::default())
                .await
        }
    });
    let _ = read_request(&mut panel).await;

    panel.close(None).await.unwrap();
    let err = waiting.await.unwrap().unwrap_err();
    assert_eq!(err.code(), "DISCONNECTED");
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn shutdown_rejects_outstanding_and_stops_accepting() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let port = bridge.port();
    let mut panel = connect_panel(port).await;
    wait_connected(&bridge).await;

    let bridge = std::sync::Arc::new(bridge);
    let waiting = tokio::spawn({
        let bridge = std::sync::Arc::clone(&bridge);
        async move {
            bridge
                .execute_script("never()", ExecuteOptions::default())
                .await
        }
    });
    let _ = read_request(&mut panel).await;

    bridge.shutdown().await;
    let err = waiting.await.unwrap().unwrap_err();
    assert_eq!(err.code(), "DISCONNECTED");

    // Listener is gone; new panels cannot connect.
    assert!(connect_async(format!("ws://127.0.0.1:{port}")).await.is_err());
}

#[tokio::test]
async fn malformed_frames_do_not_break_the_connection() {
    let bridge = PanelBridge::start(test_config()).await.unwrap();
    let mut panel = connect_panel(bridge.port()).await;
    wait_connected(&bridge).await;

    panel.send(Message::text("this is not json")).await.unwrap();
    panel
        .send(Message::text(r#"{"no_id_field": true}"#))
        .await
        .unwrap();

    let panel_task = tokio::spawn(async move {
        let request = read_request(&mut panel).await;
        send_response(&mut panel, request.id, json!("still alive")).await;
    });
    let response = bridge
        .execute_script("ping()", ExecuteOptions::default())
        .await
        .unwrap();
    assert_eq!(response.parsed_result(), json!("still alive"));
    panel_task.await.unwrap();
}
