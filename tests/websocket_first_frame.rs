//! §8 scenario 4: "WebSocket first frame." The server writes a frame with
//! payload `no_session` before any user messages, right after the upgrade.

use gateway::{build_app, echo_factory};
use sio_protocol::DecodedFrame;
use sio_test_support::WsTestClient;
use sio_transport::GatewayConfig;
use std::time::Duration;

async fn start_gateway() -> String {
    let (router, _state) = build_app(GatewayConfig::default(), echo_factory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("gateway error");
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    format!("ws://{addr}")
}

#[tokio::test]
async fn websocket_writes_no_session_sentinel_before_anything_else() {
    let base_url = start_gateway().await;
    let url = format!("{base_url}/socket.io/1/websocket");

    let mut client = WsTestClient::connect(&url).await.expect("connect failed");
    let frames = client.recv().await.expect("recv failed");

    assert_eq!(frames, vec![DecodedFrame::Text("no_session".to_owned())]);
}

#[tokio::test]
async fn messages_sent_after_the_sentinel_are_echoed() {
    let base_url = start_gateway().await;
    let url = format!("{base_url}/socket.io/1/websocket");

    let mut client = WsTestClient::connect(&url).await.expect("connect failed");
    let _sentinel = client.recv().await.expect("recv failed");
    // A fresh session also queues its own id (§8 scenario 2); that arrives
    // as the next frame, ahead of anything the test sends itself.
    let _session_id = client.recv().await.expect("recv failed");

    client
        .send(sio_protocol::Message::Text("ping".to_owned()))
        .await
        .expect("send failed");
    let echoed = client.recv().await.expect("recv failed");
    assert_eq!(echoed, vec![DecodedFrame::Text("ping".to_owned())]);
}
