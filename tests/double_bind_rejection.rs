//! §8 testable property: "Double-bind rejection." After transport A
//! attaches to a session, attempting to attach transport B yields HTTP 401
//! and does not disturb A.

use gateway::{build_app, echo_factory};
use sio_test_support::WsTestClient;
use sio_transport::GatewayConfig;
use std::time::Duration;

async fn start_gateway() -> (String, sio_transport::GatewayState) {
    let config = GatewayConfig {
        xhr_polling_timeout: Duration::from_millis(5),
        ..GatewayConfig::default()
    };
    let (router, state) = build_app(config, echo_factory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("gateway error");
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn a_second_transport_is_rejected_while_the_first_is_attached() {
    let (base_url, state) = start_gateway().await;
    let handle = state.resolve_session(None).expect("fresh session");
    let session_id = handle.id().as_str().to_owned();

    // Transport A: a WebSocket that stays open for the rest of the test.
    let ws_url = format!(
        "ws://{}/socket.io/1/websocket/{session_id}",
        base_url.trim_start_matches("http://")
    );
    let mut ws = WsTestClient::connect(&ws_url).await.expect("websocket connect failed");
    let _sentinel = ws.recv().await.expect("sentinel recv failed");

    // Transport B: a competing xhr-polling GET on the same session id.
    let http_client = sio_test_support::HttpTestClient::new(&base_url);
    let (status, _body) = http_client
        .get_raw(&format!("1/xhr-polling/{session_id}"))
        .await
        .expect("competing get failed");
    assert_eq!(status, 401);

    // Transport A is undisturbed: it still receives its queued handshake
    // frame and echoes normally.
    let _session_id_frame = ws.recv().await.expect("recv failed");
    ws.send(sio_protocol::Message::Text("still alive".to_owned()))
        .await
        .expect("send failed");
    let echoed = ws.recv().await.expect("recv failed");
    assert_eq!(
        echoed,
        vec![sio_protocol::DecodedFrame::Text("still alive".to_owned())]
    );
}
