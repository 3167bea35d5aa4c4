//! §8 scenario 1: "Echo over XHR-polling." POST a data frame, then GET and
//! observe the echoed frame, byte-for-byte.

use gateway::{build_app, echo_factory};
use sio_transport::GatewayConfig;
use std::time::Duration;

async fn start_gateway() -> (String, sio_transport::GatewayState) {
    let config = GatewayConfig {
        xhr_polling_timeout: Duration::from_millis(200),
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
async fn echo_round_trip_over_xhr_polling() {
    let (base_url, state) = start_gateway().await;
    let handle = state.resolve_session(None).expect("fresh session");
    let session_id = handle.id().as_str().to_owned();

    let client = sio_test_support::HttpTestClient::new(&base_url);
    let path = format!("1/xhr-polling/{session_id}");

    // The very first read on a fresh session flushes the session's own id
    // (queued at creation time, §8 scenario 2) before any application data.
    let handshake = client.get(&path).await.expect("handshake get failed");
    assert_eq!(
        handshake,
        vec![sio_protocol::DecodedFrame::Text(session_id)]
    );

    let (status, body) = client
        .post_raw(&path, b"~m~5~m~hello")
        .await
        .expect("post failed");
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    let frames = client.get(&path).await.expect("get failed");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], sio_protocol::DecodedFrame::Text("hello".to_owned()));
}
