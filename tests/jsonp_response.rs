//! §8 scenario 6: "JSONP response." GET jsonp-polling with index `7` and
//! one queued Text `"hi"` produces `io.JSONP[7]._("~m~2~m~hi");`.

use gateway::{build_app, echo_factory};
use sio_protocol::Message;
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
async fn jsonp_polling_wraps_the_queued_frame_in_the_callback_index() {
    let (base_url, state) = start_gateway().await;
    let handle = state.resolve_session(None).expect("fresh session");
    let conn = handle.connection().expect("connection must exist");
    let session_id = handle.id().as_str().to_owned();

    let client = sio_test_support::HttpTestClient::new(&base_url);

    // Drain the session-id handshake frame every fresh session queues at
    // creation, so the scenario's single queued "hi" frame is the only
    // thing left to read back.
    let handshake_path = format!("1/jsonp-polling/{session_id}/0");
    let _ = client.get(&handshake_path).await.expect("handshake get failed");

    conn.send(Message::Text("hi".to_owned()));

    let path = format!("1/jsonp-polling/{session_id}/7");
    let (status, body) = client.get_raw(&path).await.expect("get failed");
    assert_eq!(status, 200);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "io.JSONP[7]._(\"~m~2~m~hi\");"
    );
}
