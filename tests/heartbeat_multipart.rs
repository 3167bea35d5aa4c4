//! §8 scenario 3: "Heartbeat on multipart." A multipart GET with no
//! activity for `heartbeat_interval` produces a Heartbeat frame in its own
//! MIME part, with a monotonically increasing counter.

use futures_util::StreamExt;
use gateway::{build_app, echo_factory};
use sio_transport::GatewayConfig;
use std::time::Duration;

async fn start_gateway() -> (String, sio_transport::GatewayState) {
    let config = GatewayConfig {
        heartbeat_interval: Duration::from_millis(150),
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
async fn idle_multipart_connection_gets_heartbeats() {
    let (base_url, state) = start_gateway().await;
    let handle = state.resolve_session(None).expect("fresh session");
    let session_id = handle.id().as_str().to_owned();

    let url = format!("{base_url}/socket.io/1/xhr-multipart/{session_id}");
    let response = reqwest::get(&url).await.expect("request failed");
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("multipart/x-mixed-replace;boundary=\"socketio\"")
    );

    let mut stream = response.bytes_stream();
    let mut buffer = Vec::new();

    // Collect bytes until we have seen the session-id part and at least
    // one heartbeat part, or give up after a few heartbeat intervals.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                    _ => break,
                }
            }
            () = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        if String::from_utf8_lossy(&buffer).matches("~h~").count() >= 1 {
            break;
        }
    }

    let text = String::from_utf8_lossy(&buffer);
    assert!(text.contains("--socketio"), "missing opening boundary: {text:?}");
    assert!(
        text.contains(&session_id),
        "expected the session id handshake part before any heartbeat: {text:?}"
    );
    assert!(text.contains("~h~"), "expected at least one heartbeat frame: {text:?}");
}
