//! §8 scenario 2: "Fresh session assignment." A request that names no
//! session id gets a freshly created one, which announces its own id as
//! the first queued message — the first read on it, on whichever
//! transport, sees that id as a lone Text frame.

use gateway::{build_app, echo_factory};
use sio_protocol::DecodedFrame;
use sio_session::SessionId;
use sio_transport::GatewayConfig;
use std::str::FromStr;
use std::time::Duration;

async fn start_gateway() -> String {
    let config = GatewayConfig {
        xhr_polling_timeout: Duration::from_millis(200),
        ..GatewayConfig::default()
    };
    let (router, _state) = build_app(config, echo_factory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("gateway error");
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    format!("http://{addr}")
}

#[tokio::test]
async fn get_with_no_session_id_creates_one_and_announces_it() {
    let base_url = start_gateway().await;
    let client = sio_test_support::HttpTestClient::new(&base_url);

    let frames = client.get("1/xhr-polling").await.expect("get failed");
    assert_eq!(frames.len(), 1);
    let DecodedFrame::Text(id) = &frames[0] else {
        panic!("expected a Text frame carrying the new session id, got {frames:?}");
    };
    let session_id = SessionId::from_str(id).expect("server-issued id must be well-formed");

    // The session now exists: a follow-up request addressed to it is
    // accepted rather than rejected with SessionNotFound.
    let (status, _) = client
        .get_raw(&format!("1/xhr-polling/{session_id}"))
        .await
        .expect("follow-up get failed");
    assert_eq!(status, 200);
}

#[tokio::test]
async fn post_with_no_session_id_also_creates_one() {
    let base_url = start_gateway().await;
    let client = sio_test_support::HttpTestClient::new(&base_url);

    // POST never binds as a sink, so this only exercises the "server
    // creates session" half of the scenario — the session this creates is
    // anonymous to the client same as a fire-and-forget first contact, and
    // cleaned up naturally once it idles past expiry.
    let (status, body) = client
        .post_raw("1/xhr-polling", b"~m~5~m~hello")
        .await
        .expect("post failed");
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}
