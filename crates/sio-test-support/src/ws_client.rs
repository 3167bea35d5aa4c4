use futures_util::{SinkExt, StreamExt};
use sio_protocol::{DecodedFrame, Message};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::MaybeTlsStream;

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Drives a single WebSocket connection against a running gateway, speaking
/// the 0.6 wire protocol directly (no client-side session/handshake logic —
/// tests construct frames with [`sio_protocol`] the same way the gateway
/// does).
pub struct WsTestClient {
    write: futures_util::stream::SplitSink<WsStream, WsMessage>,
    read: futures_util::stream::SplitStream<WsStream>,
}

impl WsTestClient {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
        let (write, read) = stream.split();
        Ok(Self { write, read })
    }

    /// Sends one already wire-encoded frame as a text message.
    pub async fn send_raw(&mut self, bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
        let text = String::from_utf8(bytes)?;
        self.write.send(WsMessage::Text(text.into())).await?;
        Ok(())
    }

    /// Encodes and sends a single logical message.
    pub async fn send(&mut self, message: Message) -> Result<(), Box<dyn std::error::Error>> {
        self.send_raw(message.encode()).await
    }

    /// Waits for the next text frame and decodes every message packed into
    /// it, skipping WebSocket-level ping/pong control frames.
    pub async fn recv(&mut self) -> Result<Vec<DecodedFrame>, Box<dyn std::error::Error>> {
        loop {
            match self.read.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    return Ok(sio_protocol::decode(text.as_bytes())?);
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => continue,
                Some(Ok(WsMessage::Close(_))) => {
                    return Err("connection closed by server".into())
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(err.into()),
                None => return Err("connection stream ended".into()),
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.write.send(WsMessage::Close(None)).await?;
        Ok(())
    }
}
