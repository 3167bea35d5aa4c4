use sio_protocol::Message;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

/// The currently attached transport's receiving end, from the session's
/// point of view. A session has at most one sink bound at a time.
pub trait Sink: Send + Sync {
    /// Pushes a batch of outbound messages to the transport. Returns
    /// `true` if the transport should detach right after this push
    /// (one-shot semantics — a long-poll GET finishing its response),
    /// `false` if it remains attached awaiting further pushes (streaming
    /// semantics — WebSocket, multipart, htmlfile).
    fn push(&self, messages: Vec<Message>) -> bool;
}

/// A sink that delivers exactly one push through a oneshot channel and
/// always requests detachment afterwards. Used by the XHR/JSONP
/// long-polling and JSONP transports, whose `GET` handler is waiting on
/// the receiving half.
pub struct OneShotSink {
    tx: Mutex<Option<oneshot::Sender<Vec<Message>>>>,
}

impl OneShotSink {
    pub fn new(tx: oneshot::Sender<Vec<Message>>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }
}

impl Sink for OneShotSink {
    fn push(&self, messages: Vec<Message>) -> bool {
        if let Some(tx) = self.tx.lock().unwrap().take() {
            let _ = tx.send(messages);
        }
        true
    }
}

/// A sink that forwards every push over an unbounded channel and stays
/// attached. Used by the persistent/streaming transports (WebSocket,
/// FlashSocket, XHR multipart, HtmlFile), whose write loop owns the
/// receiving half.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Vec<Message>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Vec<Message>>) -> Self {
        Self { tx }
    }
}

impl Sink for ChannelSink {
    fn push(&self, messages: Vec<Message>) -> bool {
        // An error means the receiver (the transport's write loop) is
        // gone, so there is nothing left to stay attached for.
        self.tx.send(messages).is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_shot_sink_delivers_once_and_requests_detach() {
        let (tx, rx) = oneshot::channel();
        let sink = OneShotSink::new(tx);
        let detach = sink.push(vec![Message::Text("hi".to_owned())]);
        assert!(detach);
        assert_eq!(rx.await.unwrap(), vec![Message::Text("hi".to_owned())]);
    }

    #[tokio::test]
    async fn channel_sink_stays_attached_while_the_receiver_lives() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        let detach = sink.push(vec![Message::Text("a".to_owned())]);
        assert!(!detach);
        assert_eq!(rx.recv().await.unwrap(), vec![Message::Text("a".to_owned())]);
    }

    #[tokio::test]
    async fn channel_sink_requests_detach_once_the_receiver_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        drop(rx);
        assert!(sink.push(vec![Message::Text("a".to_owned())]));
    }
}
