//! WebSocket-backed [`PeerSink`].
//!
//! Events are queued on a bounded channel and written by a dedicated task,
//! so the relay never awaits the network. A full buffer is reported as
//! backpressure instead of blocking the caller.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::domain::relay::PeerEvent;
use crate::ports::{DeliveryError, PeerSink};

#[derive(Debug)]
enum Outbound {
    Text(String),
    Ping,
}

#[derive(Debug)]
struct Shared {
    open: AtomicBool,
    closer: Notify,
}

/// Outbound half of one WebSocket connection.
#[derive(Debug)]
pub struct WebSocketPeer {
    tx: mpsc::Sender<Outbound>,
    shared: Arc<Shared>,
}

impl WebSocketPeer {
    /// Start the writer task over `sink` and return the peer handle.
    ///
    /// The task ends when the peer is terminated, dropped, or a write
    /// fails; it sends a close frame on the way out.
    pub fn spawn<S>(sink: S, buffer: usize) -> (Arc<Self>, JoinHandle<()>)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: fmt::Display + Send,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let shared = Arc::new(Shared {
            open: AtomicBool::new(true),
            closer: Notify::new(),
        });
        let writer = tokio::spawn(write_loop(sink, rx, shared.clone()));
        (Arc::new(Self { tx, shared }), writer)
    }

    fn enqueue(&self, outbound: Outbound) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::Closed);
        }
        self.tx.try_send(outbound).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

impl PeerSink for WebSocketPeer {
    fn deliver(&self, event: &PeerEvent) -> Result<(), DeliveryError> {
        let text = event
            .to_json()
            .map_err(|e| DeliveryError::Encode(e.to_string()))?;
        self.enqueue(Outbound::Text(text))
    }

    fn probe(&self) -> Result<(), DeliveryError> {
        self.enqueue(Outbound::Ping)
    }

    fn terminate(&self) {
        if self.shared.open.swap(false, Ordering::SeqCst) {
            self.shared.closer.notify_one();
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst) && !self.tx.is_closed()
    }
}

async fn write_loop<S>(mut sink: S, mut rx: mpsc::Receiver<Outbound>, shared: Arc<Shared>)
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = shared.closer.notified() => None,
            outbound = rx.recv() => outbound,
        };
        let Some(outbound) = next else {
            break;
        };
        let frame = match outbound {
            Outbound::Text(text) => Message::Text(text),
            Outbound::Ping => Message::Ping(Vec::new()),
        };
        if let Err(err) = sink.send(frame).await {
            tracing::debug!(error = %err, "websocket write failed");
            break;
        }
    }

    shared.open.store(false, Ordering::SeqCst);
    rx.close();
    let _ = sink.send(Message::Close(None)).await;
    let _ = sink.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc as fmpsc;
    use futures::StreamExt;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    // Never accepts a frame, so the writer stalls on its first send.
    struct StuckSink;

    impl Sink<Message> for StuckSink {
        type Error = Infallible;

        fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
        fn start_send(self: Pin<&mut Self>, _: Message) -> Result<(), Self::Error> {
            Ok(())
        }
        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    async fn next_frame(rx: &mut fmpsc::UnboundedReceiver<Message>) -> Option<Message> {
        tokio::time::timeout(Duration::from_secs(1), rx.next())
            .await
            .expect("writer produced no frame")
    }

    #[tokio::test]
    async fn deliver_writes_json_text_frame() {
        let (sink, mut frames) = fmpsc::unbounded();
        let (peer, _writer) = WebSocketPeer::spawn(sink, 8);

        peer.deliver(&PeerEvent::Matched { initiator: true }).unwrap();

        match next_frame(&mut frames).await {
            Some(Message::Text(text)) => assert_eq!(text, r#"{"type":"match","initiator":true}"#),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn probe_writes_ping_frame() {
        let (sink, mut frames) = fmpsc::unbounded();
        let (peer, _writer) = WebSocketPeer::spawn(sink, 8);

        peer.probe().unwrap();

        assert!(matches!(next_frame(&mut frames).await, Some(Message::Ping(_))));
    }

    #[tokio::test]
    async fn terminate_closes_and_rejects_further_events() {
        let (sink, mut frames) = fmpsc::unbounded();
        let (peer, writer) = WebSocketPeer::spawn(sink, 8);

        peer.terminate();
        peer.terminate();

        assert!(!peer.is_open());
        assert_eq!(peer.deliver(&PeerEvent::Waiting), Err(DeliveryError::Closed));
        assert_eq!(peer.probe(), Err(DeliveryError::Closed));
        assert!(matches!(next_frame(&mut frames).await, Some(Message::Close(None))));
        tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .expect("writer did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn failed_write_marks_peer_closed() {
        let (sink, frames) = fmpsc::unbounded();
        drop(frames);
        let (peer, writer) = WebSocketPeer::spawn(sink, 8);

        peer.deliver(&PeerEvent::Waiting).unwrap();
        tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .expect("writer did not stop")
            .unwrap();

        assert!(!peer.is_open());
        assert_eq!(peer.deliver(&PeerEvent::Waiting), Err(DeliveryError::Closed));
    }

    #[tokio::test]
    async fn full_buffer_reports_backpressure() {
        let (peer, _writer) = WebSocketPeer::spawn(StuckSink, 1);

        // one frame can sit in the writer, one in the channel
        let results: Vec<_> = (0..3).map(|_| peer.deliver(&PeerEvent::Waiting)).collect();

        assert!(results.contains(&Err(DeliveryError::Backpressure)));
        assert!(peer.is_open());
    }
}
