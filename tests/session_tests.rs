//! Connection session lifecycle tests against in-memory transports.

use serialmon::core::event::{event_channel, EventReceiver};
use serialmon::infrastructure::serial::{SerialTransport, TransportFactory};
use serialmon::{
    ConnectionConfig, ConnectionSession, ConnectionState, ErrorContext, EventKind, MonitorError,
    SessionEvent, StatusKind,
};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Transport driven by a script of read results. Reads beyond the script
/// behave like timeouts (no data).
struct MockTransport {
    reads: VecDeque<io::Result<Option<Vec<u8>>>>,
    fail_writes: bool,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockTransport {
    fn scripted(reads: Vec<io::Result<Option<Vec<u8>>>>) -> Self {
        Self {
            reads: reads.into(),
            fail_writes: false,
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn quiet() -> Self {
        Self::scripted(Vec::new())
    }
}

impl SerialTransport for MockTransport {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.reads.pop_front().unwrap_or(Ok(None))
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
        }
        self.written.lock().unwrap().push(data.to_vec());
        Ok(())
    }
}

/// Transport whose reads block for a full read-timeout interval, for
/// exercising the cancellation latency bound.
struct BlockingTransport;

impl SerialTransport for BlockingTransport {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        std::thread::sleep(Duration::from_secs(1));
        Ok(None)
    }

    fn write_all(&mut self, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Hands out one pre-built transport, then fails like a missing device.
struct OneShotFactory {
    transport: Mutex<Option<Box<dyn SerialTransport>>>,
}

impl OneShotFactory {
    fn new(transport: Box<dyn SerialTransport>) -> Box<Self> {
        Box::new(Self {
            transport: Mutex::new(Some(transport)),
        })
    }
}

impl TransportFactory for OneShotFactory {
    fn open(&self, _config: &ConnectionConfig) -> io::Result<Box<dyn SerialTransport>> {
        self.transport
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such device"))
    }
}

fn config() -> ConnectionConfig {
    ConnectionConfig::new("/dev/ttyUSB0", 115200)
}

async fn next_event(rx: &mut EventReceiver) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

fn drain(rx: &mut EventReceiver) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn open_then_close_emits_one_opened_and_one_closed_in_order() {
    let (tx, mut rx) = event_channel();
    let mut session =
        ConnectionSession::new(OneShotFactory::new(Box::new(MockTransport::quiet())), tx);

    session.open(config()).await.unwrap();
    assert_eq!(session.state().await, ConnectionState::Connected);

    session.close().await.unwrap();
    assert_eq!(session.state().await, ConnectionState::Disconnected);

    let status_events: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e.kind {
            EventKind::Status { kind, port } => Some((kind, port)),
            _ => None,
        })
        .collect();
    assert_eq!(
        status_events,
        vec![
            (StatusKind::Opened, "/dev/ttyUSB0".to_string()),
            (StatusKind::Closed, "/dev/ttyUSB0".to_string()),
        ]
    );
}

#[tokio::test]
async fn open_with_invalid_config_fails_without_state_change_or_events() {
    let (tx, mut rx) = event_channel();
    let mut session =
        ConnectionSession::new(OneShotFactory::new(Box::new(MockTransport::quiet())), tx);

    let result = session.open(ConnectionConfig::new("", 9600)).await;
    assert!(matches!(result, Err(MonitorError::InvalidConfig { .. })));

    let result = session.open(ConnectionConfig::new("/dev/ttyUSB0", 1200)).await;
    assert!(matches!(result, Err(MonitorError::InvalidConfig { .. })));

    assert_eq!(session.state().await, ConnectionState::Disconnected);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn close_on_disconnected_session_is_a_noop() {
    let (tx, mut rx) = event_channel();
    let mut session =
        ConnectionSession::new(OneShotFactory::new(Box::new(MockTransport::quiet())), tx);

    session.close().await.unwrap();
    assert_eq!(session.state().await, ConnectionState::Disconnected);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn reader_emits_one_received_per_line_and_skips_empty_lines() {
    let (tx, mut rx) = event_channel();
    let transport = MockTransport::scripted(vec![
        Ok(Some(b"hello\r".to_vec())),
        Ok(Some(Vec::new())), // empty line: no event
        Ok(None),             // timeout: no event
    ]);
    let mut session = ConnectionSession::new(OneShotFactory::new(Box::new(transport)), tx);

    session.open(config()).await.unwrap();
    let opened = next_event(&mut rx).await;
    assert!(matches!(opened.kind, EventKind::Status { kind: StatusKind::Opened, .. }));

    let received = next_event(&mut rx).await;
    assert_eq!(
        received.kind,
        EventKind::Received {
            payload: "hello".to_string()
        }
    );

    session.close().await.unwrap();
    let rest = drain(&mut rx);
    assert!(rest
        .iter()
        .all(|e| !matches!(e.kind, EventKind::Received { .. })));
}

#[tokio::test]
async fn fatal_read_error_tears_the_session_down() {
    let (tx, mut rx) = event_channel();
    let transport = MockTransport::scripted(vec![
        Ok(Some(b"one".to_vec())),
        Ok(Some(b"two".to_vec())),
        Err(io::Error::new(io::ErrorKind::Other, "device unplugged")),
    ]);
    let mut session = ConnectionSession::new(OneShotFactory::new(Box::new(transport)), tx);

    session.open(config()).await.unwrap();
    assert!(matches!(
        next_event(&mut rx).await.kind,
        EventKind::Status { kind: StatusKind::Opened, .. }
    ));

    assert_eq!(
        next_event(&mut rx).await.kind,
        EventKind::Received { payload: "one".to_string() }
    );
    assert_eq!(
        next_event(&mut rx).await.kind,
        EventKind::Received { payload: "two".to_string() }
    );

    let error = next_event(&mut rx).await;
    assert!(matches!(
        error.kind,
        EventKind::Error { context: ErrorContext::Read, .. }
    ));

    // The reader runs teardown itself: handle released, Closed emitted,
    // state converges to Disconnected without anyone calling close()
    let closed = next_event(&mut rx).await;
    assert!(matches!(
        closed.kind,
        EventKind::Status { kind: StatusKind::Closed, .. }
    ));
    assert_eq!(session.state().await, ConnectionState::Disconnected);

    // Explicit close afterwards is still a clean no-op
    session.close().await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn send_writes_bytes_without_framing_and_emits_sent() {
    let (tx, mut rx) = event_channel();
    let transport = MockTransport::quiet();
    let written = Arc::clone(&transport.written);
    let mut session = ConnectionSession::new(OneShotFactory::new(Box::new(transport)), tx);

    session.open(config()).await.unwrap();
    session.send("AT+GMR").await.unwrap();

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::Sent { payload } if payload == "AT+GMR"
    )));
    assert_eq!(written.lock().unwrap().as_slice(), [b"AT+GMR".to_vec()]);

    session.close().await.unwrap();
}

#[tokio::test]
async fn send_failure_keeps_the_session_connected() {
    let (tx, mut rx) = event_channel();
    let mut transport = MockTransport::quiet();
    transport.fail_writes = true;
    let mut session = ConnectionSession::new(OneShotFactory::new(Box::new(transport)), tx);

    session.open(config()).await.unwrap();
    session.send("ping").await.unwrap();

    let write_errors: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e.kind, EventKind::Error { context: ErrorContext::Write, .. }))
        .collect();
    assert_eq!(write_errors.len(), 1);
    assert_eq!(session.state().await, ConnectionState::Connected);

    session.close().await.unwrap();
}

#[tokio::test]
async fn send_while_disconnected_is_a_precondition_error() {
    let (tx, mut rx) = event_channel();
    let session =
        ConnectionSession::new(OneShotFactory::new(Box::new(MockTransport::quiet())), tx);

    let result = session.send("hello").await;
    assert!(matches!(result, Err(MonitorError::InvalidConfig { .. })));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_returns_within_the_cancellation_latency_bound() {
    let (tx, _rx) = event_channel();
    let mut session =
        ConnectionSession::new(OneShotFactory::new(Box::new(BlockingTransport)), tx);

    session.open(config()).await.unwrap();
    // Let the reader commit to a blocking read
    tokio::time::sleep(Duration::from_millis(300)).await;

    let start = Instant::now();
    session.close().await.unwrap();
    let elapsed = start.elapsed();

    // Bound: read timeout (1 s) + idle pacing (0.2 s), with slack for CI
    assert!(
        elapsed < Duration::from_secs(2),
        "close took {:?}, exceeding the latency bound",
        elapsed
    );
    assert_eq!(session.state().await, ConnectionState::Disconnected);
}

#[tokio::test]
async fn reopen_after_close_starts_a_fresh_session() {
    struct RepeatFactory;
    impl TransportFactory for RepeatFactory {
        fn open(&self, _config: &ConnectionConfig) -> io::Result<Box<dyn SerialTransport>> {
            Ok(Box::new(MockTransport::quiet()))
        }
    }

    let (tx, mut rx) = event_channel();
    let mut session = ConnectionSession::new(Box::new(RepeatFactory), tx);

    session.open(config()).await.unwrap();
    session.close().await.unwrap();
    session.open(config()).await.unwrap();
    assert_eq!(session.state().await, ConnectionState::Connected);
    session.close().await.unwrap();

    let status_kinds: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e.kind {
            EventKind::Status { kind, .. } => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        status_kinds,
        vec![
            StatusKind::Opened,
            StatusKind::Closed,
            StatusKind::Opened,
            StatusKind::Closed,
        ]
    );
}
