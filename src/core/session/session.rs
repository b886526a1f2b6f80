use crate::core::event::{ErrorContext, EventSender, SessionEvent, StatusKind};
use crate::core::session::{reader, state::ConnectionState};
use crate::domain::{
    config::ConnectionConfig,
    error::{MonitorError, MonitorResult},
};
use crate::infrastructure::serial::{SerialTransport, TransportFactory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// The one live connection session.
///
/// Created once at startup in `Disconnected` state and re-opened/closed for
/// the life of the process. Owns at most one transport handle and at most one
/// reader task; the reader task exists iff the state is `Connected` (modulo
/// the brief `Closing` window while teardown runs).
pub struct ConnectionSession {
    inner: Arc<SessionInner>,
    factory: Box<dyn TransportFactory>,
    reader: Option<tokio::task::JoinHandle<()>>,
}

/// State shared between the foreground control path and the reader task.
///
/// The transport handle and connection state are the only cross-context
/// data; everything else the reader touches goes out over the event channel.
pub(crate) struct SessionInner {
    pub(super) state: RwLock<ConnectionState>,
    pub(super) transport: Mutex<Option<Box<dyn SerialTransport>>>,
    pub(super) port: RwLock<String>,
    pub(super) stop: AtomicBool,
    events: EventSender,
}

impl SessionInner {
    pub(super) fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }

    pub(super) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Single teardown entry point, shared by `close()` and the reader's
    /// exit path. Idempotent: the first caller flips the state to
    /// `Disconnected` under the write lock, everyone else is a no-op.
    pub(super) async fn teardown(&self) {
        {
            let mut state = self.state.write().await;
            if *state == ConnectionState::Disconnected {
                return;
            }
            *state = ConnectionState::Disconnected;
        }

        if let Some(mut transport) = self.transport.lock().await.take() {
            if let Err(e) = transport.shutdown() {
                // Teardown must not get stuck: report and complete anyway.
                warn!("error releasing serial handle: {}", e);
                self.emit(SessionEvent::error(ErrorContext::Close, e.to_string()));
            }
        }

        let port = self.port.read().await.clone();
        self.emit(SessionEvent::status(StatusKind::Closed, port));
    }
}

impl ConnectionSession {
    /// Create a disconnected session. Events go to `events`; transports are
    /// acquired through `factory` on each `open()`.
    pub fn new(factory: Box<dyn TransportFactory>, events: EventSender) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(ConnectionState::Disconnected),
                transport: Mutex::new(None),
                port: RwLock::new(String::new()),
                stop: AtomicBool::new(false),
                events,
            }),
            factory,
            reader: None,
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.inner.state.read().await
    }

    /// Open the serial port and start the reader task.
    ///
    /// Configuration errors and open failures are returned synchronously and
    /// leave the state `Disconnected`; an open failure additionally logs an
    /// `Error` event so the attempt shows up in the terminal.
    pub async fn open(&mut self, config: ConnectionConfig) -> MonitorResult<()> {
        config.validate()?;

        {
            let mut state = self.inner.state.write().await;
            if *state != ConnectionState::Disconnected {
                return Err(MonitorError::invalid_config(format!(
                    "cannot open while {}",
                    *state
                )));
            }
            *state = ConnectionState::Connecting;
        }

        match self.factory.open(&config) {
            Ok(transport) => {
                *self.inner.transport.lock().await = Some(transport);
                *self.inner.port.write().await = config.port.clone();
                self.inner.stop.store(false, Ordering::SeqCst);
                *self.inner.state.write().await = ConnectionState::Connected;
                self.inner
                    .emit(SessionEvent::status(StatusKind::Opened, &config.port));
                self.reader = Some(tokio::spawn(reader::run(Arc::clone(&self.inner))));
                info!("opened {} at {} baud", config.port, config.baud_rate);
                Ok(())
            }
            Err(e) => {
                // No partial state retained
                *self.inner.state.write().await = ConnectionState::Disconnected;
                self.inner
                    .emit(SessionEvent::error(ErrorContext::Connect, e.to_string()));
                warn!("failed to open {}: {}", config.port, e);
                Err(MonitorError::PortUnavailable {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Close the session. Idempotent: a no-op while already disconnected.
    ///
    /// Signals the reader to stop and waits for it to exit; the reader's exit
    /// path performs the actual teardown, so this never joins a task that
    /// could be waiting on the caller. Latency bound: read timeout plus idle
    /// pacing (~1.2 s).
    pub async fn close(&mut self) -> MonitorResult<()> {
        {
            let mut state = self.inner.state.write().await;
            if *state == ConnectionState::Disconnected {
                return Ok(());
            }
            *state = ConnectionState::Closing;
        }

        self.inner.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.reader.take() {
            if let Err(e) = handle.await {
                warn!("reader task aborted: {}", e);
            }
        }
        // Normally a no-op by now: the reader runs teardown on exit. Covers
        // the degenerate case of a session in Closing with no reader task.
        self.inner.teardown().await;
        info!("session closed");
        Ok(())
    }

    /// Write `text` to the device as UTF-8. No newline is appended; outbound
    /// framing is the caller's decision.
    ///
    /// A write failure is recoverable: it is reported as an `Error` event and
    /// the session stays `Connected`.
    pub async fn send(&self, text: &str) -> MonitorResult<()> {
        if !self.state().await.is_connected() {
            return Err(MonitorError::invalid_config(
                "cannot send: not connected",
            ));
        }

        let result = {
            let mut guard = self.inner.transport.lock().await;
            match guard.as_mut() {
                Some(transport) => transport.write_all(text.as_bytes()),
                None => {
                    return Err(MonitorError::invalid_config(
                        "cannot send: not connected",
                    ))
                }
            }
        };

        match result {
            Ok(()) => {
                debug!("sent {} bytes", text.len());
                self.inner.emit(SessionEvent::sent(text));
            }
            Err(e) => {
                warn!("write failed: {}", e);
                self.inner
                    .emit(SessionEvent::error(ErrorContext::Write, e.to_string()));
            }
        }
        Ok(())
    }
}
