use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use super::{PeerEventHandler, Transport};
use crate::error::TransportError;

const SUPPORTED_SCHEMES: [&str; 3] = ["tcp://", "ipc://", "inproc://"];

static NEXT_MONITOR_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
pub struct ZmqEndpointConfig {
    pub endpoint: String,
    /// Upper bound on how long a queued outbound frame waits for the I/O thread.
    pub poll_interval_ms: i64,
}

impl Default for ZmqEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("ipc:///tmp/vision_arm.ipc"),
            poll_interval_ms: 10,
        }
    }
}

impl ZmqEndpointConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.endpoint.trim().is_empty() {
            return Err(TransportError::invalid_endpoint("endpoint is empty"));
        }
        if !SUPPORTED_SCHEMES
            .iter()
            .any(|scheme| self.endpoint.starts_with(scheme))
        {
            return Err(TransportError::invalid_endpoint(format!(
                "{} (expected one of {:?})",
                self.endpoint, SUPPORTED_SCHEMES
            )));
        }
        if self.poll_interval_ms <= 0 {
            return Err(TransportError::invalid_endpoint(
                "poll interval must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
enum PeerEvent {
    Message { remote_id: String, data: Vec<u8> },
    Connection { remote_id: String, connected: bool },
    Error { remote_id: String, code: i32, message: String },
}

type HandlerSlot = Arc<Mutex<Option<Weak<dyn PeerEventHandler>>>>;

/// Single-peer ZMQ `PAIR` endpoint.
///
/// An I/O thread owns the socket: it polls for inbound frames and monitor
/// events and flushes the outbound queue. Inbound events are handed to a
/// dispatch thread which runs the handler callbacks one at a time, so a slow
/// handler never stalls outbound traffic.
pub struct ZmqPeer {
    config: ZmqEndpointConfig,
    context: zmq::Context,
    handler: HandlerSlot,
    running: Arc<AtomicBool>,
    outbound: Mutex<Option<Sender<Vec<u8>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ZmqPeer {
    pub fn new(config: ZmqEndpointConfig) -> Result<Self, TransportError> {
        config.validate()?;
        Ok(Self {
            config,
            context: zmq::Context::new(),
            handler: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            outbound: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn open_sockets(&self) -> Result<(zmq::Socket, zmq::Socket), TransportError> {
        let socket = self.context.socket(zmq::PAIR)?;
        socket.set_linger(0)?;
        socket
            .bind(&self.config.endpoint)
            .map_err(|e| TransportError::bind(self.config.endpoint.as_str(), e))?;

        let monitor_endpoint = format!(
            "inproc://arm-peer-monitor-{}",
            NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed)
        );
        let events = zmq::SocketEvent::ACCEPTED.to_raw() | zmq::SocketEvent::DISCONNECTED.to_raw();
        socket.monitor(&monitor_endpoint, i32::from(events))?;

        let monitor = self.context.socket(zmq::PAIR)?;
        monitor.connect(&monitor_endpoint)?;
        Ok((socket, monitor))
    }
}

impl Transport for ZmqPeer {
    fn register_event_handler(&self, handler: Weak<dyn PeerEventHandler>) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn start(&self) -> Result<(), TransportError> {
        if self.is_running() {
            return Err(TransportError::AlreadyRunning);
        }

        let (socket, monitor) = self.open_sockets()?;
        let (outbound_tx, outbound_rx) = channel::unbounded();
        let (event_tx, event_rx) = channel::unbounded();

        self.running.store(true, Ordering::SeqCst);

        let io = IoLoop {
            socket,
            monitor,
            endpoint: self.config.endpoint.clone(),
            poll_interval_ms: self.config.poll_interval_ms,
            running: Arc::clone(&self.running),
            outbound: outbound_rx,
            events: event_tx,
            active_peer: None,
        };
        let io_handle = match thread::Builder::new()
            .name("zmq-peer-io".into())
            .spawn(move || io.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        let handler = Arc::clone(&self.handler);
        let dispatch_handle = match thread::Builder::new()
            .name("zmq-peer-dispatch".into())
            .spawn(move || dispatch_events(event_rx, handler))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = io_handle.join();
                return Err(e.into());
            }
        };

        *self.outbound.lock().unwrap_or_else(PoisonError::into_inner) = Some(outbound_tx);
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend([io_handle, dispatch_handle]);

        info!("ZMQ peer listening on {}", self.config.endpoint);
        Ok(())
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let workers: Vec<JoinHandle<()>> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let current = thread::current().id();
        for worker in workers {
            // stop() may be reached from a handler running on the dispatch thread.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                error!("ZMQ peer worker thread panicked");
            }
        }

        info!("ZMQ peer on {} stopped", self.config.endpoint);
    }

    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let guard = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = guard.as_ref().ok_or(TransportError::NotRunning)?;
        sender
            .send(frame.to_vec())
            .map_err(|_| TransportError::QueueClosed)
    }
}

impl Drop for ZmqPeer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct IoLoop {
    socket: zmq::Socket,
    monitor: zmq::Socket,
    endpoint: String,
    poll_interval_ms: i64,
    running: Arc<AtomicBool>,
    outbound: Receiver<Vec<u8>>,
    events: Sender<PeerEvent>,
    active_peer: Option<String>,
}

impl IoLoop {
    fn run(mut self) {
        debug!("ZMQ I/O thread started for {}", self.endpoint);

        while self.running.load(Ordering::SeqCst) {
            self.flush_outbound();

            let polled = {
                let mut items = [
                    self.socket.as_poll_item(zmq::POLLIN),
                    self.monitor.as_poll_item(zmq::POLLIN),
                ];
                zmq::poll(&mut items, self.poll_interval_ms)
                    .map(|_| (items[0].is_readable(), items[1].is_readable()))
            };

            match polled {
                Ok((data_ready, monitor_ready)) => {
                    if monitor_ready {
                        self.read_monitor_events();
                    }
                    if data_ready {
                        self.read_messages();
                    }
                }
                Err(zmq::Error::EINTR) => continue,
                Err(e) => {
                    error!("ZMQ poll failed: {}", e);
                    self.emit_error(e);
                }
            }
        }

        self.flush_outbound();
        debug!("ZMQ I/O thread for {} exiting", self.endpoint);
    }

    fn remote_id(&self) -> String {
        self.active_peer
            .clone()
            .unwrap_or_else(|| self.endpoint.clone())
    }

    fn emit(&self, event: PeerEvent) {
        if self.events.send(event).is_err() {
            warn!("Dropping peer event: dispatch thread is gone");
        }
    }

    fn emit_error(&self, e: zmq::Error) {
        self.emit(PeerEvent::Error {
            remote_id: self.remote_id(),
            code: e.to_raw(),
            message: e.to_string(),
        });
    }

    fn flush_outbound(&self) {
        for frame in self.outbound.try_iter() {
            match self.socket.send(frame.as_slice(), zmq::DONTWAIT) {
                Ok(()) => trace!("Sent {} bytes to {}", frame.len(), self.remote_id()),
                Err(e) => {
                    warn!("Failed to send {} bytes: {}", frame.len(), e);
                    self.emit_error(e);
                }
            }
        }
    }

    fn read_messages(&self) {
        loop {
            match self.socket.recv_bytes(zmq::DONTWAIT) {
                Ok(data) => {
                    trace!("Received {} bytes", data.len());
                    self.emit(PeerEvent::Message {
                        remote_id: self.remote_id(),
                        data,
                    });
                }
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => {
                    error!("ZMQ receive failed: {}", e);
                    self.emit_error(e);
                    break;
                }
            }
        }
    }

    fn read_monitor_events(&mut self) {
        loop {
            let parts = match self.monitor.recv_multipart(zmq::DONTWAIT) {
                Ok(parts) => parts,
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => {
                    error!("ZMQ monitor receive failed: {}", e);
                    break;
                }
            };

            let Some((event, value, address)) = parse_monitor_event(&parts) else {
                warn!("Ignoring malformed monitor event ({} parts)", parts.len());
                continue;
            };
            let remote_id = format!("{}#{}", address, value);

            if event == zmq::SocketEvent::ACCEPTED.to_raw() {
                self.active_peer = Some(remote_id.clone());
                self.emit(PeerEvent::Connection {
                    remote_id,
                    connected: true,
                });
            } else if event == zmq::SocketEvent::DISCONNECTED.to_raw() {
                if self.active_peer.as_deref() == Some(remote_id.as_str()) {
                    self.active_peer = None;
                }
                self.emit(PeerEvent::Connection {
                    remote_id,
                    connected: false,
                });
            } else {
                trace!("Ignoring monitor event 0x{:04X} on {}", event, address);
            }
        }
    }
}

/// Monitor frames: `[u16 event | u32 value]` followed by the peer address.
fn parse_monitor_event(parts: &[Vec<u8>]) -> Option<(u16, u32, String)> {
    let header = parts.first()?;
    if header.len() < 6 {
        return None;
    }
    let event = u16::from_le_bytes([header[0], header[1]]);
    let value = u32::from_le_bytes([header[2], header[3], header[4], header[5]]);
    let address = parts
        .get(1)
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .unwrap_or_default();
    Some((event, value, address))
}

fn dispatch_events(events: Receiver<PeerEvent>, handler: HandlerSlot) {
    for event in events.iter() {
        let target = handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        let Some(target) = target else {
            debug!("No event handler registered, dropping {:?}", event);
            continue;
        };

        match event {
            PeerEvent::Message { remote_id, data } => target.on_message(&remote_id, &data),
            PeerEvent::Connection {
                remote_id,
                connected,
            } => target.on_connection(&remote_id, connected),
            PeerEvent::Error {
                remote_id,
                code,
                message,
            } => target.on_error(&remote_id, code, &message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_validation() {
        assert!(ZmqEndpointConfig::new("ipc:///tmp/arm.ipc").validate().is_ok());
        assert!(ZmqEndpointConfig::new("tcp://127.0.0.1:5560").validate().is_ok());
        assert!(ZmqEndpointConfig::new("").validate().is_err());
        assert!(ZmqEndpointConfig::new("udp://127.0.0.1:1").validate().is_err());

        let mut config = ZmqEndpointConfig::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        assert!(matches!(
            ZmqPeer::new(ZmqEndpointConfig::new("not-an-endpoint")),
            Err(TransportError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_send_before_start_fails() {
        let peer = ZmqPeer::new(ZmqEndpointConfig::new("inproc://arm-peer-unstarted")).unwrap();
        assert_eq!(peer.endpoint(), "inproc://arm-peer-unstarted");
        assert!(!peer.is_running());
        assert!(matches!(peer.send(&[1, 2, 3]), Err(TransportError::NotRunning)));
        peer.stop();
    }

    #[test]
    fn test_parse_monitor_event() {
        let mut header = 0x0020u16.to_le_bytes().to_vec();
        header.extend_from_slice(&17u32.to_le_bytes());
        let parts = vec![header, b"ipc:///tmp/arm.ipc".to_vec()];
        assert_eq!(
            parse_monitor_event(&parts),
            Some((0x0020, 17, String::from("ipc:///tmp/arm.ipc")))
        );
        assert_eq!(parse_monitor_event(&[vec![1, 2]]), None);
        assert_eq!(parse_monitor_event(&[]), None);
    }
}
