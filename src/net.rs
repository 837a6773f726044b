//! The reactor: one loop that accepts connections, frames their input into lines for the state,
//! and flushes what the state has queued for them.

use crate::client::MessageQueueItem;
use crate::reader::LineReader;
use crate::state::State;
use futures::future;
use ircserv_tokens::Message;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{self, Interest};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, Notify};

/// How many bytes are read from a connection at once.
const READ_BUFFER_LENGTH: usize = 4096;

/// A shutdown request, shared between the reactor and whoever asks it to stop.
///
/// The flag is checked once per loop iteration.  The notification wakes the reactor up when it
/// is waiting for readiness.
#[derive(Debug, Default)]
pub struct Shutdown {
    requested: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the reactor to stop.  It finishes its current iteration, then tears everything down.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Why a connection is torn down.
#[derive(Debug)]
enum Teardown {
    /// The client sent QUIT.
    Quit,

    /// The peer closed the connection.
    Closed,

    /// The client is not in the state anymore.
    Removed,

    Error(io::Error),
}

impl Teardown {
    /// The reason given to the other clients, if any.
    fn reason(&self) -> Option<String> {
        match self {
            Teardown::Error(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

/// A live connection and its buffers.
struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    inbound: LineReader,
    outbound: Vec<u8>,

    /// Read end of the client's message queue.
    outgoing: mpsc::UnboundedReceiver<MessageQueueItem>,
}

impl Connection {
    fn new(
        stream: TcpStream,
        addr: SocketAddr,
        outgoing: mpsc::UnboundedReceiver<MessageQueueItem>,
    ) -> Self {
        Self {
            stream,
            addr,
            inbound: LineReader::new(),
            outbound: Vec::new(),
            outgoing,
        }
    }

    /// Write readiness is only watched while there is something to write.
    fn interest(&self) -> Interest {
        if self.outbound.is_empty() {
            Interest::READABLE
        } else {
            Interest::READABLE | Interest::WRITABLE
        }
    }

    /// Moves the queued messages to the outbound buffer.
    fn drain_queue(&mut self) -> Result<(), Teardown> {
        loop {
            match self.outgoing.try_recv() {
                Ok(msg) => {
                    let bytes: &[u8] = msg.as_ref();
                    self.outbound.extend_from_slice(bytes);
                }
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(Teardown::Removed),
            }
        }
    }

    /// Makes one attempt at writing the outbound buffer, and keeps what was not written.
    fn flush(&mut self) -> Result<(), Teardown> {
        if self.outbound.is_empty() {
            return Ok(());
        }
        match self.stream.try_write(&self.outbound) {
            Ok(n) => {
                self.outbound.drain(..n);
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(err) => Err(Teardown::Error(err)),
        }
    }
}

/// What woke the reactor up.
enum Wake {
    Accept(io::Result<(TcpStream, SocketAddr)>),
    Shutdown,
    Ready,
}

/// Binds the listener of the server.
pub async fn listen(addr: SocketAddr) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {}...", listener.local_addr()?);
    Ok(listener)
}

/// Serves clients on `listener` until `shutdown` is requested.
///
/// Connections are keyed by the handle the state gave to their client.  Everything runs on the
/// calling task: the state is never shared.
pub async fn run(listener: TcpListener, state: State, shutdown: Arc<Shutdown>) {
    let mut reactor = Reactor {
        listener,
        state,
        connections: BTreeMap::new(),
    };
    reactor.run(&shutdown).await;
}

struct Reactor {
    listener: TcpListener,
    state: State,
    connections: BTreeMap<usize, Connection>,
}

impl Reactor {
    async fn run(&mut self, shutdown: &Shutdown) {
        while !shutdown.is_requested() {
            let removed: Vec<usize> = self
                .connections
                .iter_mut()
                .filter_map(|(&id, conn)| conn.drain_queue().err().map(|_| id))
                .collect();
            for id in removed {
                self.teardown(id, Teardown::Removed);
            }

            match self.wait(shutdown).await {
                Wake::Accept(Ok((stream, addr))) => self.accept(stream, addr),
                Wake::Accept(Err(err)) => log::warn!("Failed to accept connection: {}", err),
                Wake::Shutdown => continue,
                Wake::Ready => {}
            }

            let ids: Vec<usize> = self.connections.keys().copied().collect();
            for id in ids {
                if let Err(reason) = self.service(id) {
                    self.teardown(id, reason);
                }
            }
        }

        log::info!("Shutting down, closing {} connections", self.connections.len());
        self.state.shutdown();
        self.connections.clear();
    }

    /// Blocks until a connection comes in, one of the connections is ready, or shutdown is
    /// requested.
    async fn wait(&self, shutdown: &Shutdown) -> Wake {
        let readiness: Vec<_> = self
            .connections
            .values()
            .map(|conn| Box::pin(conn.stream.ready(conn.interest())))
            .collect();
        let any_ready = async move {
            if readiness.is_empty() {
                future::pending::<()>().await;
            } else {
                let _ = future::select_all(readiness).await;
            }
        };

        tokio::select! {
            res = self.listener.accept() => Wake::Accept(res),
            _ = shutdown.notify.notified() => Wake::Shutdown,
            _ = any_ready => Wake::Ready,
        }
    }

    fn accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        let (queue, outgoing) = mpsc::unbounded_channel();
        let id = self.state.peer_joined(queue, addr);
        self.connections
            .insert(id, Connection::new(stream, addr, outgoing));
    }

    /// Reads what is available on the connection, hands complete lines to the state, then
    /// writes what can be written.
    fn service(&mut self, id: usize) -> Result<(), Teardown> {
        let conn = match self.connections.get_mut(&id) {
            Some(conn) => conn,
            None => return Ok(()),
        };

        let mut buf = [0; READ_BUFFER_LENGTH];
        match conn.stream.try_read(&mut buf) {
            Ok(0) => return Err(Teardown::Closed),
            Ok(n) => {
                conn.inbound.extend(&buf[..n]);
                while let Some(line) = conn.inbound.next_line() {
                    log::trace!("{} >> {}", id, line);
                    if self.state.handle_message(id, Message::parse(&line)).is_err() {
                        return Err(Teardown::Quit);
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => return Err(Teardown::Error(err)),
        }

        conn.drain_queue()?;
        conn.flush()
    }

    /// Closes the connection and removes its client from the state.  Does nothing if the
    /// connection is already gone.
    fn teardown(&mut self, id: usize, reason: Teardown) {
        if let Some(conn) = self.connections.remove(&id) {
            match reason {
                Teardown::Error(ref err) => log::debug!("{}: {} closed: {}", id, conn.addr, err),
                _ => log::debug!("{}: {} closed ({:?})", id, conn.addr, reason),
            }
            if !conn.inbound.is_empty() {
                log::trace!("{}: dropping {} bytes of partial line", id, conn.inbound.len());
            }
            self.state.peer_quit(id, reason.reason().as_deref());
        }
    }
}
