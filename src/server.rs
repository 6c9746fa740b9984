//! Dual-listener event loop.
//!
//! One thread, one blocking poll over both listeners and the shutdown
//! pipe. Each iteration accepts at most one pending connection and serves
//! it to completion before waiting again, so at most one request is ever
//! in flight. The local listener always wins when both listeners are
//! ready at once; that fixed tie-break keeps dispatch deterministic.

use crate::handler;
use crate::shutdown::Shutdown;
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener};
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixListener;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const LOCAL_LISTENER: Token = Token(0);
const TCP_LISTENER: Token = Token(1);
const SHUTDOWN: Token = Token(2);

/// The server: both listeners plus the readiness loop state.
pub struct Server {
    poll: Poll,
    events: Events,
    local: UnixListener,
    tcp: TcpListener,
    shutdown: Shutdown,
    /// Cached readiness per listener. mio delivers edges, not levels;
    /// readiness stays cached here until an accept reports `WouldBlock`,
    /// which restores the level-triggered behavior the serial accept
    /// discipline needs.
    local_ready: bool,
    tcp_ready: bool,
}

impl Server {
    /// Register both listeners and the shutdown pipe with a fresh poll.
    pub fn new(
        local: UnixListener,
        tcp: TcpListener,
        mut shutdown: Shutdown,
    ) -> io::Result<Self> {
        let poll = Poll::new()?;
        let local_fd = local.as_raw_fd();
        let tcp_fd = tcp.as_raw_fd();
        poll.registry()
            .register(&mut SourceFd(&local_fd), LOCAL_LISTENER, Interest::READABLE)?;
        poll.registry()
            .register(&mut SourceFd(&tcp_fd), TCP_LISTENER, Interest::READABLE)?;
        poll.registry()
            .register(shutdown.receiver_mut(), SHUTDOWN, Interest::READABLE)?;

        Ok(Server {
            poll,
            events: Events::with_capacity(8),
            local,
            tcp,
            shutdown,
            local_ready: false,
            tcp_ready: false,
        })
    }

    /// Address of the TCP listener (the actual port when bound to 0).
    pub fn tcp_addr(&self) -> io::Result<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Run until shutdown is requested.
    ///
    /// Poll errors other than interruption are fatal and returned to the
    /// caller. Per-connection I/O failures are logged and the loop keeps
    /// serving; they never take the process down.
    pub fn run(&mut self) -> io::Result<()> {
        while !self.shutdown.is_set() {
            // Block only when nothing is cached as ready; otherwise do a
            // zero-timeout sweep so a listener that became ready in the
            // meantime still takes part in the tie-break.
            let timeout = if self.local_ready || self.tcp_ready {
                Some(Duration::ZERO)
            } else {
                None
            };
            match self.poll.poll(&mut self.events, timeout) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            let mut wake = false;
            for event in self.events.iter() {
                match event.token() {
                    LOCAL_LISTENER => self.local_ready = true,
                    TCP_LISTENER => self.tcp_ready = true,
                    SHUTDOWN => wake = true,
                    Token(_) => {}
                }
            }
            if wake {
                self.shutdown.drain();
                continue;
            }

            if self.local_ready {
                self.serve_local();
            } else if self.tcp_ready {
                self.serve_tcp();
            }
        }
        Ok(())
    }

    /// Close both listeners and remove the local endpoint's path.
    pub fn cleanup(self, path: &Path) -> io::Result<()> {
        drop(self.local);
        drop(self.tcp);
        std::fs::remove_file(path)
    }

    fn serve_local(&mut self) {
        match self.local.accept() {
            Ok((mut stream, _)) => {
                debug!(transport = "local", "Accepted connection");
                // Accepted sockets can inherit the listener's non-blocking
                // flag on some platforms; the handler needs blocking I/O.
                let result = stream
                    .set_nonblocking(false)
                    .and_then(|()| handler::handle(&mut stream));
                if let Err(e) = result {
                    warn!(transport = "local", error = %e, "Connection failed");
                }
            }
            // Readiness raced with another accept; not an error.
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => self.local_ready = false,
            Err(e) => {
                warn!(transport = "local", error = %e, "Accept failed");
                self.local_ready = false;
            }
        }
    }

    fn serve_tcp(&mut self) {
        match self.tcp.accept() {
            Ok((mut stream, peer)) => {
                debug!(transport = "tcp", peer = %peer, "Accepted connection");
                let result = stream
                    .set_nonblocking(false)
                    .and_then(|()| handler::handle(&mut stream));
                if let Err(e) = result {
                    warn!(transport = "tcp", peer = %peer, error = %e, "Connection failed");
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => self.tcp_ready = false,
            Err(e) => {
                warn!(transport = "tcp", error = %e, "Accept failed");
                self.tcp_ready = false;
            }
        }
    }
}
