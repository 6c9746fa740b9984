//! Listener setup for both transports.
//!
//! Both endpoints are created through socket2 so the backlog and socket
//! options are applied the same way, then handed to the event loop as
//! non-blocking std listeners.

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pending-connection queue depth for both listeners.
pub const BACKLOG: i32 = 3;

/// Bind the local (Unix domain) endpoint at `path`.
///
/// A stale path left over from an unclean shutdown is removed first;
/// only a missing entry is ignored, any other removal failure fails the
/// bind.
pub fn bind_local(path: &Path) -> Result<UnixListener, BindError> {
    bind_local_at(path).map_err(|e| BindError::Local(path.to_path_buf(), e))
}

fn bind_local_at(path: &Path) -> io::Result<UnixListener> {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed stale socket path"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.bind(&SockAddr::unix(path)?)?;
    socket.listen(BACKLOG)?;
    socket.set_nonblocking(true)?;
    Ok(socket.into())
}

/// Bind the TCP endpoint on the wildcard address. Port 0 picks an
/// ephemeral port.
pub fn bind_tcp(port: u16) -> Result<TcpListener, BindError> {
    bind_tcp_at(port).map_err(|e| BindError::Tcp(port, e))
}

fn bind_tcp_at(port: u16) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    // Restart must not fail on a lingering socket in teardown state.
    socket.set_reuse_address(true)?;
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;
    socket.set_nonblocking(true)?;
    Ok(socket.into())
}

/// Startup bind failures. Fatal: the caller reports and exits.
#[derive(Debug)]
pub enum BindError {
    Local(PathBuf, io::Error),
    Tcp(u16, io::Error),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Local(path, e) => {
                write!(f, "Failed to bind local socket '{}': {}", path.display(), e)
            }
            BindError::Tcp(port, e) => {
                write!(f, "Failed to bind TCP port {}: {}", port, e)
            }
        }
    }
}

impl std::error::Error for BindError {}
