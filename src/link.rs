//! TCP command link to the Asycube.
//!
//! The device listens on a plain TCP socket (factory default
//! `192.168.127.254:4001`) and takes one command at a time, each framed as
//! `{body}\r\n`. Replies are raw text with no documented terminator, so
//! the link reads until the device goes quiet instead of scanning for an
//! end-of-line.
//!
//! The link is an explicit state machine: construct with
//! [`CommandLink::new`], dial with [`connect`](CommandLink::connect), run
//! [`exchange`](CommandLink::exchange)s, then
//! [`disconnect`](CommandLink::disconnect). Exchanging while disconnected
//! is a [`CubeError::NotConnected`] error, and connecting twice is
//! [`CubeError::AlreadyConnected`] rather than a leaked socket.
//!
//! # Example
//!
//! ```no_run
//! use asycube::CommandLink;
//!
//! let mut link = CommandLink::new("192.168.127.254", 4001);
//! link.connect()?;
//!
//! // Ask for the status of vibration set 1.
//! let reply = link.exchange("C1")?;
//! println!("device said: {}", reply.trim());
//!
//! link.disconnect();
//! # Ok::<(), asycube::CubeError>(())
//! ```

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::command;

/// Factory-default Asycube IP address.
pub const DEFAULT_HOST: &str = "192.168.127.254";

/// Factory-default TCP command port.
pub const DEFAULT_PORT: u16 = 4001;

/// Maximum response bytes retained from a single exchange.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_DRAIN_WINDOW: Duration = Duration::from_millis(50);

/// Errors from the Asycube driver.
#[derive(Error, Debug)]
pub enum CubeError {
    /// TCP connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// `connect` was called while a connection is already live.
    #[error("Already connected")]
    AlreadyConnected,

    /// A command was attempted without a live connection.
    #[error("Not connected")]
    NotConnected,

    /// No response bytes arrived within the response timeout.
    #[error("Timeout waiting for device response")]
    Timeout,

    /// The device closed the connection before answering.
    #[error("Connection closed by device")]
    ConnectionClosed,

    /// Low-level socket failure during send or receive.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for driver operations.
pub type CubeResult<T> = Result<T, CubeError>;

enum LinkState {
    Disconnected,
    Connected(TcpStream),
}

/// Synchronous command/response link over a single TCP socket.
///
/// Handles framing, the send/receive exchange, and the connection
/// lifecycle. For typed profile and parameter operations, use
/// [`Asycube`](crate::Asycube) instead.
pub struct CommandLink {
    host: String,
    port: u16,
    state: LinkState,
    response_timeout: Duration,
    drain_window: Duration,
}

impl CommandLink {
    /// Link to a device at `host:port`, not yet connected.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            state: LinkState::Disconnected,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            drain_window: DEFAULT_DRAIN_WINDOW,
        }
    }

    /// Peer hostname or IP address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Peer TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// True while a connection is live.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected(_))
    }

    /// How long [`exchange`](Self::exchange) waits for the first response
    /// bytes before reporting [`CubeError::Timeout`]. Defaults to 1 s.
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = timeout;
    }

    /// Idle gap after which a response is considered complete. Defaults to
    /// 50 ms.
    pub fn set_drain_window(&mut self, window: Duration) {
        self.drain_window = window;
    }

    /// Open the TCP connection.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::ConnectionFailed`] if the peer is unreachable
    /// or refuses, and [`CubeError::AlreadyConnected`] if a connection is
    /// already live (call [`disconnect`](Self::disconnect) first to
    /// reconnect).
    pub fn connect(&mut self) -> CubeResult<()> {
        if self.is_connected() {
            return Err(CubeError::AlreadyConnected);
        }

        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .map_err(|e| CubeError::ConnectionFailed(format!("{}:{}: {e}", self.host, self.port)))?;
        stream.set_write_timeout(Some(self.response_timeout))?;

        info!("Connected to Asycube at {}:{}", self.host, self.port);
        self.state = LinkState::Connected(stream);
        Ok(())
    }

    /// Close the connection. A no-op when not connected.
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            self.state = LinkState::Disconnected;
            info!("Disconnected from Asycube at {}:{}", self.host, self.port);
        }
    }

    /// Send one command body, framed, and collect the device's reply.
    ///
    /// The reply has no documented framing: the link waits up to the
    /// response timeout for the first bytes, then keeps reading until the
    /// device stays quiet for the drain window, the buffer fills, or the
    /// device closes. Whatever arrived is decoded as text (lossy UTF-8;
    /// the device speaks ASCII); a short reply is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::NotConnected`] without a live connection,
    /// [`CubeError::Timeout`] if no bytes arrive in time,
    /// [`CubeError::ConnectionClosed`] on peer EOF before any reply, and
    /// [`CubeError::Io`] for other socket failures.
    pub fn exchange(&mut self, body: &str) -> CubeResult<String> {
        let LinkState::Connected(stream) = &mut self.state else {
            return Err(CubeError::NotConnected);
        };

        let packet = command::frame(body);
        debug!("send: {body:?}");
        stream.write_all(packet.as_bytes())?;
        stream.flush()?;

        let mut buf = [0u8; RESPONSE_BUFFER_SIZE];
        let mut filled = 0;

        // First read blocks until the device answers or the timeout lapses.
        stream.set_read_timeout(Some(self.response_timeout))?;
        loop {
            match stream.read(&mut buf) {
                Ok(0) => return Err(CubeError::ConnectionClosed),
                Ok(n) => {
                    filled = n;
                    break;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Err(CubeError::Timeout),
                Err(e) => return Err(e.into()),
            }
        }

        // Drain whatever else is in flight until the line goes quiet.
        stream.set_read_timeout(Some(self.drain_window))?;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                // Device replied and then closed; keep what we have.
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(e.into()),
            }
        }

        let response = String::from_utf8_lossy(&buf[..filled]).into_owned();
        trace!("recv: {response:?}");
        Ok(response)
    }
}

/// Read timeouts surface as `WouldBlock` on unix and `TimedOut` on
/// windows.
fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl Default for CommandLink {
    /// Link to the factory-default peer, [`DEFAULT_HOST`]:[`DEFAULT_PORT`].
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_peer() {
        let link = CommandLink::default();
        assert_eq!(link.host(), "192.168.127.254");
        assert_eq!(link.port(), 4001);
        assert!(!link.is_connected());
    }

    #[test]
    fn test_exchange_requires_connection() {
        let mut link = CommandLink::default();
        assert!(matches!(link.exchange("C1"), Err(CubeError::NotConnected)));
    }

    #[test]
    fn test_disconnect_without_connect_is_noop() {
        let mut link = CommandLink::default();
        link.disconnect();
        link.disconnect();
        assert!(!link.is_connected());
    }
}
