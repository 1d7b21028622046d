//! Single-peer session over a non-blocking UDP socket
//!
//! # Protocol
//!
//! ```text
//! A                         B
//! |--- $connect ----------->|   B adopts A as peer
//! |<-- $ok -----------------|
//! |--- $ping -------------->|
//! |<-- $ok -----------------|
//! |--- <application data> ->|
//! |--- $unconnect --------->|   B drops its peer
//! ```
//!
//! While a peer is set, datagrams from any other sender are discarded.
//! Without a peer, only `$connect` is accepted.
//!
//! [`UdpChannel::poll`] returns control tokens alongside application data;
//! use [`Token::parse`] to tell them apart.

use super::net::local_ipv4;
use super::token::Token;
use crate::error::{Error, Result};
use std::fmt;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

/// Default UDP port on both ends of a session
pub const DEFAULT_PORT: u16 = 5005;

/// Largest datagram the protocol carries
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Send timeout used for protocol replies and teardown
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause between failed send attempts
const SEND_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Pause between empty reads while waiting for a token
const WAIT_POLL_INTERVAL: Duration = Duration::from_micros(200);

/// Outcome of a single read attempt
enum Received {
    /// Nothing buffered, or the read failed
    Empty,
    /// A datagram arrived but was not accepted from its sender
    Discarded,
    /// Accepted payload (control token or application data)
    Payload(Vec<u8>),
}

/// A UDP endpoint with at most one connected peer
pub struct UdpChannel {
    socket: UdpSocket,
    local_addr: SocketAddr,
    peer: Option<SocketAddr>,
    buffer: [u8; MAX_DATAGRAM_SIZE],
}

impl UdpChannel {
    /// Bind `port` on the discovered local IPv4 address
    pub fn new(port: u16) -> Result<Self> {
        Self::bind(SocketAddr::new(IpAddr::V4(local_ipv4()), port))
    }

    /// Bind an explicit local address
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let bind_err = |source| Error::Bind { addr, source };

        let socket = UdpSocket::bind(addr).map_err(bind_err)?;
        socket.set_nonblocking(true).map_err(bind_err)?;
        let local_addr = socket.local_addr().map_err(bind_err)?;

        log::info!("UDP channel bound to {}", local_addr);

        Ok(UdpChannel {
            socket,
            local_addr,
            peer: None,
            buffer: [0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current peer, if any
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Whether a peer is set
    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    /// Non-blocking read of one datagram
    ///
    /// Applies the session state machine (peer adoption, ping replies,
    /// remote teardown) before returning the payload. Returns `None` when
    /// nothing is buffered or the datagram was not accepted.
    pub fn poll(&mut self) -> Option<Vec<u8>> {
        match self.receive() {
            Received::Payload(data) => Some(data),
            Received::Empty | Received::Discarded => None,
        }
    }

    fn receive(&mut self) -> Received {
        let (len, sender) = match self.socket.recv_from(&mut self.buffer) {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Received::Empty,
            Err(e) => {
                log::debug!("UDP recv error: {}", e);
                return Received::Empty;
            }
        };
        let data = self.buffer[..len].to_vec();
        let token = Token::parse(&data);
        let current = self.peer;

        match current {
            None if token == Some(Token::Connect) => self.accept_peer(sender),
            None => {
                log::debug!("Ignoring {} bytes from {} (no peer)", len, sender);
                return Received::Discarded;
            }
            Some(peer) if peer != sender => {
                log::debug!("Ignoring {} bytes from non-peer {}", len, sender);
                return Received::Discarded;
            }
            Some(_) => match token {
                Some(Token::Connect) => self.accept_peer(sender),
                Some(Token::Ping) => {
                    if !self.send_token(Token::Ack) {
                        log::warn!("Failed to answer ping from {}", sender);
                    }
                }
                Some(Token::Disconnect) => {
                    log::info!("Peer {} disconnected", sender);
                    self.peer = None;
                }
                Some(Token::Ack) | None => {}
            },
        }

        Received::Payload(data)
    }

    fn accept_peer(&mut self, sender: SocketAddr) {
        self.peer = Some(sender);
        if self.send_token(Token::Ack) {
            log::info!("Accepted connection from {}", sender);
        } else {
            log::warn!("Failed to acknowledge connection from {}", sender);
            self.peer = None;
        }
    }

    /// Send `data` to the peer, retrying until it goes out or `timeout` passes
    ///
    /// At least one attempt is made. Returns `false` when not connected,
    /// when `data` exceeds [`MAX_DATAGRAM_SIZE`], or on timeout.
    pub fn send(&self, data: &[u8], timeout: Duration) -> bool {
        let Some(peer) = self.peer else {
            return false;
        };
        if data.len() > MAX_DATAGRAM_SIZE {
            log::warn!(
                "Refusing to send {} bytes (max {})",
                data.len(),
                MAX_DATAGRAM_SIZE
            );
            return false;
        }

        let deadline = Instant::now() + timeout;
        loop {
            match self.socket.send_to(data, peer) {
                Ok(_) => return true,
                Err(e) => {
                    log::trace!("UDP send to {} failed: {}", peer, e);
                    if Instant::now() >= deadline {
                        return false;
                    }
                    thread::sleep(SEND_RETRY_INTERVAL);
                }
            }
        }
    }

    fn send_token(&self, token: Token) -> bool {
        self.send(token.as_bytes(), DEFAULT_SEND_TIMEOUT)
    }

    /// Handshake with `peer`
    ///
    /// Any existing session is torn down first. On failure the channel is
    /// left unconnected.
    pub fn connect(&mut self, peer: SocketAddr, timeout: Duration) -> bool {
        self.disconnect();
        self.peer = Some(peer);

        if self.send(Token::Connect.as_bytes(), timeout) && self.wait_for(Token::Ack, timeout) {
            log::info!("Connected to {}", peer);
            return true;
        }

        log::info!("Connection to {} failed", peer);
        self.peer = None;
        false
    }

    /// Handshake with `ip` on this channel's own port
    pub fn connect_ip(&mut self, ip: IpAddr, timeout: Duration) -> bool {
        let port = self.local_addr.port();
        self.connect(SocketAddr::new(ip, port), timeout)
    }

    /// Best-effort teardown; always leaves the channel unconnected
    pub fn disconnect(&mut self) {
        if let Some(peer) = self.peer {
            if !self.send_token(Token::Disconnect) {
                log::warn!("Failed to notify {} of disconnect", peer);
            }
            log::info!("Disconnected from {}", peer);
        }
        self.peer = None;
    }

    /// Poll until `token` arrives or `duration` passes
    pub fn wait_for(&mut self, token: Token, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            match self.receive() {
                Received::Payload(data) if Token::parse(&data) == Some(token) => return true,
                Received::Payload(_) | Received::Discarded => {}
                Received::Empty => thread::sleep(WAIT_POLL_INTERVAL),
            }
        }
        false
    }

    /// Round-trip time to the peer, or `None` if unconnected or unanswered
    pub fn ping(&mut self, timeout: Duration) -> Option<Duration> {
        if self.peer.is_none() {
            return None;
        }
        let start = Instant::now();
        if self.send(Token::Ping.as_bytes(), timeout) && self.wait_for(Token::Ack, timeout) {
            return Some(start.elapsed());
        }
        None
    }

    /// Read everything buffered, skipping non-peer datagrams
    ///
    /// Returns accepted payloads in arrival order.
    pub(crate) fn drain_payloads(&mut self) -> Vec<Vec<u8>> {
        let mut payloads = Vec::new();
        loop {
            match self.receive() {
                Received::Empty => return payloads,
                Received::Payload(data) => payloads.push(data),
                Received::Discarded => {}
            }
        }
    }

    /// Read and discard everything buffered; returns the number of payloads dropped
    pub fn drain_all(&mut self) -> usize {
        self.drain_payloads().len()
    }

    /// Read everything buffered and keep only the last accepted payload
    pub fn latest_only(&mut self) -> Option<Vec<u8>> {
        self.drain_payloads().pop()
    }
}

impl fmt::Display for UdpChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip: {} (port: {}); peer: ",
            self.local_addr.ip(),
            self.local_addr.port()
        )?;
        match self.peer {
            Some(peer) => write!(f, "{}", peer),
            None => write!(f, "None"),
        }
    }
}

impl fmt::Debug for UdpChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpChannel")
            .field("local_addr", &self.local_addr)
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> UdpChannel {
        UdpChannel::bind("127.0.0.1:0".parse().unwrap()).unwrap()
    }

    #[test]
    fn test_bind_conflict_is_bind_error() {
        let first = loopback();
        let err = UdpChannel::bind(first.local_addr()).unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));
    }

    #[test]
    fn test_unconnected_defaults() {
        let mut channel = loopback();
        assert!(!channel.is_connected());
        assert_eq!(channel.peer(), None);
        assert_eq!(channel.poll(), None);
        assert!(!channel.send(b"data", Duration::from_millis(10)));
        assert_eq!(channel.ping(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_display() {
        let channel = loopback();
        let port = channel.local_addr().port();
        assert_eq!(
            channel.to_string(),
            format!("ip: 127.0.0.1 (port: {}); peer: None", port)
        );
    }

    #[test]
    fn test_disconnect_when_unconnected_is_noop() {
        let mut channel = loopback();
        channel.disconnect();
        assert!(!channel.is_connected());
    }
}
