//! Point-to-point session protocol over UDP
pub mod channel;
pub mod net;
pub mod token;

pub use self::channel::{UdpChannel, DEFAULT_PORT, DEFAULT_SEND_TIMEOUT, MAX_DATAGRAM_SIZE};
pub use self::net::local_ipv4;
pub use self::token::Token;
