//! Local address discovery

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Public address used only to pick the outbound interface; nothing is sent
const ROUTE_PROBE: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// This host's routable IPv4 address
///
/// Falls back to loopback when no route is available.
pub fn local_ipv4() -> Ipv4Addr {
    match probe_route() {
        Ok(ip) => ip,
        Err(e) => {
            log::warn!("Local address discovery failed ({}), using loopback", e);
            Ipv4Addr::LOCALHOST
        }
    }
}

fn probe_route() -> std::io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(ROUTE_PROBE)?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no IPv4 route (got {})", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ipv4_is_bindable() {
        let ip = local_ipv4();
        assert!(!ip.is_unspecified());
        assert!(UdpSocket::bind((ip, 0)).is_ok());
    }
}
