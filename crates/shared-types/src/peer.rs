//! # Peer Endpoint
//!
//! Identifies a network counterpart by host address and listening port.
//! Immutable value type; once received it is never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// A network peer: host address plus the port it listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerEndpoint {
    /// Host IP address.
    pub addr: IpAddr,
    /// The peer's listening port.
    pub listen_port: u16,
}

impl PeerEndpoint {
    /// Create an endpoint from an address and listening port.
    pub fn new(addr: IpAddr, listen_port: u16) -> Self {
        Self { addr, listen_port }
    }

    /// Loopback endpoint, mainly for tests and single-host setups.
    pub fn loopback(listen_port: u16) -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            listen_port,
        }
    }

    /// The socket address a connection to this peer would target.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.listen_port)
    }
}

impl From<SocketAddr> for PeerEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.listen_port)
    }
}
