//! Socket utilities for mDNS.
//!
//! This module provides [`MulticastSocket`], a builder for creating properly
//! configured UDP sockets for mDNS communication. The responder engine never
//! touches a socket itself; this is glue for embedders.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtc_mdns_responder::MulticastSocket;
//!
//! let std_socket = MulticastSocket::new().into_std()?;
//!
//! // For tokio:
//! let socket = tokio::net::UdpSocket::from_std(std_socket)?;
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

use crate::proto::{MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT};

/// A builder for multicast UDP sockets suitable for mDNS.
///
/// The resulting socket is:
///
/// - Bound to the mDNS port with `SO_REUSEADDR` enabled
/// - Configured with `SO_REUSEPORT` on supported platforms
/// - Set to non-blocking mode for async compatibility
/// - Joined to the mDNS multicast group of its address family
///   (224.0.0.251, or ff02::fb with [`ipv6`](MulticastSocket::ipv6))
#[derive(Debug, Clone)]
pub struct MulticastSocket {
    ipv6: bool,
    local_port: Option<u16>,
    interface_v4: Option<Ipv4Addr>,
    interface_v6: Option<u32>,
}

impl Default for MulticastSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl MulticastSocket {
    /// Creates a new builder for an IPv4 mDNS socket.
    pub fn new() -> Self {
        Self {
            ipv6: false,
            local_port: None,
            interface_v4: None,
            interface_v6: None,
        }
    }

    /// Builds an IPv6 socket joined to ff02::fb instead.
    pub fn ipv6(mut self) -> Self {
        self.ipv6 = true;
        self
    }

    /// Overrides the local port (default 5353).
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Sets a specific IPv4 network interface for the group join.
    ///
    /// If not set, the group is joined on all interfaces (`INADDR_ANY`).
    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface_v4 = Some(interface);
        self
    }

    /// Sets the IPv6 interface index for the group join.
    pub fn with_interface_index(mut self, index: u32) -> Self {
        self.interface_v6 = Some(index);
        self
    }

    /// Converts this builder into a configured `std::net::UdpSocket`.
    ///
    /// # Errors
    ///
    /// Returns an error if socket creation, binding, option setup or the
    /// multicast group join fails.
    pub fn into_std(self) -> io::Result<UdpSocket> {
        let domain = if self.ipv6 { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

        // Allow multiple mDNS stacks on the same machine
        socket.set_reuse_address(true)?;
        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        socket.set_reuse_port(true)?;

        socket.set_nonblocking(true)?;

        let port = self.local_port.unwrap_or(MDNS_PORT);
        if self.ipv6 {
            socket.set_only_v6(true)?;
            let local = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
            socket.bind(&local.into())?;
            socket.join_multicast_v6(&MDNS_MULTICAST_IPV6, self.interface_v6.unwrap_or(0))?;
        } else {
            let local_ip = if cfg!(target_os = "linux") {
                IpAddr::V4(MDNS_MULTICAST_IPV4)
            } else {
                // Binding the group address only works on Linux; elsewhere
                // bind the wildcard.
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            };
            socket.bind(&SocketAddr::new(local_ip, port).into())?;
            let iface = self.interface_v4.unwrap_or(Ipv4Addr::UNSPECIFIED);
            socket.join_multicast_v4(&MDNS_MULTICAST_IPV4, &iface)?;
        }

        Ok(socket.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multicast_constants() {
        assert_eq!(MDNS_MULTICAST_IPV4, Ipv4Addr::new(224, 0, 0, 251));
        assert_eq!(MDNS_MULTICAST_IPV6.to_string(), "ff02::fb");
        assert_eq!(MDNS_PORT, 5353);
    }

    #[test]
    fn test_multicast_socket_builder() {
        let builder = MulticastSocket::new().with_local_port(5353);
        assert!(!builder.ipv6);
        assert_eq!(builder.local_port, Some(5353));
        assert!(builder.interface_v4.is_none());
    }

    #[test]
    fn test_multicast_socket_with_interface() {
        let interface = Ipv4Addr::new(192, 168, 1, 100);
        let builder = MulticastSocket::new().with_interface(interface);
        assert_eq!(builder.interface_v4, Some(interface));
    }

    // Note: socket creation tests would require actual network access
    // and might conflict with other mDNS services, so we keep them minimal
}
