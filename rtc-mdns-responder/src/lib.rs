//! # rtc-mdns-responder
//!
//! A sans-I/O mDNS (Multicast DNS) record repository and responder for Rust,
//! per RFC 6762 and RFC 6763.
//!
//! Given the services registered on this device (instance name, type, port,
//! TXT attributes, optional subtypes, optional custom host) and the local
//! link addresses, the [`Responder`]:
//!
//! - maintains the authoritative record set (PTR/SRV/TXT/A/AAAA/NSEC),
//! - drives probing and announcing for each registration,
//! - answers incoming queries per RFC 6762 6, with known-answer
//!   suppression, unicast reply selection and NSEC negative proofs,
//! - detects name conflicts against incoming records,
//! - produces offload packet snapshots for hardware advertisement engines.
//!
//! ## Sans-I/O Design
//!
//! This crate follows the [sans-I/O](https://sans-io.readthedocs.io/)
//! pattern:
//!
//! - **No runtime dependency**: Works with tokio, async-std, smol, or
//!   blocking I/O
//! - **Testable**: Protocol logic runs without network I/O
//! - **Predictable**: No hidden threads, timers, or background tasks
//!
//! The caller is responsible for:
//! 1. Reading packets from the network and calling `handle_read()`
//! 2. Sending packets returned by `poll_write()`
//! 3. Calling `handle_timeout()` when `poll_timeout()` expires
//! 4. Processing events from `poll_event()`
//!
//! ## Quick Start
//!
//! ```rust
//! use rtc_mdns_responder::{Responder, ResponderConfig, ServiceInfo, TxtEntry};
//! use sansio::Protocol;
//!
//! let config = ResponderConfig::default()
//!     .with_addresses(vec!["192.0.2.1".parse().unwrap()]);
//! let mut responder = Responder::new(config).unwrap();
//!
//! responder
//!     .add_service(
//!         1,
//!         ServiceInfo::new("Living Room Printer", "_ipp._tcp", 631)
//!             .with_txt(vec![TxtEntry::new("rp", "ipp/print")]),
//!     )
//!     .unwrap();
//!
//! // Probing starts immediately; drive it through the event loop:
//! while let Some(packet) = responder.poll_write() {
//!     // socket.send_to(&packet.message, packet.transport.peer_addr)
//! }
//! ```
//!
//! ## Event Loop Pattern
//!
//! ```text
//! loop {
//!     // 1. Send any queued packets
//!     while let Some(packet) = responder.poll_write() {
//!         socket.send_to(&packet.message, packet.transport.peer_addr);
//!     }
//!
//!     // 2. Wait for network activity or the next schedule deadline
//!     select! {
//!         packet = socket.recv_from() => {
//!             responder.handle_read(packet);
//!         }
//!         _ = sleep_until(responder.poll_timeout()) => {
//!             responder.handle_timeout(Instant::now());
//!         }
//!     }
//!
//!     // 3. Process events
//!     while let Some(event) = responder.poll_event() {
//!         match event {
//!             ResponderEvent::ServiceRegistered(id) => { /* advertised */ }
//!             ResponderEvent::NameConflict { id, kind } => { /* rename */ }
//!             _ => {}
//!         }
//!     }
//! }
//! ```
//!
//! ## Protocol Details
//!
//! - **Multicast groups**: 224.0.0.251:5353 and [ff02::fb]:5353
//! - **Record TTLs**: 120 seconds for SRV/address/NSEC records, 4500
//!   seconds for PTR/TXT (RFC 6762 10)
//! - **Compression**: DNS name compression on write; pointer loops are
//!   rejected on read

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub(crate) mod config;
pub mod message;
pub(crate) mod proto;
pub(crate) mod socket;

pub use config::ResponderConfig;
pub use message::resource::txt::TxtEntry;
pub use proto::limits::ClientLimits;
pub use proto::names::reverse_dns_address;
pub use proto::registration::{ServiceInfo, ServiceState};
pub use proto::repository::{ConflictKind, Reply};
pub use proto::{
    MDNS_DEST_ADDR_IPV4, MDNS_DEST_ADDR_IPV6, MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT,
    Responder, ResponderEvent,
};

// Re-export socket utilities for convenience
pub use socket::MulticastSocket;
