//! Sans-I/O mDNS responder engine.
//!
//! This module provides [`Responder`], a sans-I/O mDNS advertiser and
//! responder that implements the [`sansio::Protocol`] trait for integration
//! with any I/O framework.
//!
//! # Overview
//!
//! The [`Responder`] struct owns the authoritative record set for the
//! services registered on this device and handles the mDNS protocol logic
//! without performing any I/O. The caller is responsible for:
//!
//! 1. **Network I/O**: Reading/writing UDP packets to/from 224.0.0.251:5353
//!    (and `[ff02::fb]:5353` for IPv6)
//! 2. **Timing**: Calling `handle_timeout()` when `poll_timeout()` expires;
//!    this drives the probe and announcement schedules
//! 3. **Event Processing**: Handling events from `poll_event()`
//!
//! # Registration Lifecycle
//!
//! A registration starts in `Probing`: three ANY queries claiming its names
//! go out 250 ms apart. When no conflicting answer arrives the name is won
//! ([`ResponderEvent::ProbingSucceeded`]) and the responder switches to
//! `Announcing`, multicasting unsolicited responses with doubling intervals.
//! After the second announcement the registration is `Active`
//! ([`ResponderEvent::ServiceRegistered`]) and stays advertised until
//! [`Responder::exit_service`] multicasts its goodbye (TTL-zero pointers)
//! and [`Responder::remove_service`] drops it.
//!
//! # Example
//!
//! ```rust
//! use rtc_mdns_responder::{Responder, ResponderConfig, ServiceInfo};
//! use sansio::Protocol;
//!
//! let config = ResponderConfig::default()
//!     .with_addresses(vec!["192.0.2.1".parse().unwrap()]);
//! let mut responder = Responder::new(config).unwrap();
//!
//! // Register a service; -1 means the name was free.
//! let ret = responder
//!     .add_service(1, ServiceInfo::new("My Web Server", "_http._tcp", 8080))
//!     .unwrap();
//! assert_eq!(ret, -1);
//!
//! // The first probe is queued immediately.
//! let probe = responder.poll_write().expect("probe packet should be queued");
//! assert_eq!(probe.transport.peer_addr.to_string(), "224.0.0.251:5353");
//!
//! // Drive the schedule until the next deadline, send what it produces.
//! if let Some(deadline) = responder.poll_timeout() {
//!     responder.handle_timeout(deadline).unwrap();
//! }
//! while let Some(packet) = responder.poll_write() {
//!     // socket.send_to(&packet.message, packet.transport.peer_addr)
//! }
//! ```

pub(crate) mod limits;
pub(crate) mod names;
pub(crate) mod registration;
pub(crate) mod repository;

#[cfg(test)]
mod repository_test;

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Instant;

use bytes::BytesMut;
use shared::{TaggedBytesMut, TransportContext, TransportMessage, TransportProtocol};

use crate::message::{Message, header::Header};
use registration::{ServiceInfo, ServiceState};
use repository::{ConflictKind, RecordRepository};
use shared::error::{Error, Result};

/// The IPv4 mDNS multicast group (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The IPv6 link-local mDNS multicast group (ff02::fb).
pub const MDNS_MULTICAST_IPV6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// IPv4 mDNS multicast destination address (224.0.0.251:5353).
pub const MDNS_DEST_ADDR_IPV4: SocketAddr =
    SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// IPv6 mDNS multicast destination address ([ff02::fb]:5353).
pub const MDNS_DEST_ADDR_IPV6: SocketAddr =
    SocketAddr::new(IpAddr::V6(MDNS_MULTICAST_IPV6), MDNS_PORT);

// The mDNS group of the same address family as src.
pub(crate) fn multicast_destination(src: &SocketAddr) -> SocketAddr {
    if src.is_ipv4() {
        MDNS_DEST_ADDR_IPV4
    } else {
        MDNS_DEST_ADDR_IPV6
    }
}

/// Events emitted by the responder.
///
/// Poll for events using [`poll_event()`](sansio::Protocol::poll_event)
/// after calling `handle_read()` or `handle_timeout()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderEvent {
    /// All probes for a registration went unanswered; announcing started.
    ProbingSucceeded(i32),

    /// A registration reached `Active` (at least two announcements out).
    ServiceRegistered(i32),

    /// An incoming record collides with a registration. Tie-breaking and
    /// renaming (RFC 6762 8.2) are the caller's decision; a probing
    /// registration has its probe schedule restarted in the meantime.
    NameConflict { id: i32, kind: ConflictKind },

    /// No registrations remain; the responder can be shut down.
    Inactive,
}

/// Sans-I/O mDNS responder.
///
/// Owns the record repository for the registered services and answers
/// incoming queries per RFC 6762 6, including known-answer suppression,
/// unicast reply selection and NSEC negative proofs. Probing and
/// announcement retransmissions are driven entirely through
/// `poll_timeout()`/`handle_timeout()`; the engine holds no clock of its
/// own.
pub struct Responder {
    repository: RecordRepository,

    /// Outgoing packet queue
    write_outs: VecDeque<TaggedBytesMut>,

    /// Event queue
    event_outs: VecDeque<ResponderEvent>,

    /// Next probe or announcement due across all registrations
    next_timeout: Option<Instant>,

    /// Whether the responder is closed
    closed: bool,
}

impl Responder {
    /// Create a new responder with the given configuration.
    ///
    /// Fails when the configured host label does not form a valid DNS name.
    pub fn new(config: crate::config::ResponderConfig) -> Result<Self> {
        Ok(Self {
            repository: RecordRepository::new(config)?,
            write_outs: VecDeque::new(),
            event_outs: VecDeque::new(),
            next_timeout: None,
            closed: false,
        })
    }

    /// The host name default-host registrations point at,
    /// `<host label>.local`.
    pub fn host_name(&self) -> &crate::message::name::Name {
        self.repository.host_name()
    }

    /// Registers a service and immediately queues its first probe.
    ///
    /// Returns `-1` for a new registration, or the id of an existing
    /// registration whose instance name collides with this one (DNS
    /// case-insensitively). Re-adding a name that is still exiting is how
    /// callers detect that situation, so it is not an error.
    ///
    /// # Errors
    ///
    /// * [`Error::ErrAlreadyActive`]: the id is still mapped
    /// * [`Error::ErrBadParameters`]: malformed service type or subtype,
    ///   TTL override out of range, reused retired id, or a custom host
    ///   registered twice with different addresses
    pub fn add_service(&mut self, id: i32, info: ServiceInfo) -> Result<i32> {
        let ret = self.repository.add_service(id, &info)?;
        if ret != -1 {
            log::debug!(
                "service {id} collides with registration {ret} for {}",
                info.instance_name
            );
            return Ok(ret);
        }
        let now = Instant::now();
        let probe_interval = self.repository.config.probe_interval;
        match self.repository.probing_packet(id) {
            Ok(packet) => self.queue_multicast(packet, id, now),
            Err(err) => log::error!("failed to build probe for service {id}: {err}"),
        }
        if let Some(reg) = self.repository.get_mut(id) {
            reg.probes_sent = 1;
            reg.next_send = Some(now + probe_interval);
        }
        self.update_next_timeout();
        Ok(ret)
    }

    /// Replaces the subtype set of a registration.
    pub fn update_service(&mut self, id: i32, subtypes: Vec<String>) -> Result<()> {
        self.repository.update_service(id, subtypes)
    }

    /// Schedules the goodbye for a registration and marks it `Exiting`.
    ///
    /// The goodbye (every advertised PTR with TTL zero) is queued only when
    /// at least one announcement went out; repeated calls are no-ops.
    /// [`remove_service`](Self::remove_service) is expected to follow.
    pub fn exit_service(&mut self, id: i32) -> Result<()> {
        let reg = self.repository.get(id).ok_or(Error::ErrNoTransaction(id))?;
        if reg.state == ServiceState::Exiting {
            return Ok(());
        }
        let advertised = reg.advertised;
        if advertised {
            match self.repository.exit_packet(id) {
                Ok(packet) => self.queue_multicast(packet, id, Instant::now()),
                Err(err) => log::error!("failed to build goodbye for service {id}: {err}"),
            }
        }
        if let Some(reg) = self.repository.get_mut(id) {
            reg.state = ServiceState::Exiting;
            reg.exit_announced = advertised;
            reg.next_send = None;
        }
        self.update_next_timeout();
        Ok(())
    }

    /// Erases a registration. Its id is retired and cannot be reused.
    pub fn remove_service(&mut self, id: i32) -> Result<()> {
        self.repository.remove_service(id)?;
        if self.repository.services_count() == 0 && !self.repository.has_pending_exits() {
            self.event_outs.push_back(ResponderEvent::Inactive);
        }
        self.update_next_timeout();
        Ok(())
    }

    /// Removes every registration and returns the cleared ids.
    pub fn clear_services(&mut self) -> Vec<i32> {
        let ids = self.repository.clear_services();
        if !ids.is_empty() {
            self.event_outs.push_back(ResponderEvent::Inactive);
        }
        self.update_next_timeout();
        ids
    }

    /// Replaces the interface address snapshot. Default-host registrations
    /// that are already advertising re-announce with the new records.
    pub fn update_addresses(&mut self, addresses: &[IpAddr]) {
        self.repository.update_addresses(addresses);
        let interval = self.repository.config.announcement_interval;
        let now = Instant::now();
        for reg in self.repository.services_mut() {
            if reg.custom_host.is_none()
                && matches!(reg.state, ServiceState::Announcing | ServiceState::Active)
            {
                reg.announcements_sent = 0;
                reg.announce_interval = interval;
                reg.next_send = Some(now);
            }
        }
        self.update_next_timeout();
    }

    /// The canonical response packet for one registration, for hardware
    /// offload engines: type PTR, SRV, TXT and host addresses, flags 0x8400.
    pub fn offload_packet(&self, id: i32) -> Result<Message> {
        self.repository.offload_packet(id)
    }

    /// Number of registrations still mapped, exiting ones included.
    pub fn services_count(&self) -> usize {
        self.repository.services_count()
    }

    /// True while the registration is mapped and not exiting.
    pub fn has_active_service(&self, id: i32) -> bool {
        self.repository.has_active_service(id)
    }

    /// True while the registration is still probing for its name.
    pub fn is_probing(&self, id: i32) -> bool {
        self.repository.is_probing(id)
    }

    // Packs a message to the IPv4 mDNS group and charges it to a
    // registration's sent counter.
    fn queue_multicast(&mut self, mut packet: Message, id: i32, now: Instant) {
        let raw = match packet.pack() {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("failed to pack packet for service {id}: {err}");
                return;
            }
        };
        log::trace!("queuing {} bytes for service {id}", raw.len());
        self.write_outs.push_back(TransportMessage {
            now,
            transport: TransportContext {
                local_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
                peer_addr: MDNS_DEST_ADDR_IPV4,
                transport_protocol: TransportProtocol::UDP,
            },
            message: BytesMut::from(&raw[..]),
        });
        if let Some(reg) = self.repository.get_mut(id) {
            reg.sent_packets += 1;
        }
    }

    // One probe or announcement step for a due registration.
    fn step_service(&mut self, id: i32, now: Instant) {
        let Some(reg) = self.repository.get(id) else {
            return;
        };
        let probe_count = self.repository.config.probe_count;
        let probe_interval = self.repository.config.probe_interval;
        match reg.state {
            ServiceState::Probing => {
                if reg.probes_sent < probe_count {
                    match self.repository.probing_packet(id) {
                        Ok(packet) => self.queue_multicast(packet, id, now),
                        Err(err) => log::error!("failed to build probe for {id}: {err}"),
                    }
                    if let Some(reg) = self.repository.get_mut(id) {
                        reg.probes_sent += 1;
                        reg.next_send = Some(now + probe_interval);
                    }
                } else {
                    // The wait after the last probe elapsed with no
                    // conflicting answer: the name is won.
                    log::debug!("service {id} won its name, announcing");
                    if let Some(reg) = self.repository.get_mut(id) {
                        reg.state = ServiceState::Announcing;
                    }
                    self.event_outs.push_back(ResponderEvent::ProbingSucceeded(id));
                    self.announce_step(id, now);
                }
            }
            ServiceState::Announcing | ServiceState::Active => self.announce_step(id, now),
            ServiceState::Exiting => {}
        }
    }

    fn announce_step(&mut self, id: i32, now: Instant) {
        match self.repository.announcement_packet(id) {
            Ok(packet) => self.queue_multicast(packet, id, now),
            Err(err) => {
                log::error!("failed to build announcement for {id}: {err}");
                return;
            }
        }
        let announcement_count = self.repository.config.announcement_count;
        let mut became_active = false;
        if let Some(reg) = self.repository.get_mut(id) {
            reg.announcements_sent += 1;
            reg.advertised = true;
            if reg.state == ServiceState::Announcing
                && (reg.announcements_sent >= 2 || reg.announcements_sent >= announcement_count)
            {
                reg.state = ServiceState::Active;
                became_active = true;
            }
            if reg.announcements_sent < announcement_count {
                reg.next_send = Some(now + reg.announce_interval);
                reg.announce_interval *= 2;
            } else {
                reg.next_send = None;
            }
        }
        if became_active {
            log::debug!("service {id} is active");
            self.event_outs
                .push_back(ResponderEvent::ServiceRegistered(id));
        }
    }

    fn update_next_timeout(&mut self) {
        self.next_timeout = self.repository.services().filter_map(|reg| reg.next_send).min();
    }

    fn process_message(&mut self, msg: &TaggedBytesMut) {
        let parsed = match Message::unpack(&msg.message, Some(msg.now)) {
            Ok(parsed) => parsed,
            Err(err) => {
                // Malformed packets are dropped, never propagated.
                log::warn!("dropping malformed mDNS packet: {err}");
                return;
            }
        };

        let conflicts = self.repository.conflicting_services(&parsed);
        for (id, kind) in conflicts {
            log::debug!("conflict for service {id}: {kind:?}");
            self.event_outs
                .push_back(ResponderEvent::NameConflict { id, kind });
            if self.repository.is_probing(id)
                && let Some(reg) = self.repository.get_mut(id)
            {
                reg.probes_sent = 0;
                reg.next_send = Some(msg.now);
            }
        }

        if !parsed.header.response
            && let Some(reply) = self
                .repository
                .reply(&parsed, msg.transport.peer_addr, msg.now)
        {
            let mut out = Message {
                header: Header::response(),
                answers: reply.answers,
                additionals: reply.additional_answers,
                ..Default::default()
            };
            match out.pack() {
                Ok(raw) => {
                    log::trace!(
                        "queuing {} byte reply to {}",
                        raw.len(),
                        reply.destination
                    );
                    self.write_outs.push_back(TransportMessage {
                        now: msg.now,
                        transport: TransportContext {
                            local_addr: msg.transport.local_addr,
                            peer_addr: reply.destination,
                            transport_protocol: TransportProtocol::UDP,
                        },
                        message: BytesMut::from(&raw[..]),
                    });
                }
                Err(err) => log::error!("failed to pack reply: {err}"),
            }
        }
    }
}

impl sansio::Protocol<TaggedBytesMut, (), ()> for Responder {
    type Rout = ();
    type Wout = TaggedBytesMut;
    type Eout = ResponderEvent;
    type Error = Error;

    /// Process an incoming mDNS packet.
    ///
    /// Queries the responder can answer queue a reply packet (retrieve it
    /// with `poll_write()`); records colliding with a registration emit
    /// [`ResponderEvent::NameConflict`]. Malformed packets are logged and
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrConnectionClosed`] once the responder is closed.
    fn handle_read(&mut self, msg: TaggedBytesMut) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        self.process_message(&msg);
        self.update_next_timeout();
        Ok(())
    }

    /// mDNS produces no read outputs; replies are queued as writes.
    fn poll_read(&mut self) -> Option<Self::Rout> {
        None
    }

    /// Handle write requests (not used).
    ///
    /// Advertisements are initiated via [`Responder::add_service`] instead
    /// of through this interface.
    fn handle_write(&mut self, _msg: ()) -> Result<()> {
        Ok(())
    }

    /// Get the next packet to send.
    ///
    /// Call repeatedly until it returns `None`. Packets are queued by
    /// `add_service` (probes), `handle_timeout` (probe and announcement
    /// retransmissions), `handle_read` (replies) and `exit_service`
    /// (goodbyes).
    fn poll_write(&mut self) -> Option<Self::Wout> {
        self.write_outs.pop_front()
    }

    /// Handle external events (not used).
    fn handle_event(&mut self, _evt: ()) -> Result<()> {
        Ok(())
    }

    /// Get the next event.
    fn poll_event(&mut self) -> Option<Self::Eout> {
        self.event_outs.pop_front()
    }

    /// Advance the probe and announcement schedules to `now`.
    ///
    /// Call when the deadline from `poll_timeout()` is reached. Every
    /// registration whose next send is due gets its probe or announcement
    /// queued and its schedule advanced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrConnectionClosed`] once the responder is closed.
    fn handle_timeout(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        if let Some(next_timeout) = self.next_timeout.as_ref()
            && next_timeout <= &now
        {
            let due: Vec<i32> = self
                .repository
                .services()
                .filter(|reg| reg.next_send.is_some_and(|at| at <= now))
                .map(|reg| reg.id)
                .collect();
            for id in due {
                self.step_service(id, now);
            }
            self.update_next_timeout();
        }
        Ok(())
    }

    /// The next probe or announcement deadline, or `None` when every
    /// schedule is drained.
    fn poll_timeout(&mut self) -> Option<Instant> {
        self.next_timeout
    }

    /// Close the responder, clearing registrations, queued packets and
    /// events. Subsequent `handle_read`/`handle_timeout` calls fail with
    /// [`Error::ErrConnectionClosed`].
    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.repository.clear_services();
        self.write_outs.clear();
        self.event_outs.clear();
        self.next_timeout = None;
        Ok(())
    }
}
