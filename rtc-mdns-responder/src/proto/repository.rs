use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use crate::config::ResponderConfig;
use crate::message::name::Name;
use crate::message::question::Question;
use crate::message::resource::a::AResource;
use crate::message::resource::aaaa::AaaaResource;
use crate::message::resource::nsec::NsecResource;
use crate::message::resource::ptr::PtrResource;
use crate::message::resource::{RData, Resource};
use crate::message::{DnsType, Message, header::Header};
use crate::proto::names;
use crate::proto::registration::{ServiceInfo, ServiceRegistration, ServiceState};
use shared::error::*;

/// What an incoming record collides with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Another responder claims one of our instance names with different
    /// SRV or TXT data.
    Service,
    /// Another responder claims one of our custom host names with addresses
    /// we do not own.
    Host,
}

/// A synthesized reply to an incoming query.
#[derive(Debug)]
pub struct Reply {
    /// Where to send the reply: the querier's source address when every
    /// matched question requested a unicast response, the mDNS group of the
    /// source's address family otherwise.
    pub destination: SocketAddr,
    pub answers: Vec<Resource>,
    pub additional_answers: Vec<Resource>,
    /// Answers the querier already held with less than half their TTL left;
    /// they stay in `answers` and are echoed here for the caller's
    /// bookkeeping.
    pub known_answers: Vec<Resource>,
}

// The authoritative record set: every registration, the interface address
// snapshot, and the synthesis logic for probes, announcements, replies and
// conflicts. Purely in-memory; the caller supplies packet receipt times.
pub(crate) struct RecordRepository {
    pub(crate) config: ResponderConfig,
    host_name: Name,
    services: HashMap<i32, ServiceRegistration>,
    retired: HashSet<i32>,
    addresses: Vec<IpAddr>,
}

impl RecordRepository {
    pub(crate) fn new(config: ResponderConfig) -> Result<Self> {
        let host_name = Name::new(vec![
            config.host_label.clone(),
            names::LOCAL_LABEL.to_owned(),
        ])?;
        let addresses = config.addresses.clone();
        Ok(Self {
            config,
            host_name,
            services: HashMap::new(),
            retired: HashSet::new(),
            addresses,
        })
    }

    pub(crate) fn host_name(&self) -> &Name {
        &self.host_name
    }

    pub(crate) fn get(&self, id: i32) -> Option<&ServiceRegistration> {
        self.services.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: i32) -> Option<&mut ServiceRegistration> {
        self.services.get_mut(&id)
    }

    pub(crate) fn services(&self) -> impl Iterator<Item = &ServiceRegistration> {
        self.services.values()
    }

    pub(crate) fn services_mut(&mut self) -> impl Iterator<Item = &mut ServiceRegistration> {
        self.services.values_mut()
    }

    fn addresses_for<'a>(&'a self, reg: &'a ServiceRegistration) -> &'a [IpAddr] {
        if reg.custom_host.is_some() {
            &reg.addresses
        } else {
            &self.addresses
        }
    }

    /// Registers a service in `Probing` state.
    ///
    /// Returns `-1` for a new registration. When the instance name collides
    /// with an existing registration (DNS case-insensitively) the existing
    /// id is returned instead, so callers can tell a re-add during exit from
    /// a new name.
    pub(crate) fn add_service(&mut self, id: i32, info: &ServiceInfo) -> Result<i32> {
        let reg = ServiceRegistration::new(id, info, self.config.announcement_interval)?;
        // An instance-name collision wins over every id check: the existing
        // id comes back so callers can detect a re-add during exit.
        let name = reg.service_name();
        for other in self.services.values() {
            if other.service_name() == name {
                return Ok(other.id);
            }
        }
        if self.services.contains_key(&id) {
            return Err(Error::ErrAlreadyActive(id));
        }
        if self.retired.contains(&id) {
            return Err(Error::ErrBadParameters(format!(
                "id {id} was removed and cannot be reused"
            )));
        }
        if let Some(host) = &reg.custom_host {
            // Registrations naming the same custom host must agree on its
            // address set.
            let ours: HashSet<IpAddr> = reg.addresses.iter().copied().collect();
            for other in self.services.values() {
                if other.custom_host.as_ref() == Some(host)
                    && other.addresses.iter().copied().collect::<HashSet<_>>() != ours
                {
                    return Err(Error::ErrBadParameters(format!(
                        "host {host} is already registered with different addresses"
                    )));
                }
            }
        }
        self.services.insert(id, reg);
        Ok(-1)
    }

    pub(crate) fn update_service(&mut self, id: i32, subtypes: Vec<String>) -> Result<()> {
        for subtype in &subtypes {
            names::validate_subtype(subtype)?;
        }
        let reg = self.services.get_mut(&id).ok_or(Error::ErrNoTransaction(id))?;
        reg.subtypes = subtypes;
        Ok(())
    }

    pub(crate) fn remove_service(&mut self, id: i32) -> Result<()> {
        self.services.remove(&id).ok_or(Error::ErrNoTransaction(id))?;
        self.retired.insert(id);
        Ok(())
    }

    pub(crate) fn clear_services(&mut self) -> Vec<i32> {
        let ids: Vec<i32> = self.services.keys().copied().collect();
        for &id in &ids {
            self.retired.insert(id);
        }
        self.services.clear();
        ids
    }

    pub(crate) fn services_count(&self) -> usize {
        self.services.len()
    }

    pub(crate) fn has_active_service(&self, id: i32) -> bool {
        self.services
            .get(&id)
            .is_some_and(|reg| reg.state != ServiceState::Exiting)
    }

    pub(crate) fn is_probing(&self, id: i32) -> bool {
        self.services
            .get(&id)
            .is_some_and(|reg| reg.state == ServiceState::Probing)
    }

    pub(crate) fn has_pending_exits(&self) -> bool {
        self.services
            .values()
            .any(|reg| reg.state == ServiceState::Exiting)
    }

    /// The probe packet claiming a registration's unique names (RFC 6762
    /// 8.1): an ANY question per tentative name and the proposed records in
    /// the authority section.
    pub(crate) fn probing_packet(&self, id: i32) -> Result<Message> {
        let reg = self.services.get(&id).ok_or(Error::ErrNoTransaction(id))?;
        let mut questions = vec![Question::new(reg.service_name(), DnsType::Any)];
        let mut authorities = vec![reg.srv_record(&self.host_name)];
        if self.config.include_host_records_in_probing {
            let host = reg.host_name(&self.host_name);
            questions.push(Question::new(host.clone(), DnsType::Any));
            authorities.extend(address_records(
                &host,
                self.addresses_for(reg),
                reg.short_ttl(),
            ));
        }
        Ok(Message {
            header: Header::default(),
            questions,
            authorities,
            ..Default::default()
        })
    }

    /// The unsolicited announcement for a registration (RFC 6762 8.3):
    /// address and reverse-address records for its host, the RFC 6763
    /// service records, the service-type enumeration pointer, and NSEC
    /// negative proofs as additionals.
    pub(crate) fn announcement_packet(&self, id: i32) -> Result<Message> {
        let reg = self.services.get(&id).ok_or(Error::ErrNoTransaction(id))?;
        let host = reg.host_name(&self.host_name);
        let addrs = self.addresses_for(reg);

        let mut answers = Vec::new();
        for addr in addrs {
            answers.push(Resource::new(
                names::reverse_dns_address(addr),
                true,
                reg.short_ttl(),
                RData::Ptr(PtrResource { ptr: host.clone() }),
            ));
        }
        answers.extend(address_records(&host, addrs, reg.short_ttl()));
        answers.push(reg.ptr_record());
        answers.extend(reg.subtype_ptr_records());
        answers.push(reg.srv_record(&self.host_name));
        answers.push(reg.txt_record());
        answers.push(reg.enumeration_ptr_record());

        let mut additionals = Vec::new();
        for addr in addrs {
            let reverse = names::reverse_dns_address(addr);
            additionals.push(Resource::new(
                reverse.clone(),
                true,
                reg.short_ttl(),
                RData::Nsec(NsecResource::new(reverse, &[DnsType::Ptr])),
            ));
        }
        if let Some(nsec) = host_nsec(&host, addrs, reg.short_ttl()) {
            additionals.push(nsec);
        }
        additionals.push(instance_nsec(reg));

        Ok(Message {
            header: Header::response(),
            answers,
            additionals,
            ..Default::default()
        })
    }

    /// The goodbye packet for an exiting registration: every PTR it
    /// advertised, TTL zero, so peers drop their cache entries.
    pub(crate) fn exit_packet(&self, id: i32) -> Result<Message> {
        let reg = self.services.get(&id).ok_or(Error::ErrNoTransaction(id))?;
        let mut answers = vec![reg.ptr_record()];
        answers.extend(reg.subtype_ptr_records());
        for answer in &mut answers {
            answer.header.ttl = Duration::ZERO;
        }
        Ok(Message {
            header: Header::response(),
            answers,
            ..Default::default()
        })
    }

    /// The canonical single-registration response used by offload engines:
    /// type PTR, SRV, TXT and the host addresses, nothing else.
    pub(crate) fn offload_packet(&self, id: i32) -> Result<Message> {
        let reg = self.services.get(&id).ok_or(Error::ErrNoTransaction(id))?;
        let host = reg.host_name(&self.host_name);
        let mut answers = vec![
            reg.ptr_record(),
            reg.srv_record(&self.host_name),
            reg.txt_record(),
        ];
        answers.extend(address_records(&host, self.addresses_for(reg), reg.short_ttl()));
        Ok(Message {
            header: Header::response(),
            answers,
            ..Default::default()
        })
    }

    /// Replaces the interface address snapshot used for default-host
    /// records.
    pub(crate) fn update_addresses(&mut self, addresses: &[IpAddr]) {
        self.addresses = addresses.to_vec();
    }

    /// Synthesizes the reply to a query per RFC 6762 6, or `None` when
    /// nothing we own is asked for (or everything was suppressed).
    pub(crate) fn reply(&mut self, msg: &Message, src: SocketAddr, now: Instant) -> Option<Reply> {
        if msg.header.response {
            return None;
        }
        let default_host = self.host_name.clone();

        let mut answers: Vec<(i32, Resource)> = Vec::new();
        let mut any_matched = false;
        let mut all_unicast = true;
        for q in &msg.questions {
            let mut matched = false;
            for reg in self.services.values() {
                if !reg.answers_queries() {
                    continue;
                }
                let addrs = self.addresses_for(reg);
                for answer in question_answers(reg, q, &default_host, addrs) {
                    matched = true;
                    if !answers.iter().any(|(_, a)| a.same_data(&answer)) {
                        answers.push((reg.id, answer));
                    }
                }
            }
            if matched {
                any_matched = true;
                all_unicast &= q.unicast_response;
            }
        }
        if !any_matched {
            return None;
        }

        // Known-answer suppression (RFC 6762 7.1): drop answers the querier
        // holds with at least half their TTL left; echo the stale ones.
        let mut known_answers = Vec::new();
        if self.config.known_answer_suppression_enabled {
            answers.retain(|(_, a)| match msg.answers.iter().find(|k| k.same_data(a)) {
                Some(k) if k.remaining_ttl(now) > a.header.ttl / 2 => false,
                Some(k) => {
                    known_answers.push(k.clone());
                    true
                }
                None => true,
            });
        }
        if answers.is_empty() {
            return None;
        }

        // Additional records pre-empting the obvious follow-up queries
        // (RFC 6763 12).
        let mut additionals: Vec<Resource> = Vec::new();
        for (id, answer) in &answers {
            let reg = &self.services[id];
            let host = reg.host_name(&default_host);
            let addrs = self.addresses_for(reg);
            match (&answer.rdata, answer.typ()) {
                (RData::Ptr(ptr), _) if ptr.ptr == reg.service_name() => {
                    additionals.push(reg.srv_record(&default_host));
                    additionals.push(reg.txt_record());
                    additionals.extend(address_records(&host, addrs, reg.short_ttl()));
                    additionals.push(instance_nsec(reg));
                    additionals.extend(host_nsec(&host, addrs, reg.short_ttl()));
                }
                (_, DnsType::Srv) => {
                    additionals.extend(address_records(&host, addrs, reg.short_ttl()));
                    additionals.extend(host_nsec(&host, addrs, reg.short_ttl()));
                }
                (_, DnsType::A) | (_, DnsType::Aaaa) => {
                    additionals.extend(host_nsec(&host, addrs, reg.short_ttl()));
                }
                _ => {}
            }
        }
        let mut deduped: Vec<Resource> = Vec::new();
        for additional in additionals {
            let in_answers = answers.iter().any(|(_, a)| a.same_data(&additional));
            let in_deduped = deduped.iter().any(|a| a.same_data(&additional));
            if !in_answers && !in_deduped {
                deduped.push(additional);
            }
        }

        let replied: HashSet<i32> = answers.iter().map(|(id, _)| *id).collect();
        for id in replied {
            if let Some(reg) = self.services.get_mut(&id) {
                reg.replied_queries += 1;
            }
        }

        let destination = if self.config.unicast_reply_enabled && all_unicast {
            src
        } else {
            super::multicast_destination(&src)
        };

        Some(Reply {
            destination,
            answers: answers.into_iter().map(|(_, a)| a).collect(),
            additional_answers: deduped,
            known_answers,
        })
    }

    /// Finds registrations an incoming packet's answer records collide
    /// with. Identical records (same name, rdata and our configured TTL)
    /// are not conflicts; they are somebody relaying our own data.
    pub(crate) fn conflicting_services(&self, msg: &Message) -> HashMap<i32, ConflictKind> {
        let mut conflicts = HashMap::new();
        let mut incoming_hosts: HashMap<Name, HashSet<IpAddr>> = HashMap::new();
        for record in &msg.answers {
            match &record.rdata {
                RData::Srv(_) | RData::Txt(_) => {
                    for reg in self.services.values() {
                        if reg.state == ServiceState::Exiting
                            || record.header.name != reg.service_name()
                        {
                            continue;
                        }
                        let ours = match record.typ() {
                            DnsType::Srv => reg.srv_record(&self.host_name),
                            _ => reg.txt_record(),
                        };
                        if record.rdata != ours.rdata || record.header.ttl != ours.header.ttl {
                            conflicts.insert(reg.id, ConflictKind::Service);
                        }
                    }
                }
                RData::A(AResource { a }) => {
                    incoming_hosts
                        .entry(record.header.name.clone())
                        .or_default()
                        .insert(IpAddr::V4(*a));
                }
                RData::Aaaa(AaaaResource { aaaa }) => {
                    incoming_hosts
                        .entry(record.header.name.clone())
                        .or_default()
                        .insert(IpAddr::V6(*aaaa));
                }
                _ => {}
            }
        }
        for (host, incoming) in incoming_hosts {
            let owner = self
                .services
                .values()
                .filter(|reg| reg.state != ServiceState::Exiting)
                .filter(|reg| reg.custom_host.as_ref() == Some(&host))
                .min_by_key(|reg| reg.id);
            if let Some(owner) = owner {
                let ours: HashSet<IpAddr> = owner.addresses.iter().copied().collect();
                if !incoming.is_subset(&ours) {
                    conflicts.entry(owner.id).or_insert(ConflictKind::Host);
                }
            }
        }
        conflicts
    }
}

// The answers one registration contributes to one question.
fn question_answers(
    reg: &ServiceRegistration,
    q: &Question,
    default_host: &Name,
    addrs: &[IpAddr],
) -> Vec<Resource> {
    let mut out = Vec::new();
    let any = q.typ == DnsType::Any;

    if any || q.typ == DnsType::Ptr {
        if names::type_equals_or_is_subtype(&reg.service_type, &q.name) {
            if q.name == reg.service_type {
                out.push(reg.ptr_record());
            } else if let Some(subtype) = reg
                .subtypes
                .iter()
                .find(|s| names::construct_full_subtype(&reg.service_type, s) == q.name)
            {
                out.push(reg.subtype_ptr_record(subtype));
            }
        } else if q.name == names::service_enumeration_name() {
            out.push(reg.enumeration_ptr_record());
        }
    }
    if (any || q.typ == DnsType::Srv) && q.name == reg.service_name() {
        out.push(reg.srv_record(default_host));
    }
    if (any || q.typ == DnsType::Txt) && q.name == reg.service_name() {
        out.push(reg.txt_record());
    }
    if q.name == reg.host_name(default_host) {
        for addr in addrs {
            match addr {
                IpAddr::V4(v4) if any || q.typ == DnsType::A => {
                    out.push(Resource::new(
                        q.name.clone(),
                        true,
                        reg.short_ttl(),
                        RData::A(AResource { a: *v4 }),
                    ));
                }
                IpAddr::V6(v6) if any || q.typ == DnsType::Aaaa => {
                    out.push(Resource::new(
                        q.name.clone(),
                        true,
                        reg.short_ttl(),
                        RData::Aaaa(AaaaResource { aaaa: *v6 }),
                    ));
                }
                _ => {}
            }
        }
    }
    out
}

// Address records for a host, cache-flush set.
fn address_records(host: &Name, addrs: &[IpAddr], ttl: Duration) -> Vec<Resource> {
    addrs
        .iter()
        .map(|addr| {
            let rdata = match addr {
                IpAddr::V4(v4) => RData::A(AResource { a: *v4 }),
                IpAddr::V6(v6) => RData::Aaaa(AaaaResource { aaaa: *v6 }),
            };
            Resource::new(host.clone(), true, ttl, rdata)
        })
        .collect()
}

// NSEC negative proof at the instance name: only TXT and SRV exist there.
fn instance_nsec(reg: &ServiceRegistration) -> Resource {
    let name = reg.service_name();
    Resource::new(
        name.clone(),
        true,
        reg.long_ttl(),
        RData::Nsec(NsecResource::new(name, &[DnsType::Txt, DnsType::Srv])),
    )
}

// NSEC negative proof at the host name for the address families actually
// present. None when the host has no addresses to prove anything about.
fn host_nsec(host: &Name, addrs: &[IpAddr], ttl: Duration) -> Option<Resource> {
    let mut types = Vec::new();
    if addrs.iter().any(|a| a.is_ipv4()) {
        types.push(DnsType::A);
    }
    if addrs.iter().any(|a| a.is_ipv6()) {
        types.push(DnsType::Aaaa);
    }
    if types.is_empty() {
        return None;
    }
    Some(Resource::new(
        host.clone(),
        true,
        ttl,
        RData::Nsec(NsecResource::new(host.clone(), &types)),
    ))
}
