use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::config::{LONG_TTL, MAX_TTL_OVERRIDE, MIN_TTL_OVERRIDE, SHORT_TTL};
use crate::message::name::Name;
use crate::message::resource::ptr::PtrResource;
use crate::message::resource::srv::SrvResource;
use crate::message::resource::txt::{TxtEntry, TxtResource};
use crate::message::resource::{RData, Resource};
use crate::proto::names;
use shared::error::*;

/// A service registration request.
///
/// # Example
///
/// ```rust
/// use rtc_mdns_responder::{ServiceInfo, TxtEntry};
///
/// let info = ServiceInfo::new("My Printer", "_ipp._tcp", 631)
///     .with_txt(vec![TxtEntry::new("rp", "ipp/print")])
///     .with_subtypes(vec!["_universal".to_string()]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ServiceInfo {
    /// User-visible instance name; truncated to 63 UTF-8 bytes.
    pub instance_name: String,
    /// Service type, `_app._tcp` or `_app._udp`, optionally followed by a
    /// comma-separated subtype list (`_app._tcp,_sub1`).
    pub service_type: String,
    /// Additional subtypes beyond the ones in `service_type`.
    pub subtypes: Vec<String>,
    pub port: u16,
    pub txt: Vec<TxtEntry>,
    /// Custom host label. When unset the responder's default host is used.
    pub host_label: Option<String>,
    /// Addresses of the custom host. Ignored without `host_label`.
    pub addresses: Vec<IpAddr>,
    /// Overrides the default record TTLs. Unprivileged registrations must
    /// stay within 30 seconds to 10 hours.
    pub ttl: Option<Duration>,
    /// Privileged registrations may use any non-zero TTL override.
    pub privileged: bool,
}

impl ServiceInfo {
    pub fn new(instance_name: impl Into<String>, service_type: impl Into<String>, port: u16) -> Self {
        Self {
            instance_name: instance_name.into(),
            service_type: service_type.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_subtypes(mut self, subtypes: Vec<String>) -> Self {
        self.subtypes = subtypes;
        self
    }

    pub fn with_txt(mut self, txt: Vec<TxtEntry>) -> Self {
        self.txt = txt;
        self
    }

    pub fn with_custom_host(mut self, label: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        self.host_label = Some(label.into());
        self.addresses = addresses;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }
}

/// Lifecycle of a registration. Transitions only move forward; a removed id
/// is retired and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServiceState {
    /// Verifying name uniqueness on the link (RFC 6762 8.1).
    Probing,
    /// Name won; sending unsolicited announcements.
    Announcing,
    /// At least two announcements out.
    Active,
    /// Goodbye scheduled or sent; kept mapped until removal.
    Exiting,
}

// One registered service and its advertisement state.
#[derive(Debug, Clone)]
pub(crate) struct ServiceRegistration {
    pub(crate) id: i32,
    pub(crate) instance_name: String,
    pub(crate) service_type: Name, // [_app, _tcp|_udp, local]
    pub(crate) subtypes: Vec<String>,
    pub(crate) port: u16,
    pub(crate) txt: Vec<TxtEntry>,
    pub(crate) custom_host: Option<Name>, // [label, local]
    pub(crate) addresses: Vec<IpAddr>,    // custom host only
    pub(crate) ttl_override: Option<Duration>,

    pub(crate) state: ServiceState,
    pub(crate) probes_sent: usize,
    pub(crate) announcements_sent: usize,
    // True once at least one announcement went out; gates the goodbye.
    pub(crate) advertised: bool,
    pub(crate) exit_announced: bool,
    pub(crate) sent_packets: u64,
    pub(crate) replied_queries: u64,

    // Next probe or announcement due, None when the schedule is drained.
    pub(crate) next_send: Option<Instant>,
    pub(crate) announce_interval: Duration,
}

impl ServiceRegistration {
    pub(crate) fn new(id: i32, info: &ServiceInfo, announce_interval: Duration) -> Result<Self> {
        if info.instance_name.is_empty() {
            return Err(Error::ErrBadParameters("empty instance name".to_owned()));
        }
        let (type_labels, mut subtypes) = names::parse_service_type(&info.service_type)?;
        for subtype in &info.subtypes {
            names::validate_subtype(subtype)?;
            if !subtypes.iter().any(|s| s == subtype) {
                subtypes.push(subtype.clone());
            }
        }
        if let Some(ttl) = info.ttl {
            let in_range = ttl >= MIN_TTL_OVERRIDE && ttl <= MAX_TTL_OVERRIDE;
            if !info.privileged && !in_range {
                return Err(Error::ErrBadParameters(format!(
                    "TTL override out of range: {ttl:?}"
                )));
            }
            if ttl.is_zero() {
                return Err(Error::ErrBadParameters("zero TTL override".to_owned()));
            }
        }
        let custom_host = match &info.host_label {
            Some(label) => {
                if info.addresses.is_empty() {
                    return Err(Error::ErrBadParameters(
                        "custom host requires addresses".to_owned(),
                    ));
                }
                Some(Name::new(vec![label.clone(), names::LOCAL_LABEL.to_owned()])?)
            }
            None => None,
        };
        let mut service_type = type_labels;
        service_type.push(names::LOCAL_LABEL.to_owned());
        Ok(Self {
            id,
            instance_name: names::truncate_instance_name(&info.instance_name),
            service_type: Name::new(service_type)?,
            subtypes,
            port: info.port,
            txt: info.txt.clone(),
            custom_host,
            addresses: info.addresses.clone(),
            ttl_override: info.ttl,
            state: ServiceState::Probing,
            probes_sent: 0,
            announcements_sent: 0,
            advertised: false,
            exit_announced: false,
            sent_packets: 0,
            replied_queries: 0,
            next_send: None,
            announce_interval,
        })
    }

    /// `<instance>.<type>.local`.
    pub(crate) fn service_name(&self) -> Name {
        self.service_type
            .prefixed(&self.instance_name)
            .expect("instance name is truncated to one valid label")
    }

    /// The host this registration's SRV points at.
    pub(crate) fn host_name(&self, default_host: &Name) -> Name {
        self.custom_host
            .clone()
            .unwrap_or_else(|| default_host.clone())
    }

    pub(crate) fn long_ttl(&self) -> Duration {
        self.ttl_override.unwrap_or(LONG_TTL)
    }

    pub(crate) fn short_ttl(&self) -> Duration {
        self.ttl_override.unwrap_or(SHORT_TTL)
    }

    pub(crate) fn answers_queries(&self) -> bool {
        matches!(self.state, ServiceState::Announcing | ServiceState::Active)
    }

    // Record builders. cache-flush is set on the records this registration
    // owns exclusively (SRV, TXT) and never on shared PTRs (RFC 6762 10.2).

    pub(crate) fn srv_record(&self, default_host: &Name) -> Resource {
        Resource::new(
            self.service_name(),
            true,
            self.short_ttl(),
            RData::Srv(SrvResource {
                priority: 0,
                weight: 0,
                port: self.port,
                target: self.host_name(default_host),
            }),
        )
    }

    pub(crate) fn txt_record(&self) -> Resource {
        Resource::new(
            self.service_name(),
            true,
            self.long_ttl(),
            RData::Txt(TxtResource {
                entries: self.txt.clone(),
            }),
        )
    }

    pub(crate) fn ptr_record(&self) -> Resource {
        Resource::new(
            self.service_type.clone(),
            false,
            self.long_ttl(),
            RData::Ptr(PtrResource {
                ptr: self.service_name(),
            }),
        )
    }

    pub(crate) fn subtype_ptr_record(&self, subtype: &str) -> Resource {
        Resource::new(
            names::construct_full_subtype(&self.service_type, subtype),
            false,
            self.long_ttl(),
            RData::Ptr(PtrResource {
                ptr: self.service_name(),
            }),
        )
    }

    pub(crate) fn subtype_ptr_records(&self) -> Vec<Resource> {
        self.subtypes
            .iter()
            .map(|subtype| self.subtype_ptr_record(subtype))
            .collect()
    }

    pub(crate) fn enumeration_ptr_record(&self) -> Resource {
        Resource::new(
            names::service_enumeration_name(),
            false,
            self.long_ttl(),
            RData::Ptr(PtrResource {
                ptr: self.service_type.clone(),
            }),
        )
    }
}
