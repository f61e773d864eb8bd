pub mod a;
pub mod aaaa;
pub mod nsec;
pub mod ptr;
pub mod srv;
pub mod txt;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use a::*;
use aaaa::*;
use nsec::*;
use ptr::*;
use srv::*;
use txt::*;

use super::name::Name;
use super::packer::*;
use super::*;
use shared::error::*;

// A Resource is a DNS resource record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub header: ResourceHeader,
    pub rdata: RData,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Resource{{Header: {}, Body: {}}}",
            self.header, self.rdata
        )
    }
}

/// Header fields shared by every resource record.
///
/// The record type is not stored here; it is derived from the rdata when
/// packing. `cache_flush` is the top bit of the wire class field per RFC 6762
/// 10.2. `received_at` is set for records parsed out of a received packet and
/// `None` for locally generated ones.
#[derive(Clone, Debug)]
pub struct ResourceHeader {
    pub name: Name,
    pub class: DnsClass,
    pub cache_flush: bool,
    pub ttl: Duration,
    pub received_at: Option<Instant>,
}

impl Default for ResourceHeader {
    fn default() -> Self {
        Self {
            name: Name::default(),
            class: DNSCLASS_INET,
            cache_flush: false,
            ttl: Duration::ZERO,
            received_at: None,
        }
    }
}

// received_at is a parse timestamp, not part of the record's identity.
impl PartialEq for ResourceHeader {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.class == other.class
            && self.cache_flush == other.cache_flush
            && self.ttl == other.ttl
    }
}

impl fmt::Display for ResourceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.ResourceHeader{{Name: {}, Class: {}, CacheFlush: {}, TTL: {:?}}}",
            self.name, self.class, self.cache_flush, self.ttl,
        )
    }
}

impl Resource {
    pub fn new(name: Name, cache_flush: bool, ttl: Duration, rdata: RData) -> Self {
        Self {
            header: ResourceHeader {
                name,
                class: DNSCLASS_INET,
                cache_flush,
                ttl,
                received_at: None,
            },
            rdata,
        }
    }

    pub fn typ(&self) -> DnsType {
        self.rdata.real_type()
    }

    /// TTL left on the record at `now`, aged from its receipt time. Locally
    /// generated records never age.
    pub fn remaining_ttl(&self, now: Instant) -> Duration {
        match self.header.received_at {
            Some(received) => self
                .header
                .ttl
                .saturating_sub(now.saturating_duration_since(received)),
            None => self.header.ttl,
        }
    }

    /// Same `(name, type, rdata)` identity, names compared DNS
    /// case-insensitively. TTL and cache-flush are not part of the identity.
    pub fn same_data(&self, other: &Resource) -> bool {
        self.header.name == other.header.name && self.rdata == other.rdata
    }

    // pack appends the wire format of the Resource to msg.
    pub(crate) fn pack(
        &mut self,
        msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        let mut msg = self.header.name.pack(msg, compression, compression_off)?;
        msg = self.rdata.real_type().pack(msg);
        let mut class = self.header.class.0;
        if self.header.cache_flush {
            class |= MDNS_CLASS_TOP_BIT;
        }
        msg = pack_uint16(msg, class);
        msg = pack_uint32(msg, self.header.ttl.as_secs() as u32);
        let len_off = msg.len();
        msg = pack_uint16(msg, 0);
        let pre_len = msg.len();
        msg = self.rdata.pack(msg, compression, compression_off)?;
        fix_len(&mut msg, len_off, pre_len)?;
        Ok(msg)
    }

    // unpack parses one resource record. Records of types this crate does
    // not model are skipped, yielding None.
    pub(crate) fn unpack(
        msg: &[u8],
        off: usize,
        received_at: Option<Instant>,
    ) -> Result<(Option<Resource>, usize)> {
        let (name, off) = Name::unpack(msg, off)?;
        let mut typ = DnsType::default();
        let off = typ.unpack(msg, off)?;
        let (class, off) = unpack_uint16(msg, off)?;
        let (ttl, off) = unpack_uint32(msg, off)?;
        let (length, off) = unpack_uint16(msg, off)?;
        let end = off + length as usize;
        if end > msg.len() {
            return Err(Error::ErrResourceLen);
        }
        let rdata = match RData::unpack(typ, msg, off, length as usize)? {
            Some(rdata) => rdata,
            None => return Ok((None, end)),
        };
        Ok((
            Some(Resource {
                header: ResourceHeader {
                    name,
                    class: DnsClass(class & !MDNS_CLASS_TOP_BIT),
                    cache_flush: class & MDNS_CLASS_TOP_BIT != 0,
                    ttl: Duration::from_secs(ttl as u64),
                    received_at,
                },
                rdata,
            }),
            end,
        ))
    }
}

// fix_len updates a packed length field to cover the bytes written after it.
fn fix_len(msg: &mut [u8], len_off: usize, pre_len: usize) -> Result<()> {
    if msg.len() < pre_len || msg.len() > pre_len + u16::MAX as usize {
        return Err(Error::ErrResTooLong);
    }
    let con_len = msg.len() - pre_len;
    msg[len_off] = (con_len >> 8) as u8;
    msg[len_off + 1] = (con_len & 0xFF) as u8;
    Ok(())
}

// RData is the typed body of a resource record.
#[derive(Debug, Clone, PartialEq)]
pub enum RData {
    A(AResource),
    Aaaa(AaaaResource),
    Ptr(PtrResource),
    Srv(SrvResource),
    Txt(TxtResource),
    Nsec(NsecResource),
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(r) => r.fmt(f),
            RData::Aaaa(r) => r.fmt(f),
            RData::Ptr(r) => r.fmt(f),
            RData::Srv(r) => r.fmt(f),
            RData::Txt(r) => r.fmt(f),
            RData::Nsec(r) => r.fmt(f),
        }
    }
}

impl RData {
    // real_type returns the actual type of the record, used to fill in the
    // wire type field.
    pub fn real_type(&self) -> DnsType {
        match self {
            RData::A(_) => DnsType::A,
            RData::Aaaa(_) => DnsType::Aaaa,
            RData::Ptr(_) => DnsType::Ptr,
            RData::Srv(_) => DnsType::Srv,
            RData::Txt(_) => DnsType::Txt,
            RData::Nsec(_) => DnsType::Nsec,
        }
    }

    pub(crate) fn pack(
        &self,
        msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        match self {
            RData::A(r) => r.pack(msg),
            RData::Aaaa(r) => r.pack(msg),
            RData::Ptr(r) => r.pack(msg, compression, compression_off),
            RData::Srv(r) => r.pack(msg, compression, compression_off),
            RData::Txt(r) => r.pack(msg),
            RData::Nsec(r) => r.pack(msg, compression, compression_off),
        }
    }

    pub(crate) fn unpack(
        typ: DnsType,
        msg: &[u8],
        off: usize,
        length: usize,
    ) -> Result<Option<RData>> {
        Ok(Some(match typ {
            DnsType::A => RData::A(AResource::unpack(msg, off, length)?),
            DnsType::Aaaa => RData::Aaaa(AaaaResource::unpack(msg, off, length)?),
            DnsType::Ptr => RData::Ptr(PtrResource::unpack(msg, off, length)?),
            DnsType::Srv => RData::Srv(SrvResource::unpack(msg, off, length)?),
            DnsType::Txt => RData::Txt(TxtResource::unpack(msg, off, length)?),
            DnsType::Nsec => RData::Nsec(NsecResource::unpack(msg, off, length)?),
            _ => return Ok(None),
        }))
    }
}
