use std::collections::HashMap;
use std::fmt;

use super::name::Name;
use super::packer::*;
use super::*;
use shared::error::Result;

// A Question is a DNS query.
//
// The unicast_response flag is the mDNS QU bit carried in the top bit of the
// wire class field (RFC 6762 5.4): the querier is willing to accept a reply
// sent unicast to its source address.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Question {
    pub name: Name,
    pub typ: DnsType,
    pub class: DnsClass,
    pub unicast_response: bool,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Question{{Name: {}, Type: {}, Class: {}, QU: {}}}",
            self.name, self.typ, self.class, self.unicast_response
        )
    }
}

impl Question {
    /// A multicast (QM) question of the given type.
    pub fn new(name: Name, typ: DnsType) -> Self {
        Self {
            name,
            typ,
            class: DNSCLASS_INET,
            unicast_response: false,
        }
    }

    // pack appends the wire format of the Question to msg.
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        msg = self.name.pack(msg, compression, compression_off)?;
        msg = self.typ.pack(msg);
        let mut class = self.class.0;
        if self.unicast_response {
            class |= MDNS_CLASS_TOP_BIT;
        }
        Ok(pack_uint16(msg, class))
    }

    pub(crate) fn unpack(msg: &[u8], off: usize) -> Result<(Question, usize)> {
        let (name, off) = Name::unpack(msg, off)?;
        let mut typ = DnsType::default();
        let off = typ.unpack(msg, off)?;
        let (class, off) = unpack_uint16(msg, off)?;
        Ok((
            Question {
                name,
                typ,
                class: DnsClass(class & !MDNS_CLASS_TOP_BIT),
                unicast_response: class & MDNS_CLASS_TOP_BIT != 0,
            },
            off,
        ))
    }
}
