use std::fmt;
use std::net::Ipv6Addr;

use super::super::packer::*;
use shared::error::*;

// An AaaaResource is an IPv6 address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaaaResource {
    pub aaaa: Ipv6Addr,
}

impl fmt::Display for AaaaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dnsmessage.AAAAResource{{AAAA: {}}}", self.aaaa)
    }
}

impl AaaaResource {
    pub(crate) fn pack(&self, msg: Vec<u8>) -> Result<Vec<u8>> {
        Ok(pack_bytes(msg, &self.aaaa.octets()))
    }

    pub(crate) fn unpack(msg: &[u8], off: usize, length: usize) -> Result<Self> {
        if length != 16 {
            return Err(Error::ErrResourceLen);
        }
        let mut octets = [0u8; 16];
        unpack_bytes(msg, off, &mut octets)?;
        Ok(Self {
            aaaa: Ipv6Addr::from(octets),
        })
    }
}
