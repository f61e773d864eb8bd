use std::fmt;
use std::net::Ipv4Addr;

use super::super::packer::*;
use shared::error::*;

// An AResource is an IPv4 address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AResource {
    pub a: Ipv4Addr,
}

impl fmt::Display for AResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dnsmessage.AResource{{A: {}}}", self.a)
    }
}

impl AResource {
    pub(crate) fn pack(&self, msg: Vec<u8>) -> Result<Vec<u8>> {
        Ok(pack_bytes(msg, &self.a.octets()))
    }

    pub(crate) fn unpack(msg: &[u8], off: usize, length: usize) -> Result<Self> {
        if length != 4 {
            return Err(Error::ErrResourceLen);
        }
        let mut octets = [0u8; 4];
        unpack_bytes(msg, off, &mut octets)?;
        Ok(Self {
            a: Ipv4Addr::from(octets),
        })
    }
}
