use std::collections::HashMap;
use std::fmt;

use super::super::name::Name;
use super::super::packer::*;
use shared::error::*;

// An SrvResource is a service location record (RFC 2782) pointing at the
// host and port an instance is reachable on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvResource {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

impl fmt::Display for SrvResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.SRVResource{{Priority: {}, Weight: {}, Port: {}, Target: {}}}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

impl SrvResource {
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        msg = pack_uint16(msg, self.priority);
        msg = pack_uint16(msg, self.weight);
        msg = pack_uint16(msg, self.port);
        self.target.pack(msg, compression, compression_off)
    }

    pub(crate) fn unpack(msg: &[u8], off: usize, _length: usize) -> Result<Self> {
        let (priority, off) = unpack_uint16(msg, off)?;
        let (weight, off) = unpack_uint16(msg, off)?;
        let (port, off) = unpack_uint16(msg, off)?;
        let (target, _) = Name::unpack(msg, off)?;
        Ok(Self {
            priority,
            weight,
            port,
            target,
        })
    }
}
