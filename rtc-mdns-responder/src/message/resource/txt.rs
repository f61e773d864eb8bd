use std::fmt;

use super::super::name::label_eq_ignore_dns_case;
use super::super::packer::*;
use shared::error::*;

/// One TXT attribute per RFC 6763 6.3.
///
/// `value: None` is a bare key (`key`), which is distinct from a key with an
/// empty value (`key=`, `value: Some(vec![])`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtEntry {
    pub key: String,
    pub value: Option<Vec<u8>>,
}

impl TxtEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    // One wire character-string: "key" or "key=" + value bytes.
    fn to_wire(&self) -> Vec<u8> {
        let mut out = self.key.as_bytes().to_vec();
        if let Some(value) = &self.value {
            out.push(b'=');
            out.extend_from_slice(value);
        }
        out
    }

    fn from_wire(bytes: &[u8]) -> Self {
        match bytes.iter().position(|&b| b == b'=') {
            Some(eq) => Self {
                key: String::from_utf8_lossy(&bytes[..eq]).into_owned(),
                value: Some(bytes[eq + 1..].to_vec()),
            },
            None => Self {
                key: String::from_utf8_lossy(bytes).into_owned(),
                value: None,
            },
        }
    }
}

impl fmt::Display for TxtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, String::from_utf8_lossy(value)),
            None => write!(f, "{}", self.key),
        }
    }
}

// A TxtResource is an ordered list of TXT attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxtResource {
    pub entries: Vec<TxtEntry>,
}

impl fmt::Display for TxtResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v: Vec<String> = self.entries.iter().map(|e| e.to_string()).collect();
        write!(f, "dnsmessage.TXTResource{{TXT: [{}]}}", v.join(", "))
    }
}

impl TxtResource {
    pub(crate) fn pack(&self, mut msg: Vec<u8>) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            // An empty TXT record is a single zero-length string
            // (RFC 6763 6.1).
            msg.push(0);
            return Ok(msg);
        }
        for entry in &self.entries {
            msg = pack_str(msg, &entry.to_wire())?;
        }
        Ok(msg)
    }

    // unpack keeps entry order; zero-length strings are dropped and a later
    // duplicate of an already seen key (DNS case-insensitive) is ignored.
    pub(crate) fn unpack(msg: &[u8], mut off: usize, length: usize) -> Result<Self> {
        let end = off + length;
        let mut entries: Vec<TxtEntry> = Vec::new();
        while off < end {
            let (bytes, new_off) = unpack_str(msg, off)?;
            if new_off > end {
                return Err(Error::ErrCalcLen);
            }
            off = new_off;
            if bytes.is_empty() {
                continue;
            }
            let entry = TxtEntry::from_wire(&bytes);
            if entries
                .iter()
                .any(|e| label_eq_ignore_dns_case(&e.key, &entry.key))
            {
                continue;
            }
            entries.push(entry);
        }
        Ok(Self { entries })
    }
}
