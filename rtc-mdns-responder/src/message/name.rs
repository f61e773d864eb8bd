use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use shared::error::*;

// The wire format caps an encoded name at 255 bytes and each label at 63.
const MAX_ENCODED_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

// Compression pointers are followed at most this many times before the name
// is rejected as a loop.
const MAX_POINTERS: usize = 128;

/// Fold a single character per RFC 6762 DNS case rules: only `A`..`Z` map to
/// lowercase, every other character compares as-is.
pub fn dns_lower_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

/// A domain name as an ordered sequence of UTF-8 labels.
///
/// Equality and hashing ignore DNS case: `A`..`Z` fold to lowercase, all
/// other characters (including accented ones) compare verbatim. The original
/// case is preserved for display and wire encoding.
#[derive(Clone, Default, Debug)]
pub struct Name {
    labels: Vec<String>,
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| label_eq_ignore_dns_case(a, b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in &self.labels {
            for c in label.chars() {
                dns_lower_case(c).hash(state);
            }
            0xffu8.hash(state); // label separator
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{label}.")?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Name::default());
        }
        Name::new(trimmed.split('.').map(str::to_owned).collect())
    }
}

pub(crate) fn label_eq_ignore_dns_case(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .zip(b.chars())
            .all(|(x, y)| dns_lower_case(x) == dns_lower_case(y))
}

impl Name {
    /// Builds a name from labels, validating DNS length bounds.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let mut encoded_len = 1; // root terminator
        for label in &labels {
            if label.is_empty() {
                return Err(Error::ErrZeroSegLen);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::ErrSegTooLong);
            }
            encoded_len += label.len() + 1;
        }
        if encoded_len > MAX_ENCODED_LEN {
            return Err(Error::ErrNameTooLong);
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// A new name with `suffix`'s labels appended.
    pub fn extended(&self, suffix: &Name) -> Result<Name> {
        let mut labels = self.labels.clone();
        labels.extend(suffix.labels.iter().cloned());
        Name::new(labels)
    }

    /// A new name with one label prepended.
    pub fn prefixed(&self, label: &str) -> Result<Name> {
        let mut labels = Vec::with_capacity(self.labels.len() + 1);
        labels.push(label.to_owned());
        labels.extend(self.labels.iter().cloned());
        Name::new(labels)
    }

    /// True when `self`'s labels equal the trailing labels of `other`,
    /// ignoring DNS case. Every name is a suffix of itself.
    pub fn is_suffix_of(&self, other: &Name) -> bool {
        if self.labels.len() > other.labels.len() {
            return false;
        }
        let skip = other.labels.len() - self.labels.len();
        self.labels
            .iter()
            .zip(&other.labels[skip..])
            .all(|(a, b)| label_eq_ignore_dns_case(a, b))
    }

    // pack appends the wire format of the name to msg, compressing suffixes
    // that were already written at a pointer-reachable offset.
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        for i in 0..self.labels.len() {
            if let Some(map) = compression {
                let key = self.labels[i..].join(".");
                if let Some(&ptr) = map.get(&key) {
                    msg = super::packer::pack_uint16(msg, 0xC000 | ptr as u16);
                    return Ok(msg);
                }
                let ptr = msg.len() - compression_off;
                if ptr <= 0x3FFF {
                    map.insert(key, ptr);
                }
            }
            let label = self.labels[i].as_bytes();
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::ErrSegTooLong);
            }
            msg.push(label.len() as u8);
            msg.extend_from_slice(label);
        }
        msg.push(0);
        Ok(msg)
    }

    // unpack parses a possibly compressed name starting at off, following at
    // most MAX_POINTERS pointers. Returns the offset one past the name as it
    // appears in the section being parsed.
    pub(crate) fn unpack(msg: &[u8], off: usize) -> Result<(Name, usize)> {
        let mut labels = Vec::new();
        let mut encoded_len = 1;
        let mut curr = off;
        let mut new_off = off;
        let mut pointers = 0;
        loop {
            if curr >= msg.len() {
                return Err(Error::ErrBaseLen);
            }
            let c = msg[curr];
            match c & 0xC0 {
                0x00 => {
                    if c == 0 {
                        if pointers == 0 {
                            new_off = curr + 1;
                        }
                        break;
                    }
                    let begin = curr + 1;
                    let end = begin + c as usize;
                    if end > msg.len() {
                        return Err(Error::ErrCalcLen);
                    }
                    encoded_len += c as usize + 1;
                    if encoded_len > MAX_ENCODED_LEN {
                        return Err(Error::ErrNameTooLong);
                    }
                    labels.push(String::from_utf8_lossy(&msg[begin..end]).into_owned());
                    curr = end;
                    if pointers == 0 {
                        new_off = curr;
                    }
                }
                0xC0 => {
                    if curr + 1 >= msg.len() {
                        return Err(Error::ErrInvalidPtr);
                    }
                    if pointers == 0 {
                        new_off = curr + 2;
                    }
                    pointers += 1;
                    if pointers > MAX_POINTERS {
                        return Err(Error::ErrTooManyPtr);
                    }
                    curr = ((c as usize & 0x3F) << 8) | msg[curr + 1] as usize;
                }
                _ => return Err(Error::ErrReserved),
            }
        }
        Ok((Name { labels }, new_off))
    }

    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        let mut curr = off;
        loop {
            if curr >= msg.len() {
                return Err(Error::ErrBaseLen);
            }
            let c = msg[curr];
            match c & 0xC0 {
                0x00 => {
                    if c == 0 {
                        return Ok(curr + 1);
                    }
                    curr += 1 + c as usize;
                }
                0xC0 => return Ok(curr + 2),
                _ => return Err(Error::ErrReserved),
            }
        }
    }
}
