use std::net::IpAddr;

use crate::message::name::{Name, label_eq_ignore_dns_case};
use shared::error::*;

pub(crate) const LOCAL_LABEL: &str = "local";
pub(crate) const SUBTYPE_LABEL: &str = "_sub";

// Instance names longer than this many UTF-8 bytes are truncated, never
// rejected (they become one DNS label).
pub(crate) const MAX_INSTANCE_NAME_LEN: usize = 63;

/// `_services._dns-sd._udp.local`, the service-type enumeration name
/// (RFC 6763 9).
pub(crate) fn service_enumeration_name() -> Name {
    Name::new(vec![
        "_services".to_owned(),
        "_dns-sd".to_owned(),
        "_udp".to_owned(),
        LOCAL_LABEL.to_owned(),
    ])
    .expect("static name is valid")
}

// A service-type label: underscore followed by letters, digits or hyphens,
// within the DNS label length bound.
fn is_service_label(label: &str) -> bool {
    let mut chars = label.chars();
    chars.next() == Some('_')
        && label.len() > 1
        && label.len() <= 63
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_transport_label(label: &str) -> bool {
    label_eq_ignore_dns_case(label, "_tcp") || label_eq_ignore_dns_case(label, "_udp")
}

/// Parses a service type of the form `_app._tcp` with an optional
/// comma-separated subtype list (`_app._tcp,_sub1,_sub2`). Returns the two
/// type labels and the subtype labels.
pub(crate) fn parse_service_type(typ: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut parts = typ.split(',');
    let base = parts.next().unwrap_or_default();
    let labels: Vec<&str> = base.split('.').collect();
    if labels.len() != 2 || !is_service_label(labels[0]) || !is_transport_label(labels[1]) {
        return Err(Error::ErrBadParameters(format!(
            "invalid service type: {typ}"
        )));
    }
    let mut subtypes = Vec::new();
    for subtype in parts {
        if !is_service_label(subtype) {
            return Err(Error::ErrBadParameters(format!("invalid subtype: {subtype}")));
        }
        subtypes.push(subtype.to_owned());
    }
    Ok((
        vec![labels[0].to_owned(), labels[1].to_owned()],
        subtypes,
    ))
}

pub(crate) fn validate_subtype(subtype: &str) -> Result<()> {
    if !is_service_label(subtype) {
        return Err(Error::ErrBadParameters(format!("invalid subtype: {subtype}")));
    }
    Ok(())
}

/// The full subtype name `<subtype>._sub.<type>` for a service type name,
/// e.g. `_printer` on `_http._tcp.local` gives
/// `_printer._sub._http._tcp.local`.
pub(crate) fn construct_full_subtype(type_name: &Name, subtype: &str) -> Name {
    type_name
        .prefixed(SUBTYPE_LABEL)
        .and_then(|n| n.prefixed(subtype))
        .expect("subtype labels are validated on registration")
}

/// True when `b` names the type `a` directly or one of its subtypes
/// (`<x>._sub.<a>`).
pub(crate) fn type_equals_or_is_subtype(a: &Name, b: &Name) -> bool {
    a == b
        || (b.len() == a.len() + 2
            && label_eq_ignore_dns_case(&b.labels()[1], SUBTYPE_LABEL)
            && a.is_suffix_of(b))
}

/// The reverse-DNS name for an address: four reversed decimal octet labels
/// under `in-addr.arpa` for IPv4, 32 reversed nibble labels (uppercase hex)
/// under `ip6.arpa` for IPv6.
pub fn reverse_dns_address(addr: &IpAddr) -> Name {
    let mut labels = Vec::new();
    match addr {
        IpAddr::V4(v4) => {
            for octet in v4.octets().iter().rev() {
                labels.push(octet.to_string());
            }
            labels.push("in-addr".to_owned());
        }
        IpAddr::V6(v6) => {
            for byte in v6.octets().iter().rev() {
                labels.push(format!("{:X}", byte & 0xF));
                labels.push(format!("{:X}", byte >> 4));
            }
            labels.push("ip6".to_owned());
        }
    }
    labels.push("arpa".to_owned());
    Name::new(labels).expect("reverse-DNS labels are within bounds")
}

/// Truncates an instance name to at most `MAX_INSTANCE_NAME_LEN` UTF-8
/// bytes, keeping whole code points.
pub(crate) fn truncate_instance_name(name: &str) -> String {
    let mut len = 0;
    let mut out = String::new();
    for c in name.chars() {
        if len + c.len_utf8() > MAX_INSTANCE_NAME_LEN {
            break;
        }
        len += c.len_utf8();
        out.push(c);
    }
    out
}
