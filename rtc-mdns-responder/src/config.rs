//! Configuration for the mDNS responder engine.
//!
//! # Example
//!
//! ```rust
//! use rtc_mdns_responder::ResponderConfig;
//! use std::net::IpAddr;
//! use std::time::Duration;
//!
//! let config = ResponderConfig::default()
//!     .with_host_label("MyDevice")
//!     .with_addresses(vec!["192.168.1.10".parse::<IpAddr>().unwrap()])
//!     .with_probe_interval(Duration::from_millis(250));
//! ```

use std::net::IpAddr;
use std::time::Duration;

/// Default TTL for service PTR and TXT records (RFC 6762 10).
pub(crate) const LONG_TTL: Duration = Duration::from_secs(4500);

/// Default TTL for SRV, address and NSEC records (RFC 6762 10).
pub(crate) const SHORT_TTL: Duration = Duration::from_secs(120);

/// TTL override bounds for unprivileged registrations.
pub(crate) const MIN_TTL_OVERRIDE: Duration = Duration::from_secs(30);
pub(crate) const MAX_TTL_OVERRIDE: Duration = Duration::from_secs(36_000);

/// Probes sent before a name is considered won (RFC 6762 8.1).
pub(crate) const DEFAULT_PROBE_COUNT: usize = 3;

/// Spacing between probes.
pub(crate) const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Unsolicited announcements sent after probing succeeds (RFC 6762 8.3).
pub(crate) const DEFAULT_ANNOUNCEMENT_COUNT: usize = 8;

/// Interval before the second announcement; it doubles after each send.
pub(crate) const DEFAULT_ANNOUNCEMENT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`Responder`](crate::Responder).
///
/// Use the builder pattern to construct a configuration:
///
/// ```rust
/// use rtc_mdns_responder::ResponderConfig;
///
/// let config = ResponderConfig::default()
///     .with_host_suffix([0u8; 16])
///     .with_unicast_reply(false);
/// ```
#[derive(Clone, Debug)]
pub struct ResponderConfig {
    /// First label of the host name all default-host services point at. The
    /// trailing `local` label is appended by the engine.
    ///
    /// Defaults to `Android_<32 hex chars>` with a random per-process
    /// identifier, stable for the lifetime of the process.
    pub host_label: String,

    /// Link addresses advertised for the default host. Can be replaced at
    /// runtime with [`Responder::update_addresses`](crate::Responder::update_addresses).
    pub addresses: Vec<IpAddr>,

    /// Honor the QU (unicast-response) question bit and address replies to
    /// the querier's source when every matched question set it.
    ///
    /// When disabled every reply goes to the multicast group.
    ///
    /// Default: true
    pub unicast_reply_enabled: bool,

    /// Suppress answers the querier already holds with at least half their
    /// TTL remaining (RFC 6762 7.1).
    ///
    /// Default: true
    pub known_answer_suppression_enabled: bool,

    /// Also probe for the host name and include its address records in the
    /// probe authority section.
    ///
    /// Default: false
    pub include_host_records_in_probing: bool,

    /// Number of probes sent before a name is considered won.
    ///
    /// Default: 3
    pub probe_count: usize,

    /// Spacing between probes.
    ///
    /// Default: 250ms
    pub probe_interval: Duration,

    /// Number of unsolicited announcements sent once probing succeeds.
    ///
    /// Default: 8
    pub announcement_count: usize,

    /// Interval before the second announcement; doubles after each send.
    ///
    /// Default: 1s
    pub announcement_interval: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            host_label: format!("Android_{:032X}", rand::random::<u128>()),
            addresses: Vec::new(),
            unicast_reply_enabled: true,
            known_answer_suppression_enabled: true,
            include_host_records_in_probing: false,
            probe_count: DEFAULT_PROBE_COUNT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            announcement_count: DEFAULT_ANNOUNCEMENT_COUNT,
            announcement_interval: DEFAULT_ANNOUNCEMENT_INTERVAL,
        }
    }
}

impl ResponderConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first label of the default host name.
    pub fn with_host_label(mut self, label: impl Into<String>) -> Self {
        self.host_label = label.into();
        self
    }

    /// Set the default host name from a fixed 16-byte process identifier,
    /// producing the `Android_<32 hex chars>` form.
    pub fn with_host_suffix(mut self, suffix: [u8; 16]) -> Self {
        self.host_label = format!("Android_{:032X}", u128::from_be_bytes(suffix));
        self
    }

    /// Set the initial link addresses advertised for the default host.
    pub fn with_addresses(mut self, addresses: Vec<IpAddr>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Enable or disable unicast replies to QU questions.
    pub fn with_unicast_reply(mut self, enabled: bool) -> Self {
        self.unicast_reply_enabled = enabled;
        self
    }

    /// Enable or disable known-answer suppression.
    pub fn with_known_answer_suppression(mut self, enabled: bool) -> Self {
        self.known_answer_suppression_enabled = enabled;
        self
    }

    /// Include host name questions and address records when probing.
    pub fn with_host_records_in_probing(mut self, enabled: bool) -> Self {
        self.include_host_records_in_probing = enabled;
        self
    }

    /// Set the number of probes sent for each new registration.
    pub fn with_probe_count(mut self, count: usize) -> Self {
        self.probe_count = count;
        self
    }

    /// Set the spacing between probes.
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Set the number of unsolicited announcements.
    pub fn with_announcement_count(mut self, count: usize) -> Self {
        self.announcement_count = count;
        self
    }

    /// Set the initial announcement interval.
    pub fn with_announcement_interval(mut self, interval: Duration) -> Self {
        self.announcement_interval = interval;
        self
    }
}
