//! Filter engine

use std::net::{IpAddr, SocketAddr};

use ipnet::IpNet;
use siphon_config::FilterSettings;

use crate::severity::severity_of;

/// Runtime filter options
///
/// Already normalized by configuration loading: `min_severity` is in `0..=7`
/// and a disabled filter carries the permissive settings. Use
/// `FilterOptions::from(&FilterSettings)` to derive them from a parsed
/// config section.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Whether filtering is active at all
    pub enabled: bool,

    /// Allowed source addresses: exact IP literals or CIDR ranges
    /// (entries containing `/`). Empty = no source restriction.
    pub allowed_sources: Vec<String>,

    /// Highest severity code still accepted (0 = emergency .. 7 = debug)
    pub min_severity: u8,

    /// Literal substrings that reject a message on match
    pub exclude_substrings: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_sources: Vec::new(),
            min_severity: 7,
            exclude_substrings: Vec::new(),
        }
    }
}

impl From<&FilterSettings> for FilterOptions {
    fn from(settings: &FilterSettings) -> Self {
        Self {
            enabled: settings.enabled,
            allowed_sources: settings.allowed_sources.clone(),
            min_severity: settings.min_severity(),
            exclude_substrings: settings.exclude_substrings.clone(),
        }
    }
}

/// Filter construction errors
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A `/`-containing allow-list entry is not a valid CIDR range
    #[error("invalid CIDR '{entry}' in allowed_sources: {source}")]
    InvalidCidr {
        entry: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}

/// Per-message accept/drop decisions
///
/// State is written once at construction and only read afterwards, so
/// [`MessageFilter::should_accept`] is safe for unsynchronized concurrent
/// calls from any number of tasks.
#[derive(Debug)]
pub struct MessageFilter {
    options: FilterOptions,

    /// Parsed form of every CIDR entry in `allowed_sources`
    networks: Vec<IpNet>,
}

impl MessageFilter {
    /// Build a filter, parsing all CIDR entries of the allow-list.
    ///
    /// Fails on the first malformed CIDR entry; no filter is produced.
    pub fn new(options: FilterOptions) -> Result<Self, FilterError> {
        let mut networks = Vec::new();

        for entry in &options.allowed_sources {
            if entry.contains('/') {
                let net = entry
                    .parse::<IpNet>()
                    .map_err(|source| FilterError::InvalidCidr {
                        entry: entry.clone(),
                        source,
                    })?;
                networks.push(net);
            }
        }

        Ok(Self { options, networks })
    }

    /// Decide whether a message from `source` is accepted.
    ///
    /// Checks run in order; the first failing check rejects:
    /// allow-list, then severity threshold, then substring exclusions.
    pub fn should_accept(&self, message: &str, source: SocketAddr) -> bool {
        if !self.options.enabled {
            return true;
        }

        // All-permissive settings decide every message the same way; skip
        // the per-message checks entirely.
        if self.options.allowed_sources.is_empty()
            && self.options.min_severity == 7
            && self.options.exclude_substrings.is_empty()
        {
            return true;
        }

        if !self.options.allowed_sources.is_empty() && !self.source_allowed(source.ip()) {
            return false;
        }

        if severity_of(message) > self.options.min_severity {
            return false;
        }

        !self
            .options
            .exclude_substrings
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }

    /// Allow-list check for one source IP.
    ///
    /// Loopback peers always pass; the allow-list only gates remote sources.
    /// A non-CIDR entry matches by exact string comparison (no implicit /32),
    /// a CIDR entry by containment.
    fn source_allowed(&self, ip: IpAddr) -> bool {
        if ip.is_loopback() {
            return true;
        }

        let literal = ip.to_string();
        if self
            .options
            .allowed_sources
            .iter()
            .any(|entry| !entry.contains('/') && *entry == literal)
        {
            return true;
        }

        self.networks.iter().any(|net| net.contains(&ip))
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
