//! Message Filter
//!
//! Per-message accept/drop decisions: source-address allow-list, minimum
//! severity, and substring exclusions over an immutable configuration.
//!
//! # Design
//!
//! - **Write-once state** - CIDR entries are parsed once at construction;
//!   nothing mutates afterwards, so [`MessageFilter::should_accept`] needs no
//!   locking and is shared across ingestion tasks behind a plain `Arc`
//! - **Fail-fast construction** - one malformed CIDR entry aborts startup;
//!   a partially working filter is never produced
//! - **Short-circuit evaluation** - checks run in a fixed order and the first
//!   failing check rejects
//!
//! # Example
//!
//! ```
//! use siphon_filter::{FilterOptions, MessageFilter};
//!
//! let filter = MessageFilter::new(FilterOptions {
//!     enabled: true,
//!     allowed_sources: vec!["10.0.0.0/8".into()],
//!     min_severity: 4,
//!     exclude_substrings: vec!["DEBUG".into()],
//! })
//! .unwrap();
//!
//! let addr = "10.1.2.3:40000".parse().unwrap();
//! assert!(filter.should_accept("<3>disk failing", addr));
//! assert!(!filter.should_accept("<3>DEBUG trace", addr));
//! ```

mod engine;
mod severity;

pub use engine::{FilterError, FilterOptions, MessageFilter};
pub use severity::{severity_of, DEFAULT_SEVERITY};
