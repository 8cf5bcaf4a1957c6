//! Filter settings
//!
//! The `[filter]` section as it appears on disk. Normalization folds the
//! enabled flag and out-of-range values into a shape the filter engine can
//! rely on.

use serde::Deserialize;

/// Least urgent severity code; also the fallback for out-of-range settings
const SEVERITY_FLOOR: i64 = 7;

/// Message filter settings
///
/// # Example
///
/// ```toml
/// [filter]
/// enabled = true
/// allowed_sources = ["10.0.0.0/8", "192.168.1.5"]
/// min_severity = 4
/// exclude_substrings = ["DEBUG"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Whether filtering is active
    /// Default: false (accept everything)
    pub enabled: bool,

    /// Allowed source addresses: exact IP literals or CIDR ranges
    pub allowed_sources: Vec<String>,

    /// Highest severity code still accepted (0 = emergency .. 7 = debug).
    /// Values outside 0..=7 are clamped to 7 during normalization.
    pub min_severity: i64,

    /// Literal substrings that reject a message on match
    pub exclude_substrings: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_sources: Vec::new(),
            min_severity: SEVERITY_FLOOR,
            exclude_substrings: Vec::new(),
        }
    }
}

impl FilterSettings {
    /// Severity threshold as the engine consumes it, clamped to `0..=7`
    pub fn min_severity(&self) -> u8 {
        if (0..=SEVERITY_FLOOR).contains(&self.min_severity) {
            self.min_severity as u8
        } else {
            SEVERITY_FLOOR as u8
        }
    }

    /// Fold the section into its effective form.
    ///
    /// A disabled filter carries the most permissive settings; an enabled
    /// one gets its severity threshold clamped into range.
    pub(crate) fn normalize(&mut self) {
        if !self.enabled {
            self.min_severity = SEVERITY_FLOOR;
            self.allowed_sources = vec!["0.0.0.0/0".into()];
            self.exclude_substrings.clear();
        } else if !(0..=SEVERITY_FLOOR).contains(&self.min_severity) {
            self.min_severity = SEVERITY_FLOOR;
        }
    }
}
