//! Priority-tag severity extraction
//!
//! Syslog messages may start with a `<N>` priority tag. Only the severity
//! threshold check needs it, and only a narrow scan is performed: the full
//! priority value (facility * 8 + severity) is not decoded.

/// Severity used when no usable tag is present (7 = debug, least urgent)
pub const DEFAULT_SEVERITY: u8 = 7;

/// Extract the severity code from a leading `<N>` priority tag.
///
/// The message must start with `<` and the first `>` must sit at byte index
/// 1 through 4. Only the first character of the tag content is inspected:
/// `0`..`7` map to that digit, everything else (missing tag, `>` out of
/// range, empty tag, non-digit) falls back to [`DEFAULT_SEVERITY`].
///
/// Note this reads the tag's first digit rather than decoding the priority
/// value, so `<13>` yields severity 1, not `13 % 8 = 5`.
pub fn severity_of(message: &str) -> u8 {
    let bytes = message.as_bytes();

    if bytes.first() != Some(&b'<') {
        return DEFAULT_SEVERITY;
    }

    // First '>' must appear within the first five bytes.
    let end = match bytes.iter().take(5).position(|&b| b == b'>') {
        Some(end) => end,
        None => return DEFAULT_SEVERITY,
    };

    match bytes[1..end].first() {
        Some(c @ b'0'..=b'7') => c - b'0',
        _ => DEFAULT_SEVERITY,
    }
}

#[cfg(test)]
#[path = "severity_test.rs"]
mod severity_test;
