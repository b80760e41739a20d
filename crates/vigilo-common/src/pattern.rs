//! Metric-name pattern syntax.
//!
//! Metric names are dot-separated segments (`svc.api.latency`). A pattern
//! has the same shape, and any segment may contain `*` wildcards that match
//! a run of characters inside that one segment. `svc.*.latency` therefore
//! matches `svc.api.latency` but not `svc.api.v2.latency`.

/// Longest accepted pattern, in bytes.
pub const MAX_PATTERN_LEN: usize = 256;

/// Why a pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern is {0} bytes long, at most {max} allowed", max = MAX_PATTERN_LEN)]
    TooLong(usize),

    #[error("pattern contains invalid character '{0}'")]
    InvalidChar(char),

    #[error("pattern contains an empty segment")]
    EmptySegment,

    #[error("pattern matches every metric")]
    OnlyWildcards,
}

/// Checks pattern syntax.
///
/// # Examples
///
/// ```
/// use vigilo_common::pattern::{validate, PatternError};
///
/// assert!(validate("svc.*.latency").is_ok());
/// assert_eq!(validate("svc..latency"), Err(PatternError::EmptySegment));
/// assert_eq!(validate("*.*"), Err(PatternError::OnlyWildcards));
/// ```
pub fn validate(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong(pattern.len()));
    }
    if let Some(c) = pattern.chars().find(|c| !is_pattern_char(*c)) {
        return Err(PatternError::InvalidChar(c));
    }
    if pattern.split('.').any(str::is_empty) {
        return Err(PatternError::EmptySegment);
    }
    if pattern.split('.').all(|seg| seg.chars().all(|c| c == '*')) {
        return Err(PatternError::OnlyWildcards);
    }
    Ok(())
}

fn is_pattern_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '*')
}

/// Returns true when `name` matches `pattern` segment by segment.
pub fn matches(pattern: &str, name: &str) -> bool {
    let mut pattern_segs = pattern.split('.');
    let mut name_segs = name.split('.');
    loop {
        match (pattern_segs.next(), name_segs.next()) {
            (Some(p), Some(n)) => {
                if p != n && !glob_match::glob_match(p, n) {
                    return false;
                }
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}
