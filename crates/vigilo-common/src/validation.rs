//! Field validation for rule create and edit requests.
//!
//! Checks are pure and run before any store access. The first failing check
//! is reported: pattern, comment, project id (create only), condition, level.

use crate::pattern::{self, PatternError};
use crate::types::{RuleFields, RuleLevel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("invalid level {0}, expected 0..=2")]
    InvalidLevel(i32),

    #[error("rule comment is required")]
    MissingComment,

    #[error("invalid project id {0}")]
    InvalidProjectId(i64),

    #[error("rule has no alerting condition")]
    NoCondition,
}

pub fn validate_pattern(pattern: &str) -> Result<(), ValidationError> {
    pattern::validate(pattern).map_err(ValidationError::from)
}

pub fn validate_level(level: i32) -> Result<RuleLevel, ValidationError> {
    RuleLevel::try_from(level).map_err(|_| ValidationError::InvalidLevel(level))
}

/// Validates a create request and returns the parsed level.
///
/// # Examples
///
/// ```
/// use vigilo_common::types::{RuleFields, RuleLevel};
/// use vigilo_common::validation::{validate_create, ValidationError};
///
/// let mut fields = RuleFields {
///     pattern: "svc.*.latency".into(),
///     comment: "api latency".into(),
///     trend_up: true,
///     ..Default::default()
/// };
/// assert_eq!(validate_create(1, &fields), Ok(RuleLevel::Low));
///
/// fields.trend_up = false;
/// assert_eq!(validate_create(1, &fields), Err(ValidationError::NoCondition));
/// ```
pub fn validate_create(project_id: i64, fields: &RuleFields) -> Result<RuleLevel, ValidationError> {
    validate_pattern(&fields.pattern)?;
    validate_comment(&fields.comment)?;
    if project_id <= 0 {
        return Err(ValidationError::InvalidProjectId(project_id));
    }
    validate_condition(fields)?;
    validate_level(fields.level)
}

/// Validates an edit request. The project is immutable so it is not checked.
pub fn validate_edit(fields: &RuleFields) -> Result<RuleLevel, ValidationError> {
    validate_pattern(&fields.pattern)?;
    validate_comment(&fields.comment)?;
    validate_condition(fields)?;
    validate_level(fields.level)
}

fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.is_empty() {
        return Err(ValidationError::MissingComment);
    }
    Ok(())
}

fn validate_condition(fields: &RuleFields) -> Result<(), ValidationError> {
    if !fields.has_condition() {
        return Err(ValidationError::NoCondition);
    }
    Ok(())
}
