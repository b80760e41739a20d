use vigilo_common::pattern::PatternError;
use vigilo_common::validation::ValidationError;
use vigilo_storage::StorageError;

/// Domain-level outcome of a failed rule operation.
///
/// Storage constraint codes are already classified by the store; this type
/// only names the business outcome. `UpdateFailed` and `Unexpected` keep the
/// underlying cause for logs but display opaquely.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(PatternError),

    #[error("invalid level {0}")]
    InvalidLevel(i32),

    #[error("rule comment is required")]
    MissingComment,

    #[error("rule has no alerting condition")]
    NoCondition,

    #[error("invalid project id")]
    InvalidProjectId,

    #[error("project not found")]
    ProjectNotFound,

    #[error("rule not found")]
    RuleNotFound,

    #[error("rule pattern already exists")]
    DuplicatePattern,

    #[error("project name already exists")]
    DuplicateProjectName,

    #[error("required field missing")]
    RequiredFieldMissing,

    #[error("primary key conflict")]
    PrimaryKeyConflict,

    #[error("failed to update rule")]
    UpdateFailed(#[source] StorageError),

    #[error("unexpected error")]
    Unexpected(#[source] StorageError),
}

impl RuleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::BadRequest(_) => "bad_request",
            RuleError::InvalidPattern(_) => "invalid_pattern",
            RuleError::InvalidLevel(_) => "invalid_level",
            RuleError::MissingComment => "missing_comment",
            RuleError::NoCondition => "no_condition",
            RuleError::InvalidProjectId => "invalid_project_id",
            RuleError::ProjectNotFound => "project_not_found",
            RuleError::RuleNotFound => "rule_not_found",
            RuleError::DuplicatePattern => "duplicate_pattern",
            RuleError::DuplicateProjectName => "duplicate_project_name",
            RuleError::RequiredFieldMissing => "required_field_missing",
            RuleError::PrimaryKeyConflict => "primary_key_conflict",
            RuleError::UpdateFailed(_) => "update_failed",
            RuleError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ValidationError> for RuleError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidPattern(e) => RuleError::InvalidPattern(e),
            ValidationError::InvalidLevel(level) => RuleError::InvalidLevel(level),
            ValidationError::MissingComment => RuleError::MissingComment,
            ValidationError::InvalidProjectId(_) => RuleError::InvalidProjectId,
            ValidationError::NoCondition => RuleError::NoCondition,
        }
    }
}
