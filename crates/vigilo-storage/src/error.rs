pub use sea_orm::DbErr;
use sea_orm::SqlErr;

/// Errors returned by the rule store.
///
/// Constraint violations are classified here, at the store boundary, so
/// callers never match on engine-specific codes.
///
/// # Examples
///
/// ```rust
/// use vigilo_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "rule",
///     id: 99,
/// };
/// assert!(err.to_string().contains("rule"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// An insert was rejected by a schema constraint.
    #[error("Storage: {kind} constraint violated: {source}")]
    Constraint {
        kind: Constraint,
        #[source]
        source: DbErr,
    },

    /// An update of an existing row failed for a reason other than the row
    /// being gone.
    #[error("Storage: update failed: {0}")]
    UpdateFailed(#[source] DbErr),

    /// Any other database error.
    #[error("Storage: database error: {0}")]
    Database(#[from] DbErr),

    /// Creating the data directory failed.
    #[error("Storage: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Closed set of constraint violations the domain layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NotNull,
    Unique,
    PrimaryKey,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::NotNull => write!(f, "not-null"),
            Constraint::Unique => write!(f, "unique"),
            Constraint::PrimaryKey => write!(f, "primary-key"),
        }
    }
}

// SQLite extended result codes
const SQLITE_CONSTRAINT_NOTNULL: &str = "(code: 1299)";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "(code: 1555)";
const SQLITE_CONSTRAINT_UNIQUE: &str = "(code: 2067)";

/// Maps a database error to a constraint kind, if it is one.
///
/// SQLite reports primary-key collisions with a `UNIQUE constraint failed`
/// message, so the extended code is checked before the message text.
///
/// # Examples
///
/// ```rust
/// use sea_orm::DbErr;
/// use vigilo_storage::error::{classify, Constraint};
///
/// let err = DbErr::Custom("(code: 2067) UNIQUE constraint failed: rules.pattern".into());
/// assert_eq!(classify(&err), Some(Constraint::Unique));
/// assert_eq!(classify(&DbErr::Custom("disk I/O error".into())), None);
/// ```
pub fn classify(err: &DbErr) -> Option<Constraint> {
    let msg = err.to_string();
    if msg.contains(SQLITE_CONSTRAINT_NOTNULL) || msg.contains("NOT NULL constraint failed") {
        return Some(Constraint::NotNull);
    }
    if msg.contains(SQLITE_CONSTRAINT_PRIMARYKEY) {
        return Some(Constraint::PrimaryKey);
    }
    if msg.contains(SQLITE_CONSTRAINT_UNIQUE)
        || msg.contains("UNIQUE constraint failed")
        || matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    {
        return Some(Constraint::Unique);
    }
    None
}

impl StorageError {
    /// Wraps an insert error, classifying constraint violations.
    pub fn from_insert(err: DbErr) -> Self {
        match classify(&err) {
            Some(kind) => StorageError::Constraint { kind, source: err },
            None => StorageError::Database(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            StorageError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
