use sea_orm::{DbErr, SqlErr};

/// Storage-level rule a rejected write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl ConstraintKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
            Self::NotNull => "not null",
        }
    }
}

/// Classify a database error as a constraint violation, if it is one.
#[must_use]
pub fn classify_db_err(err: &DbErr) -> Option<ConstraintKind> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => return Some(ConstraintKind::Unique),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            return Some(ConstraintKind::ForeignKey);
        }
        _ => {}
    }

    // SQLite reports CHECK and NOT NULL failures only through the message text.
    let message = err.to_string();
    if message.contains("UNIQUE constraint failed") {
        Some(ConstraintKind::Unique)
    } else if message.contains("FOREIGN KEY constraint failed") {
        Some(ConstraintKind::ForeignKey)
    } else if message.contains("CHECK constraint failed") {
        Some(ConstraintKind::Check)
    } else if message.contains("NOT NULL constraint failed") {
        Some(ConstraintKind::NotNull)
    } else {
        None
    }
}

/// Walk an error chain looking for a constraint violation from the database.
#[must_use]
pub fn constraint_violation(err: &anyhow::Error) -> Option<ConstraintKind> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .find_map(classify_db_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_classifies_sqlite_messages() {
        let err = DbErr::Custom("CHECK constraint failed: category IN ('Bra')".to_string());
        assert_eq!(classify_db_err(&err), Some(ConstraintKind::Check));

        let err = DbErr::Custom("NOT NULL constraint failed: catalog.name".to_string());
        assert_eq!(classify_db_err(&err), Some(ConstraintKind::NotNull));

        let err = DbErr::Custom("UNIQUE constraint failed: users.username".to_string());
        assert_eq!(classify_db_err(&err), Some(ConstraintKind::Unique));

        let err = DbErr::Custom("connection reset".to_string());
        assert_eq!(classify_db_err(&err), None);
    }

    #[test]
    fn test_finds_db_error_under_context() {
        let err: anyhow::Result<()> =
            Err(DbErr::Custom("UNIQUE constraint failed: users.email".to_string()).into());
        let err = err.context("Failed to insert user").unwrap_err();

        assert_eq!(constraint_violation(&err), Some(ConstraintKind::Unique));
        assert_eq!(constraint_violation(&anyhow::anyhow!("plain")), None);
    }
}
