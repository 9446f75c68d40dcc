//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas y luego a la
//! taxonomía `CoreError` del despacho.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use field_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection error: {0}")]
    TransientIo(String),
    #[error("configuration error: {0}")]
    Config(String),
    /// La unidad de trabajo abortó con un error de negocio; la transacción se
    /// revirtió.
    #[error("{0}")]
    Rejected(CoreError),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Unknown(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::AlreadyInTransaction => Self::Unknown("already in transaction".into()),
            DieselError::RollbackErrorOnCommit { rollback_error, commit_error } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::QueryBuilderError(e) => Self::Unknown(format!("query builder: {e}")),
            DieselError::RollbackTransaction => Self::Unknown("rollback transaction".into()),
            DieselError::NotInTransaction => Self::Unknown("not in transaction".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<CoreError> for PersistenceError {
    fn from(e: CoreError) -> Self {
        Self::Rejected(e)
    }
}

impl From<PersistenceError> for CoreError {
    fn from(e: PersistenceError) -> Self {
        match e {
            PersistenceError::Rejected(inner) => inner,
            PersistenceError::NotFound => CoreError::NotFound("row not found".into()),
            PersistenceError::ForeignKeyViolation(msg) => CoreError::NotFound(msg),
            PersistenceError::UniqueViolation(msg) => CoreError::Conflict(msg),
            PersistenceError::CheckViolation(msg) => CoreError::Validation(msg),
            other => CoreError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_unwraps_to_wrapped_core_error() {
        let e = PersistenceError::Rejected(CoreError::Validation("bad".into()));
        assert_eq!(CoreError::from(e), CoreError::Validation("bad".into()));
    }

    #[test]
    fn constraint_violations_map_to_client_errors() {
        assert!(matches!(CoreError::from(PersistenceError::ForeignKeyViolation("fk".into())), CoreError::NotFound(_)));
        assert!(matches!(CoreError::from(PersistenceError::UniqueViolation("uq".into())), CoreError::Conflict(_)));
        assert!(matches!(CoreError::from(PersistenceError::TransientIo("io".into())), CoreError::Storage(_)));
    }

    #[test]
    fn diesel_not_found_maps() {
        assert!(matches!(PersistenceError::from(DieselError::NotFound), PersistenceError::NotFound));
    }
}
