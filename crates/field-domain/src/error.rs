use thiserror::Error;

/// Error del dominio: validaciones de payload previas a cualquier acceso a
/// base de datos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
}
