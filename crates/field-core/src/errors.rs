//! Taxonomía de errores de la operación de despacho.

use field_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    /// Payload inválido; se rechaza antes de tocar la base de datos.
    #[error("validation: {0}")] Validation(String),
    /// Referencia a una fila inexistente (p. ej. `serviceId`).
    #[error("not found: {0}")] NotFound(String),
    #[error("conflict: {0}")] Conflict(String),
    /// Cualquier otro fallo del almacenamiento; la transacción se revierte.
    #[error("storage: {0}")] Storage(String),
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ValidationError(msg) => CoreError::Validation(msg),
        }
    }
}

/// Clase de error expuesta a capas externas (CLI/HTTP) para elegir código de salida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Missing,
    Server,
}

pub fn classify_error(e: &CoreError) -> ErrorClass {
    match e {
        CoreError::Validation(_) => ErrorClass::Client,
        CoreError::NotFound(_) | CoreError::Conflict(_) => ErrorClass::Missing,
        CoreError::Storage(_) => ErrorClass::Server,
    }
}
