use serde::{Deserialize, Serialize};

use crate::{required, DomainError};

/// Cliente persistido. El email es la clave única de búsqueda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

/// Datos de cliente tal como llegan en una solicitud de cita.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(alias = "firstname")]
    pub first_name: String,
    #[serde(alias = "lastname")]
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl CustomerInput {
    pub fn new(first_name: &str, last_name: &str, phone: &str, email: &str) -> Self {
        Self { first_name: first_name.to_string(),
               last_name: last_name.to_string(),
               phone: phone.to_string(),
               email: email.to_string() }
    }

    /// Valida y normaliza. El email se recorta y pasa a minúsculas para que
    /// la deduplicación no dependa de mayúsculas.
    pub fn validate(&self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        Ok(Self { first_name: required("firstName", &self.first_name)?,
                  last_name: required("lastName", &self.last_name)?,
                  phone: required("phone", &self.phone)?,
                  email })
    }
}

/// Normaliza un email y verifica una forma mínima `local@dominio`.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = required("email", raw)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(DomainError::ValidationError(format!("email '{email}' is malformed"))),
    }
}
