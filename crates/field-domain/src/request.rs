//! Solicitudes de servicio (citas) y el payload compuesto que las origina.
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AddressInput, CustomerInput, DomainError};

/// Formatos aceptados sin zona horaria; se interpretan como UTC.
const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Fila de `ServiceRequest`: una por cita solicitada, inmutable tras crearse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: i64,
    pub customer_id: i64,
    pub address_id: i64,
    pub service_id: i64,
    pub description: String,
    pub requested_at: DateTime<Utc>,
}

/// Payload de entrada de la operación compuesta, antes de validar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestPayload {
    pub customer: CustomerInput,
    pub address: AddressInput,
    pub service_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "preferredDatetime", alias = "preferred_datetime")]
    pub requested_at: String,
}

/// Payload validado: todos los campos normalizados y la fecha ya parseada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub customer: CustomerInput,
    pub address: AddressInput,
    pub service_id: i64,
    pub description: String,
    pub requested_at: DateTime<Utc>,
}

impl ServiceRequestPayload {
    pub fn validate(&self) -> Result<RequestDraft, DomainError> {
        let customer = self.customer.validate()?;
        let address = self.address.validate()?;
        if self.service_id <= 0 {
            return Err(DomainError::ValidationError(format!("serviceId must be positive, got {}", self.service_id)));
        }
        let requested_at = parse_requested_at(&self.requested_at)?;
        Ok(RequestDraft { customer,
                          address,
                          service_id: self.service_id,
                          description: self.description.trim().to_string(),
                          requested_at })
    }
}

/// Parsea la fecha/hora solicitada. Acepta RFC 3339 o una forma local
/// (`YYYY-MM-DDTHH:MM[:SS]`, como envía un `<input type="datetime-local">`).
pub fn parse_requested_at(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::ValidationError("requestedAt is required".into()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS.iter()
                 .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                 .map(|naive| naive.and_utc())
                 .ok_or_else(|| DomainError::ValidationError(format!("requestedAt '{raw}' is not a valid date-time")))
}
