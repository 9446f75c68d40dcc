//! Órdenes de trabajo: validación del payload de alta y del parche de
//! actualización. El identificador lo provee quien crea la orden.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workorder {
    pub workorder_id: i64,
    pub request_id: i64,
    pub customer_id: i64,
    pub scheduled_date: NaiveDate,
    pub is_completed: bool,
}

/// Payload crudo. Acepta camelCase y snake_case; todos los campos son
/// obligatorios, pero se validan juntos para reportar cuáles faltan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkorderPayload {
    #[serde(alias = "workorder_id")]
    pub workorder_id: Option<i64>,
    #[serde(alias = "request_id")]
    pub request_id: Option<i64>,
    #[serde(alias = "customer_id")]
    pub customer_id: Option<i64>,
    #[serde(alias = "scheduled_date")]
    pub scheduled_date: Option<String>,
    #[serde(alias = "is_completed")]
    pub is_completed: Option<Value>,
}

/// Orden lista para insertar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkorder {
    pub workorder_id: i64,
    pub request_id: i64,
    pub customer_id: i64,
    pub scheduled_date: NaiveDate,
    pub is_completed: bool,
}

impl WorkorderPayload {
    pub fn validate(&self) -> Result<NewWorkorder, DomainError> {
        let missing: Vec<&str> = [("workorderId", self.workorder_id.is_none()),
                                  ("requestId", self.request_id.is_none()),
                                  ("customerId", self.customer_id.is_none()),
                                  ("scheduledDate", self.scheduled_date.is_none()),
                                  ("isCompleted", self.is_completed.is_none())].into_iter()
                                                                               .filter(|(_, absent)| *absent)
                                                                               .map(|(name, _)| name)
                                                                               .collect();
        if !missing.is_empty() {
            return Err(DomainError::ValidationError(format!("Missing required fields: {}", missing.join(", "))));
        }
        let (Some(workorder_id), Some(request_id), Some(customer_id), Some(date)) =
            (self.workorder_id, self.request_id, self.customer_id, self.scheduled_date.as_deref())
        else {
            return Err(DomainError::ValidationError("Missing required fields".into()));
        };
        Ok(NewWorkorder { workorder_id,
                          request_id,
                          customer_id,
                          scheduled_date: parse_scheduled_date(date)?,
                          is_completed: parse_bool(self.is_completed.as_ref(), false) })
    }
}

/// Cambios parciales sobre una orden existente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkorderPatch {
    pub request_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
}

impl WorkorderPatch {
    pub fn is_empty(&self) -> bool {
        self.request_id.is_none() && self.customer_id.is_none() && self.scheduled_date.is_none() && self.is_completed.is_none()
    }
}

/// Interpreta booleanos laxos: `true`, `1`, `"t"`, `"yes"`, `"y"`...
/// `None`/`null` devuelve `default`.
pub fn parse_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v == 1.0),
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "t" | "yes" | "y"),
        Some(_) => false,
    }
}

/// Fecha programada en formato estricto `YYYY-MM-DD`.
pub fn parse_scheduled_date(raw: &str) -> Result<NaiveDate, DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::ValidationError("scheduledDate is required (YYYY-MM-DD)".into()));
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::ValidationError("scheduledDate must be in 'YYYY-MM-DD' format".into()))
}
