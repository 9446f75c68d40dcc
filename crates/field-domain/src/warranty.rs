use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
    pub id: i64,
    pub customer_id: i64,
    pub work_order_id: Option<i64>,
    pub service_name: String,
    pub service_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub coverage: Option<String>,
    pub notes: Option<String>,
}

/// Criterio de búsqueda de garantías: email, teléfono o ambos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyLookup {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl WarrantyLookup {
    /// Descarta valores vacíos y exige al menos un identificador.
    pub fn validate(&self) -> Result<Self, DomainError> {
        let clean = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let email = clean(&self.email).map(|e| e.to_lowercase());
        let phone = clean(&self.phone);
        if email.is_none() && phone.is_none() {
            return Err(DomainError::ValidationError("Email or phone number required".into()));
        }
        Ok(Self { email, phone })
    }
}

/// Solicitud de servicio bajo garantía, tal como llega del cliente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClaim {
    #[serde(default, alias = "warranty_id")]
    pub warranty_id: Option<i64>,
    #[serde(default, alias = "work_order_id")]
    pub work_order_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "issue_type")]
    pub issue_type: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default, alias = "problem_description")]
    pub problem_description: String,
}

/// Solicitud validada; se guarda con estado `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWarrantyClaim {
    pub warranty_id: i64,
    pub work_order_id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub issue_type: String,
    pub urgency: String,
    pub problem_description: String,
}

impl WarrantyClaim {
    pub fn validate(&self) -> Result<NewWarrantyClaim, DomainError> {
        let (Some(warranty_id), Some(work_order_id)) =
            (self.warranty_id.filter(|id| *id > 0), self.work_order_id.filter(|id| *id > 0))
        else {
            return Err(DomainError::ValidationError("Warranty ID and Work Order ID required".into()));
        };
        let issue_type = self.issue_type.trim();
        let urgency = self.urgency.trim();
        if issue_type.is_empty() || urgency.is_empty() {
            return Err(DomainError::ValidationError("Issue type and urgency are required".into()));
        }
        let problem_description = self.problem_description.trim();
        if problem_description.is_empty() {
            return Err(DomainError::ValidationError("Problem description is required".into()));
        }
        let contact = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(NewWarrantyClaim { warranty_id,
                              work_order_id,
                              email: contact(&self.email).map(|e| e.to_lowercase()),
                              phone: contact(&self.phone),
                              issue_type: issue_type.to_string(),
                              urgency: urgency.to_string(),
                              problem_description: problem_description.to_string() })
    }
}
