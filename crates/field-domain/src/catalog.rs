//! Catálogo de servicios ofrecidos. Los precios se guardan en centavos para
//! evitar aritmética flotante sobre dinero.
use serde::{Deserialize, Serialize};

use crate::{required, DomainError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
}

/// Entrada del catálogo. `category` es el nombre del `ServiceType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: Option<i32>,
    pub description: Option<String>,
}

impl NewService {
    pub fn validate(&self) -> Result<Self, DomainError> {
        if self.price_cents < 0 {
            return Err(DomainError::ValidationError("price must not be negative".into()));
        }
        if matches!(self.duration_minutes, Some(d) if d <= 0) {
            return Err(DomainError::ValidationError("duration must be positive".into()));
        }
        let description = self.description
                              .as_deref()
                              .map(str::trim)
                              .filter(|d| !d.is_empty())
                              .map(str::to_string);
        Ok(Self { name: required("name", &self.name)?,
                  category: required("category", &self.category)?,
                  price_cents: self.price_cents,
                  duration_minutes: self.duration_minutes,
                  description })
    }
}
