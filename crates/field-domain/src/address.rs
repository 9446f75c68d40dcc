use serde::{Deserialize, Serialize};

use crate::{required, DomainError};

/// Dirección de servicio. Se crea una nueva por cada solicitud (sin dedup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub customer_id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(alias = "address")]
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(alias = "zip_code", alias = "zipCode")]
    pub zip: String,
}

impl AddressInput {
    pub fn new(street: &str, city: &str, state: &str, zip: &str) -> Self {
        Self { street: street.to_string(),
               city: city.to_string(),
               state: state.to_string(),
               zip: zip.to_string() }
    }

    pub fn validate(&self) -> Result<Self, DomainError> {
        Ok(Self { street: required("street", &self.street)?,
                  city: required("city", &self.city)?,
                  state: required("state", &self.state)?,
                  zip: required("zip", &self.zip)? })
    }
}
