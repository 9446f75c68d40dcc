//! field-domain
//!
//! Entidades del negocio de servicio técnico (clientes, direcciones,
//! catálogo, solicitudes, técnicos, órdenes de trabajo y garantías) junto con
//! la validación de los payloads de entrada. No conoce la base de datos: las
//! capas `field-core` y `field-persistence` consumen estos tipos.
pub mod address;
pub mod catalog;
pub mod customer;
pub mod error;
pub mod request;
pub mod staff;
pub mod warranty;
pub mod workorder;

pub use address::{Address, AddressInput};
pub use catalog::{NewService, Service, ServiceType};
pub use customer::{Customer, CustomerInput};
pub use error::DomainError;
pub use request::{parse_requested_at, RequestDraft, ServiceRequest, ServiceRequestPayload};
pub use staff::{Employee, Technician, WorkAssignment};
pub use warranty::{NewWarrantyClaim, Warranty, WarrantyClaim, WarrantyLookup};
pub use workorder::{parse_bool, parse_scheduled_date, NewWorkorder, Workorder, WorkorderPatch, WorkorderPayload};

/// Recorta espacios y rechaza cadenas vacías para campos obligatorios.
pub(crate) fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
