//! Contratos de almacenamiento para la operación de despacho.
//!
//! `DispatchStore` abre una unidad transaccional y entrega al closure un
//! `DispatchTx` con las primitivas de lectura/escritura. Cualquier `Err`
//! devuelto por el closure revierte todo lo escrito en esa unidad.

use chrono::NaiveDate;
use field_domain::{AddressInput, CustomerInput, Employee, ServiceRequest};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Resultado de resolver un cliente por email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerResolution {
    pub customer_id: i64,
    /// `true` si la fila se insertó en esta invocación.
    pub created: bool,
}

/// Datos para insertar una `ServiceRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRequest {
    pub customer_id: i64,
    pub address_id: i64,
    pub service_id: i64,
    pub description: String,
    pub requested_at: chrono::DateTime<chrono::Utc>,
}

/// Carga del día de un empleado: cuántas otras solicitudes asignadas caen en
/// la misma fecha calendario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeLoad {
    pub employee: Employee,
    pub same_day_jobs: i64,
}

/// Primitivas disponibles dentro de una transacción.
pub trait DispatchTx {
    /// Inserta-o-reutiliza el cliente por email en una sola sentencia atómica.
    fn resolve_customer(&mut self, input: &CustomerInput) -> Result<CustomerResolution, CoreError>;
    /// Inserta una dirección nueva (sin deduplicar).
    fn record_address(&mut self, customer_id: i64, input: &AddressInput) -> Result<i64, CoreError>;
    /// Inserta la solicitud. `NotFound` si `service_id` no existe.
    fn create_request(&mut self, new: &NewServiceRequest) -> Result<ServiceRequest, CoreError>;
    /// Empleado de la asignación más reciente (mayor id) de la solicitud.
    fn latest_assignment(&mut self, request_id: i64) -> Result<Option<Employee>, CoreError>;
    /// Todos los empleados con su conteo de trabajos en `day`, excluyendo la
    /// solicitud `request_id`. Los empleados sin trabajos aparecen con 0.
    fn same_day_loads(&mut self, request_id: i64, day: NaiveDate) -> Result<Vec<EmployeeLoad>, CoreError>;
    /// Persiste una asignación y devuelve su id.
    fn insert_assignment(&mut self, request_id: i64, employee_id: i64) -> Result<i64, CoreError>;
}

/// Backend capaz de ejecutar unidades de trabajo todo-o-nada.
pub trait DispatchStore: Send + Sync {
    /// Ejecuta `f` dentro de una transacción. Si `f` devuelve `Err`, nada de lo
    /// escrito persiste. El backend puede reintentar `f` ante fallos
    /// transitorios, por eso es `FnMut`.
    fn in_transaction<T, F>(&self, f: F) -> Result<T, CoreError>
        where F: FnMut(&mut dyn DispatchTx) -> Result<T, CoreError>;
}
