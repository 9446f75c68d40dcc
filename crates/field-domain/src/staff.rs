use serde::{Deserialize, Serialize};

/// Empleado (técnico). Solo lectura para el flujo de solicitudes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

/// Vínculo solicitud -> empleado. La fila con mayor `id` es la vigente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkAssignment {
    pub id: i64,
    pub request_id: i64,
    pub employee_id: i64,
}

/// Técnico presentado al cliente como resultado de la asignación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl From<Employee> for Technician {
    fn from(e: Employee) -> Self {
        Self { employee_id: e.id,
               first_name: e.first_name,
               last_name: e.last_name,
               phone: e.phone,
               email: e.email }
    }
}
