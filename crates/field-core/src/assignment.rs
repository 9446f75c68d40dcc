//! Assignment Resolver: decide qué técnico atiende una solicitud recién creada.
//!
//! Paso A: si la solicitud ya tiene asignaciones, manda la más reciente (mayor
//! id de asignación).
//! Paso B (solo si A no encontró nada): balanceo de carga por día. Se elige al
//! empleado con menos trabajos en la misma fecha calendario (UTC) que la
//! solicitud; empate por menor id. Sin empleados la solicitud queda sin
//! asignar.
//!
//! La decisión es una función del estado actual de la base: recalcularla
//! siempre inspecciona filas vigentes, nunca un valor cacheado.

use field_domain::{ServiceRequest, Technician};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::store::{DispatchTx, EmployeeLoad};

/// Qué hacer con el técnico elegido por el balanceo de carga.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPolicy {
    /// Solo recomendar; no se escribe `WorkAssignment`.
    #[default]
    RecommendOnly,
    /// Escribir la asignación en la misma transacción para que sea estable.
    PersistFallback,
}

/// Origen de la decisión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Existing,
    Fallback,
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub technician: Option<Technician>,
    pub source: AssignmentSource,
}

/// Paso A.
pub fn existing_assignment(tx: &mut dyn DispatchTx, request_id: i64) -> Result<Option<Technician>, CoreError> {
    Ok(tx.latest_assignment(request_id)?.map(Technician::from))
}

/// Paso B. Devuelve la carga elegida (empleado + conteo) o `None`.
pub fn fallback_selection(tx: &mut dyn DispatchTx, request: &ServiceRequest) -> Result<Option<EmployeeLoad>, CoreError> {
    let day = request.requested_at.date_naive();
    let loads = tx.same_day_loads(request.id, day)?;
    debug!("fallback_selection request_id={} day={day} candidates={}",
           request.id,
           loads.len());
    Ok(pick_least_loaded(&loads).cloned())
}

/// Regla de orden del balanceo: (trabajos del día ASC, id ASC).
pub fn pick_least_loaded(loads: &[EmployeeLoad]) -> Option<&EmployeeLoad> {
    loads.iter().min_by_key(|l| (l.same_day_jobs, l.employee.id))
}

/// Resuelve la asignación completa (A y luego B) según `policy`.
pub fn resolve_assignment(tx: &mut dyn DispatchTx,
                          request: &ServiceRequest,
                          policy: AssignmentPolicy)
                          -> Result<AssignmentDecision, CoreError> {
    if let Some(technician) = existing_assignment(tx, request.id)? {
        info!("assignment request_id={} technician={} source=existing",
              request.id,
              technician.employee_id);
        return Ok(AssignmentDecision { technician: Some(technician),
                                       source: AssignmentSource::Existing });
    }
    let Some(pick) = fallback_selection(tx, request)? else {
        info!("assignment request_id={} no employees: unassigned", request.id);
        return Ok(AssignmentDecision { technician: None,
                                       source: AssignmentSource::Unassigned });
    };
    if policy == AssignmentPolicy::PersistFallback {
        let assignment_id = tx.insert_assignment(request.id, pick.employee.id)?;
        debug!("assignment persisted request_id={} assignment_id={assignment_id}", request.id);
    }
    info!("assignment request_id={} technician={} same_day_jobs={} source=fallback",
          request.id,
          pick.employee.id,
          pick.same_day_jobs);
    Ok(AssignmentDecision { technician: Some(Technician::from(pick.employee)),
                            source: AssignmentSource::Fallback })
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_domain::Employee;

    fn load(id: i64, jobs: i64) -> EmployeeLoad {
        EmployeeLoad { employee: Employee { id,
                                            first_name: format!("e{id}"),
                                            last_name: "tech".into(),
                                            phone: "555".into(),
                                            email: format!("e{id}@shop.test") },
                       same_day_jobs: jobs }
    }

    #[test]
    fn least_loaded_wins_over_lower_id() {
        let loads = vec![load(3, 2), load(7, 1)];
        assert_eq!(pick_least_loaded(&loads).map(|l| l.employee.id), Some(7));
    }

    #[test]
    fn ties_break_by_lowest_id_regardless_of_input_order() {
        let loads = vec![load(7, 0), load(3, 0), load(9, 0)];
        assert_eq!(pick_least_loaded(&loads).map(|l| l.employee.id), Some(3));
    }

    #[test]
    fn empty_candidates_pick_nobody() {
        assert!(pick_least_loaded(&[]).is_none());
    }
}
