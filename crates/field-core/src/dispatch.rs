//! Operación compuesta: alta de solicitud de servicio con asignación de técnico.

use field_domain::{ServiceRequestPayload, Technician};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assignment::{resolve_assignment, AssignmentPolicy, AssignmentSource};
use crate::errors::CoreError;
use crate::intake::{create_request, record_address, resolve_customer};
use crate::store::{DispatchStore, NewServiceRequest};

/// Resultado de `create_service_request_with_assignment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub request_id: i64,
    pub customer_id: i64,
    pub address_id: i64,
    pub service_id: i64,
    pub technician: Option<Technician>,
    pub customer_created: bool,
    pub assignment_source: AssignmentSource,
}

/// Servicio de despacho sobre un `DispatchStore` inyectado.
pub struct DispatchService<S: DispatchStore> {
    store: S,
    policy: AssignmentPolicy,
}

impl<S: DispatchStore> DispatchService<S> {
    pub fn new(store: S) -> Self {
        Self { store,
               policy: AssignmentPolicy::default() }
    }

    pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Valida el payload y ejecuta cliente -> dirección -> solicitud ->
    /// asignación en una sola transacción. Ante cualquier error no queda
    /// ninguna fila parcial.
    pub fn create_service_request_with_assignment(&self,
                                                  payload: &ServiceRequestPayload)
                                                  -> Result<DispatchOutcome, CoreError> {
        let draft = payload.validate()?;
        let policy = self.policy;
        let outcome = self.store.in_transaction(|tx| {
                                    let customer = resolve_customer(tx, &draft.customer)?;
                                    let address_id = record_address(tx, customer.customer_id, &draft.address)?;
                                    let request = create_request(tx,
                                                                 &NewServiceRequest { customer_id: customer.customer_id,
                                                                                      address_id,
                                                                                      service_id: draft.service_id,
                                                                                      description: draft.description.clone(),
                                                                                      requested_at: draft.requested_at })?;
                                    let decision = resolve_assignment(tx, &request, policy)?;
                                    Ok(DispatchOutcome { request_id: request.id,
                                                         customer_id: request.customer_id,
                                                         address_id: request.address_id,
                                                         service_id: request.service_id,
                                                         technician: decision.technician,
                                                         customer_created: customer.created,
                                                         assignment_source: decision.source })
                                })
                                .inspect_err(|e| warn!("create_service_request rolled back email={} err={e}", draft.customer.email))?;
        info!("service request created request_id={} customer_id={} technician={:?}",
              outcome.request_id,
              outcome.customer_id,
              outcome.technician.as_ref().map(|t| t.employee_id));
        Ok(outcome)
    }
}
