//! Pasos de alta previos a la asignación: cliente, dirección y solicitud.
//! Cada paso corre sobre el `DispatchTx` abierto por el servicio.

use field_domain::{AddressInput, CustomerInput, ServiceRequest};
use log::debug;

use crate::errors::CoreError;
use crate::store::{CustomerResolution, DispatchTx, NewServiceRequest};

/// Customer Resolver: devuelve el id existente para el email o crea el
/// cliente. Nombre y teléfono distintos de un cliente existente se ignoran.
pub fn resolve_customer(tx: &mut dyn DispatchTx, input: &CustomerInput) -> Result<CustomerResolution, CoreError> {
    let resolution = tx.resolve_customer(input)?;
    debug!("resolve_customer email={} customer_id={} created={}",
           input.email,
           resolution.customer_id,
           resolution.created);
    Ok(resolution)
}

/// Address Recorder.
pub fn record_address(tx: &mut dyn DispatchTx, customer_id: i64, input: &AddressInput) -> Result<i64, CoreError> {
    let address_id = tx.record_address(customer_id, input)?;
    debug!("record_address customer_id={customer_id} address_id={address_id}");
    Ok(address_id)
}

/// Request Creator.
pub fn create_request(tx: &mut dyn DispatchTx, new: &NewServiceRequest) -> Result<ServiceRequest, CoreError> {
    let request = tx.create_request(new)?;
    debug!("create_request request_id={} service_id={} requested_at={}",
           request.id,
           request.service_id,
           request.requested_at);
    Ok(request)
}
