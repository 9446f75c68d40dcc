//! Garantías: consulta por email y/o teléfono del cliente y solicitudes de
//! servicio abiertas contra una garantía.

use chrono::NaiveDate;
use diesel::prelude::*;
use field_core::CoreError;
use field_domain::{Warranty, WarrantyClaim, WarrantyLookup};
use log::{debug, info};

use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::{customer, warranties, warranty_service_requests};

pub const CLAIM_STATUS_PENDING: &str = "pending";

#[derive(Queryable, Debug)]
struct WarrantyRow {
    id: i64,
    customer_id: i64,
    work_order_id: Option<i64>,
    service_name: String,
    service_type: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    coverage: Option<String>,
    notes: Option<String>,
}

impl From<WarrantyRow> for Warranty {
    fn from(r: WarrantyRow) -> Self {
        Warranty { id: r.id,
                   customer_id: r.customer_id,
                   work_order_id: r.work_order_id,
                   service_name: r.service_name,
                   service_type: r.service_type,
                   start_date: r.start_date,
                   end_date: r.end_date,
                   coverage: r.coverage,
                   notes: r.notes }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = warranty_service_requests)]
struct NewClaimRow<'a> {
    warranty_id: i64,
    work_order_id: i64,
    customer_email: Option<&'a str>,
    customer_phone: Option<&'a str>,
    issue_type: &'a str,
    urgency: &'a str,
    problem_description: &'a str,
    status: &'a str,
}

pub struct PgWarranties<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgWarranties<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Garantías del cliente identificado por email, teléfono o ambos (ambos
    /// deben coincidir si se dan los dos). Más recientes primero.
    pub fn lookup(&self, criteria: &WarrantyLookup) -> Result<Vec<Warranty>, CoreError> {
        let criteria = criteria.validate()?;
        let rows: Vec<WarrantyRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             let mut query = warranties::table.inner_join(customer::table)
                                                              .select(warranties::all_columns)
                                                              .into_boxed();
                             if let Some(email) = &criteria.email {
                                 query = query.filter(customer::email.eq(email.clone()));
                             }
                             if let Some(phone) = &criteria.phone {
                                 query = query.filter(customer::phone.eq(phone.clone()));
                             }
                             query.order((warranties::start_date.desc().nulls_last(), warranties::id.desc()))
                                  .load(conn)
                                  .map_err(PersistenceError::from)
                         })
        })?;
        debug!("warranty lookup email={:?} phone={:?} count={}",
               criteria.email,
               criteria.phone,
               rows.len());
        Ok(rows.into_iter().map(Warranty::from).collect())
    }

    pub fn get(&self, warranty_id: i64) -> Result<Option<Warranty>, CoreError> {
        let row: Option<WarrantyRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             warranties::table.find(warranty_id)
                                              .first(conn)
                                              .optional()
                                              .map_err(PersistenceError::from)
                         })
        })?;
        Ok(row.map(Warranty::from))
    }

    /// Abre una solicitud de servicio `pending` contra la garantía y devuelve
    /// su id. Garantía u orden inexistentes dan `NotFound`.
    pub fn request_service(&self, claim: &WarrantyClaim) -> Result<i64, CoreError> {
        let claim = claim.validate()?;
        let row = NewClaimRow { warranty_id: claim.warranty_id,
                                work_order_id: claim.work_order_id,
                                customer_email: claim.email.as_deref(),
                                customer_phone: claim.phone.as_deref(),
                                issue_type: &claim.issue_type,
                                urgency: &claim.urgency,
                                problem_description: &claim.problem_description,
                                status: CLAIM_STATUS_PENDING };
        let id: i64 = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     diesel::insert_into(warranty_service_requests::table).values(&row)
                                                                                          .returning(warranty_service_requests::id)
                                                                                          .get_result(tx)
                                                                                          .map_err(PersistenceError::from)
                                 })
                         })
        }).map_err(|e| match e {
              PersistenceError::ForeignKeyViolation(_) => CoreError::NotFound("Invalid warrantyId or workOrderId".into()),
              other => CoreError::from(other),
          })?;
        info!("warranty service request id={id} warranty_id={} work_order_id={} urgency={}",
              claim.warranty_id,
              claim.work_order_id,
              claim.urgency);
        Ok(id)
    }
}
