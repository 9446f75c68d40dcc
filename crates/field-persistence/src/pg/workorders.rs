//! Órdenes de trabajo (CRUD simple sobre `workorders`).

use chrono::NaiveDate;
use diesel::prelude::*;
use field_core::CoreError;
use field_domain::{Workorder, WorkorderPatch, WorkorderPayload};
use log::debug;

use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::workorders;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Queryable, Insertable, Debug)]
#[diesel(table_name = workorders)]
struct WorkorderRow {
    workorderid: i64,
    requestid: i64,
    customerid: i64,
    scheduleddate: NaiveDate,
    iscompleted: bool,
}

impl From<WorkorderRow> for Workorder {
    fn from(r: WorkorderRow) -> Self {
        Workorder { workorder_id: r.workorderid,
                    request_id: r.requestid,
                    customer_id: r.customerid,
                    scheduled_date: r.scheduleddate,
                    is_completed: r.iscompleted }
    }
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = workorders)]
struct WorkorderChanges {
    requestid: Option<i64>,
    customerid: Option<i64>,
    scheduleddate: Option<NaiveDate>,
    iscompleted: Option<bool>,
}

impl From<&WorkorderPatch> for WorkorderChanges {
    fn from(p: &WorkorderPatch) -> Self {
        Self { requestid: p.request_id,
               customerid: p.customer_id,
               scheduleddate: p.scheduled_date,
               iscompleted: p.is_completed }
    }
}

/// Traduce violaciones de restricciones a los mensajes que ve el cliente.
fn map_write_error(e: PersistenceError) -> CoreError {
    match e {
        PersistenceError::UniqueViolation(_) => CoreError::Conflict("workorderId already exists".into()),
        PersistenceError::ForeignKeyViolation(_) => CoreError::NotFound("Invalid requestId or customerId (FK violation)".into()),
        other => CoreError::from(other),
    }
}

pub struct PgWorkorders<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgWorkorders<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn create(&self, payload: &WorkorderPayload) -> Result<Workorder, CoreError> {
        let new = payload.validate()?;
        let row = WorkorderRow { workorderid: new.workorder_id,
                                 requestid: new.request_id,
                                 customerid: new.customer_id,
                                 scheduleddate: new.scheduled_date,
                                 iscompleted: new.is_completed };
        let created: WorkorderRow = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     diesel::insert_into(workorders::table).values(&row)
                                                                           .returning(workorders::all_columns)
                                                                           .get_result(tx)
                                                                           .map_err(PersistenceError::from)
                                 })
                         })
        }).map_err(map_write_error)?;
        debug!("workorder created workorder_id={}", created.workorderid);
        Ok(created.into())
    }

    /// Órdenes más recientes primero (por id descendente).
    pub fn list(&self, limit: i64) -> Result<Vec<Workorder>, CoreError> {
        let limit = if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit };
        let rows: Vec<WorkorderRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             workorders::table.order(workorders::workorderid.desc())
                                              .limit(limit)
                                              .load(conn)
                                              .map_err(PersistenceError::from)
                         })
        })?;
        Ok(rows.into_iter().map(Workorder::from).collect())
    }

    pub fn get(&self, workorder_id: i64) -> Result<Option<Workorder>, CoreError> {
        let row: Option<WorkorderRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             workorders::table.find(workorder_id)
                                              .first(conn)
                                              .optional()
                                              .map_err(PersistenceError::from)
                         })
        })?;
        Ok(row.map(Workorder::from))
    }

    /// `false` si no existe la orden o el parche no trae campos.
    pub fn update(&self, workorder_id: i64, patch: &WorkorderPatch) -> Result<bool, CoreError> {
        if patch.is_empty() {
            return Ok(false);
        }
        let changes = WorkorderChanges::from(patch);
        let updated = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     diesel::update(workorders::table.find(workorder_id)).set(&changes)
                                                                                        .execute(tx)
                                                                                        .map_err(PersistenceError::from)
                                 })
                         })
        }).map_err(map_write_error)?;
        Ok(updated > 0)
    }

    pub fn delete(&self, workorder_id: i64) -> Result<bool, CoreError> {
        let deleted = with_retry(|| {
            self.provider.with_connection(|conn| {
                             diesel::delete(workorders::table.find(workorder_id)).execute(conn)
                                                                                .map_err(PersistenceError::from)
                         })
        })?;
        Ok(deleted > 0)
    }
}
