//! `DispatchStore` sobre Postgres.
//!
//! Cada unidad de trabajo corre en `conn.transaction(..)` con el aislamiento
//! por defecto del servidor (read committed). Las sentencias son ordinarias;
//! la única con lógica condicional es el insert-o-reutilizar de clientes, que
//! se expresa como un solo `INSERT .. ON CONFLICT` para que la base lo evalúe
//! atómicamente.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Bool, Date, Text};
use field_core::{CoreError, CustomerResolution, DispatchStore, DispatchTx, EmployeeLoad, NewServiceRequest};
use field_domain::{AddressInput, CustomerInput, Employee, ServiceRequest};
use log::debug;

use super::{is_retryable, with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::{addressbook, employee, servicerequests, work_assignments};

const UPSERT_CUSTOMER_SQL: &str = "INSERT INTO customer (firstname, lastname, phone, email) \
                                   VALUES ($1, $2, $3, $4) \
                                   ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
                                   RETURNING customerid, (xmax = 0) AS inserted";

// Todos los empleados; los que no tienen trabajos ese día cuentan 0 gracias a
// los LEFT JOIN. La solicitud `$1` queda fuera del conteo.
const SAME_DAY_LOADS_SQL: &str = "SELECT e.employeeid, e.firstname, e.lastname, e.phone, e.email, \
                                         COUNT(sr.requestid) AS same_day_jobs \
                                  FROM employee e \
                                  LEFT JOIN work_assignments wa \
                                         ON wa.employeeid = e.employeeid AND wa.requestid <> $1 \
                                  LEFT JOIN servicerequests sr \
                                         ON sr.requestid = wa.requestid \
                                        AND (sr.preferred_datetime AT TIME ZONE 'UTC')::date = $2 \
                                  GROUP BY e.employeeid, e.firstname, e.lastname, e.phone, e.email \
                                  ORDER BY same_day_jobs ASC, e.employeeid ASC";

#[derive(QueryableByName, Debug)]
struct CustomerUpsertRow {
    #[diesel(sql_type = BigInt)]
    customerid: i64,
    #[diesel(sql_type = Bool)]
    inserted: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = addressbook)]
struct NewAddressRow<'a> {
    customer_id: i64,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    zip_code: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = servicerequests)]
struct NewRequestRow<'a> {
    customerid: i64,
    addressid: i64,
    service_id: i64,
    description: &'a str,
    preferred_datetime: DateTime<Utc>,
}

/// Fila mapeada de `servicerequests`.
#[derive(Queryable, Debug)]
pub struct RequestRow {
    pub requestid: i64,
    pub customerid: i64,
    pub addressid: i64,
    pub service_id: i64,
    pub description: String,
    pub preferred_datetime: DateTime<Utc>,
}

impl From<RequestRow> for ServiceRequest {
    fn from(r: RequestRow) -> Self {
        ServiceRequest { id: r.requestid,
                         customer_id: r.customerid,
                         address_id: r.addressid,
                         service_id: r.service_id,
                         description: r.description,
                         requested_at: r.preferred_datetime }
    }
}

/// Fila mapeada de `employee`.
#[derive(Queryable, Debug)]
pub struct EmployeeRow {
    pub employeeid: i64,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub email: String,
}

impl From<EmployeeRow> for Employee {
    fn from(r: EmployeeRow) -> Self {
        Employee { id: r.employeeid,
                   first_name: r.firstname,
                   last_name: r.lastname,
                   phone: r.phone,
                   email: r.email }
    }
}

#[derive(QueryableByName, Debug)]
struct LoadRow {
    #[diesel(sql_type = BigInt)]
    employeeid: i64,
    #[diesel(sql_type = Text)]
    firstname: String,
    #[diesel(sql_type = Text)]
    lastname: String,
    #[diesel(sql_type = Text)]
    phone: String,
    #[diesel(sql_type = Text)]
    email: String,
    #[diesel(sql_type = BigInt)]
    same_day_jobs: i64,
}

/// Vista transaccional sobre una conexión ya dentro de `BEGIN`.
struct PgDispatchTx<'a> {
    conn: &'a mut PgConnection,
    /// Último error transitorio visto; permite reintentar la transacción
    /// completa en vez de reportarlo como error de negocio.
    transient: Option<PersistenceError>,
}

impl PgDispatchTx<'_> {
    fn fail(&mut self, e: DieselError) -> CoreError {
        let pe = PersistenceError::from(e);
        if is_retryable(&pe) {
            let core = CoreError::Storage(pe.to_string());
            self.transient = Some(pe);
            return core;
        }
        CoreError::from(pe)
    }
}

impl DispatchTx for PgDispatchTx<'_> {
    fn resolve_customer(&mut self, input: &CustomerInput) -> Result<CustomerResolution, CoreError> {
        let row = diesel::sql_query(UPSERT_CUSTOMER_SQL).bind::<Text, _>(&input.first_name)
                                                        .bind::<Text, _>(&input.last_name)
                                                        .bind::<Text, _>(&input.phone)
                                                        .bind::<Text, _>(&input.email)
                                                        .get_result::<CustomerUpsertRow>(&mut *self.conn);
        match row {
            Ok(r) => Ok(CustomerResolution { customer_id: r.customerid,
                                             created: r.inserted }),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn record_address(&mut self, customer_id: i64, input: &AddressInput) -> Result<i64, CoreError> {
        let row = NewAddressRow { customer_id,
                                  address: &input.street,
                                  city: &input.city,
                                  state: &input.state,
                                  zip_code: &input.zip };
        diesel::insert_into(addressbook::table).values(&row)
                                               .returning(addressbook::address_id)
                                               .get_result::<i64>(&mut *self.conn)
                                               .map_err(|e| self.fail(e))
    }

    fn create_request(&mut self, new: &NewServiceRequest) -> Result<ServiceRequest, CoreError> {
        let row = NewRequestRow { customerid: new.customer_id,
                                  addressid: new.address_id,
                                  service_id: new.service_id,
                                  description: &new.description,
                                  preferred_datetime: new.requested_at };
        let inserted = diesel::insert_into(servicerequests::table).values(&row)
                                                                  .returning(servicerequests::all_columns)
                                                                  .get_result::<RequestRow>(&mut *self.conn);
        match inserted {
            Ok(r) => Ok(r.into()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info))
                if info.constraint_name().map_or(true, |c| c.contains("service_id")) =>
            {
                Err(CoreError::NotFound(format!("service {} does not exist", new.service_id)))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn latest_assignment(&mut self, request_id: i64) -> Result<Option<Employee>, CoreError> {
        work_assignments::table.inner_join(employee::table)
                               .filter(work_assignments::requestid.eq(request_id))
                               .order(work_assignments::assignment_id.desc())
                               .select((employee::employeeid,
                                        employee::firstname,
                                        employee::lastname,
                                        employee::phone,
                                        employee::email))
                               .first::<EmployeeRow>(&mut *self.conn)
                               .optional()
                               .map(|row| row.map(Employee::from))
                               .map_err(|e| self.fail(e))
    }

    fn same_day_loads(&mut self, request_id: i64, day: NaiveDate) -> Result<Vec<EmployeeLoad>, CoreError> {
        let rows = diesel::sql_query(SAME_DAY_LOADS_SQL).bind::<BigInt, _>(request_id)
                                                        .bind::<Date, _>(day)
                                                        .load::<LoadRow>(&mut *self.conn)
                                                        .map_err(|e| self.fail(e))?;
        Ok(rows.into_iter()
               .map(|r| EmployeeLoad { employee: Employee { id: r.employeeid,
                                                            first_name: r.firstname,
                                                            last_name: r.lastname,
                                                            phone: r.phone,
                                                            email: r.email },
                                       same_day_jobs: r.same_day_jobs })
               .collect())
    }

    fn insert_assignment(&mut self, request_id: i64, employee_id: i64) -> Result<i64, CoreError> {
        diesel::insert_into(work_assignments::table).values((work_assignments::requestid.eq(request_id),
                                                             work_assignments::employeeid.eq(employee_id)))
                                                    .returning(work_assignments::assignment_id)
                                                    .get_result::<i64>(&mut *self.conn)
                                                    .map_err(|e| self.fail(e))
    }
}

/// Implementación Postgres de `DispatchStore`.
pub struct PgDispatchStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgDispatchStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> DispatchStore for PgDispatchStore<P> {
    fn in_transaction<T, F>(&self, mut f: F) -> Result<T, CoreError>
        where F: FnMut(&mut dyn DispatchTx) -> Result<T, CoreError>
    {
        with_retry(|| {
            self.provider.with_connection(|conn| {
                                conn.transaction::<T, PersistenceError, _>(|tx_conn| {
                                        let mut tx = PgDispatchTx { conn: tx_conn,
                                                                    transient: None };
                                        let out = f(&mut tx);
                                        out.map_err(|e| match tx.transient.take() {
                                               Some(transient) => transient,
                                               None => PersistenceError::Rejected(e),
                                           })
                                    })
                            })
        }).inspect_err(|e| debug!("dispatch transaction rolled back err={e}"))
          .map_err(CoreError::from)
    }
}
