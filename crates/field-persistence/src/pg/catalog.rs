//! Catálogo de servicios (`services` + `service_types`).

use diesel::pg::PgConnection;
use diesel::prelude::*;
use field_core::CoreError;
use field_domain::{NewService, Service, ServiceType};
use log::debug;

use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::{service_types, services};

#[derive(Queryable, Debug)]
struct ServiceRow {
    service_id: i64,
    category: String,
    job_name: String,
    job_desc: Option<String>,
    price_cents: i64,
    duration_minutes: Option<i32>,
}

impl From<ServiceRow> for Service {
    fn from(r: ServiceRow) -> Self {
        Service { id: r.service_id,
                  category: r.category,
                  name: r.job_name,
                  description: r.job_desc,
                  price_cents: r.price_cents,
                  duration_minutes: r.duration_minutes }
    }
}

type ServiceColumns = (services::service_id,
                       service_types::service_type_name,
                       services::job_name,
                       services::job_desc,
                       services::price_cents,
                       services::duration_minutes);

const SERVICE_COLUMNS: ServiceColumns = (services::service_id,
                                         service_types::service_type_name,
                                         services::job_name,
                                         services::job_desc,
                                         services::price_cents,
                                         services::duration_minutes);

/// Id de la categoría por nombre; inexistente se rechaza como `Validation`.
fn category_id(conn: &mut PgConnection, category: &str) -> Result<i64, PersistenceError> {
    service_types::table.filter(service_types::service_type_name.eq(category))
                        .select(service_types::service_type_id)
                        .first(conn)
                        .optional()?
                        .ok_or_else(|| {
                            PersistenceError::Rejected(CoreError::Validation(format!("Service type '{category}' not found")))
                        })
}

pub struct PgCatalog<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgCatalog<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Todos los servicios, ordenados por categoría y nombre.
    pub fn list_services(&self) -> Result<Vec<Service>, CoreError> {
        let rows: Vec<ServiceRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             services::table.inner_join(service_types::table)
                                            .order((service_types::service_type_name.asc(), services::job_name.asc()))
                                            .select(SERVICE_COLUMNS)
                                            .load(conn)
                                            .map_err(PersistenceError::from)
                         })
        })?;
        debug!("list_services count={}", rows.len());
        Ok(rows.into_iter().map(Service::from).collect())
    }

    pub fn list_categories(&self) -> Result<Vec<ServiceType>, CoreError> {
        let rows: Vec<(i64, String)> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             service_types::table.order(service_types::service_type_name.asc())
                                                 .select((service_types::service_type_id, service_types::service_type_name))
                                                 .load(conn)
                                                 .map_err(PersistenceError::from)
                         })
        })?;
        Ok(rows.into_iter().map(|(id, name)| ServiceType { id, name }).collect())
    }

    pub fn services_by_category(&self, category: &str) -> Result<Vec<Service>, CoreError> {
        let rows: Vec<ServiceRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             services::table.inner_join(service_types::table)
                                            .filter(service_types::service_type_name.eq(category))
                                            .order(services::job_name.asc())
                                            .select(SERVICE_COLUMNS)
                                            .load(conn)
                                            .map_err(PersistenceError::from)
                         })
        })?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    pub fn get_service(&self, service_id: i64) -> Result<Option<Service>, CoreError> {
        let row: Option<ServiceRow> = with_retry(|| {
            self.provider.with_connection(|conn| {
                             services::table.inner_join(service_types::table)
                                            .filter(services::service_id.eq(service_id))
                                            .select(SERVICE_COLUMNS)
                                            .first(conn)
                                            .optional()
                                            .map_err(PersistenceError::from)
                         })
        })?;
        Ok(row.map(Service::from))
    }

    /// Crea la categoría si no existe y la devuelve.
    pub fn ensure_category(&self, name: &str) -> Result<ServiceType, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("category is required".into()));
        }
        let id: i64 = with_retry(|| {
            self.provider.with_connection(|conn| {
                             diesel::insert_into(service_types::table).values(service_types::service_type_name.eq(name))
                                                                      .on_conflict(service_types::service_type_name)
                                                                      .do_nothing()
                                                                      .execute(conn)?;
                             service_types::table.filter(service_types::service_type_name.eq(name))
                                                 .select(service_types::service_type_id)
                                                 .first(conn)
                                                 .map_err(PersistenceError::from)
                         })
        })?;
        Ok(ServiceType { id, name: name.to_string() })
    }

    /// Alta de servicio. La categoría debe existir de antemano.
    pub fn create_service(&self, new: &NewService) -> Result<Service, CoreError> {
        let new = new.validate()?;
        let service_id: i64 = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     let type_id = category_id(tx, &new.category)?;
                                     diesel::insert_into(services::table).values((services::service_type_id.eq(type_id),
                                                                                  services::job_name.eq(&new.name),
                                                                                  services::job_desc.eq(new.description.as_deref()),
                                                                                  services::price_cents.eq(new.price_cents),
                                                                                  services::duration_minutes.eq(new.duration_minutes)))
                                                                         .returning(services::service_id)
                                                                         .get_result(tx)
                                                                         .map_err(PersistenceError::from)
                                 })
                         })
        })?;
        debug!("create_service service_id={service_id} category={}", new.category);
        Ok(Service { id: service_id,
                     category: new.category,
                     name: new.name,
                     description: new.description,
                     price_cents: new.price_cents,
                     duration_minutes: new.duration_minutes })
    }

    /// Reemplaza los datos del servicio. `false` si el id no existe; categoría
    /// desconocida da `Validation`, igual que en el alta.
    pub fn update_service(&self, service_id: i64, changes: &NewService) -> Result<bool, CoreError> {
        let changes = changes.validate()?;
        let updated = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     let type_id = category_id(tx, &changes.category)?;
                                     diesel::update(services::table.filter(services::service_id.eq(service_id)))
                                         .set((services::service_type_id.eq(type_id),
                                               services::job_name.eq(&changes.name),
                                               services::job_desc.eq(changes.description.as_deref()),
                                               services::price_cents.eq(changes.price_cents),
                                               services::duration_minutes.eq(changes.duration_minutes)))
                                         .execute(tx)
                                         .map_err(PersistenceError::from)
                                 })
                         })
        })?;
        debug!("update_service service_id={service_id} updated={updated}");
        Ok(updated > 0)
    }

    /// `true` si se borró. Un servicio referenciado por solicitudes no se
    /// puede borrar (`Conflict`).
    pub fn delete_service(&self, service_id: i64) -> Result<bool, CoreError> {
        let deleted = with_retry(|| {
            self.provider.with_connection(|conn| {
                             conn.transaction(|tx| {
                                     diesel::delete(services::table.filter(services::service_id.eq(service_id)))
                                         .execute(tx)
                                         .map_err(PersistenceError::from)
                                 })
                         })
        }).map_err(|e| match e {
              PersistenceError::ForeignKeyViolation(_) => {
                  CoreError::Conflict(format!("service {service_id} is referenced by service requests"))
              }
              other => CoreError::from(other),
          })?;
        Ok(deleted > 0)
    }
}
