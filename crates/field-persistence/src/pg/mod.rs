//! Implementaciones Postgres (Diesel).
//!
//! Objetivo general del módulo:
//! - Proveer el `DispatchStore` durable con la misma semántica que el backend
//!   en memoria de `field-core`.
//! - Adquirir y liberar conexiones explícitamente alrededor de cada
//!   transacción (`ConnectionProvider`), con rollback garantizado en todo
//!   camino de salida.
//! - Reintentar la unidad de trabajo completa ante errores transitorios.
//! - Repositorios auxiliares: catálogo, órdenes de trabajo, garantías y sonda
//!   de salud.

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel::Connection;
use log::{debug, warn};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;

pub mod catalog;
pub mod dispatch;
pub mod health;
pub mod warranties;
pub mod workorders;

pub use catalog::PgCatalog;
pub use dispatch::PgDispatchStore;
pub use health::{db_check, DbInfo};
pub use warranties::PgWarranties;
pub use workorders::PgWorkorders;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Contrato:
/// - Entrega una conexión válida al closure durante su ejecución y la libera
///   al volver, haya éxito o error.
/// - Fallos al obtener la conexión se reportan como
///   `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn with_connection<T, F>(&self, f: F) -> Result<T, PersistenceError>
        where F: FnOnce(&mut PgConnection) -> Result<T, PersistenceError>;
}

/// Una conexión nueva por llamada; se cierra al terminar.
pub struct DirectProvider {
    url: String,
}

impl DirectProvider {
    /// Verifica conectividad y aplica migraciones pendientes una vez.
    pub fn connect(url: &str) -> Result<Self, PersistenceError> {
        let mut conn = establish(url)?;
        run_pending_migrations(&mut conn)?;
        Ok(Self { url: url.to_string() })
    }
}

impl ConnectionProvider for DirectProvider {
    fn with_connection<T, F>(&self, f: F) -> Result<T, PersistenceError>
        where F: FnOnce(&mut PgConnection) -> Result<T, PersistenceError>
    {
        let mut conn = establish(&self.url)?;
        f(&mut conn)
    }
}

/// Implementación de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn with_connection<T, F>(&self, f: F) -> Result<T, PersistenceError>
        where F: FnOnce(&mut PgConnection) -> Result<T, PersistenceError>
    {
        let mut conn = self.pool
                           .get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))?;
        f(&mut conn)
    }
}

/// Proveedor elegido en tiempo de ejecución según `DbConfig::pooled`.
pub enum AnyProvider {
    Direct(DirectProvider),
    Pooled(PoolProvider),
}

impl ConnectionProvider for AnyProvider {
    fn with_connection<T, F>(&self, f: F) -> Result<T, PersistenceError>
        where F: FnOnce(&mut PgConnection) -> Result<T, PersistenceError>
    {
        match self {
            AnyProvider::Direct(p) => p.with_connection(f),
            AnyProvider::Pooled(p) => p.with_connection(f),
        }
    }
}

/// Construye el proveedor indicado por la configuración (ya migrado).
pub fn provider_from_config(cfg: &DbConfig) -> Result<AnyProvider, PersistenceError> {
    if cfg.pooled {
        let pool = build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)?;
        Ok(AnyProvider::Pooled(PoolProvider { pool }))
    } else {
        Ok(AnyProvider::Direct(DirectProvider::connect(&cfg.url)?))
    }
}

fn establish(url: &str) -> Result<PgConnection, PersistenceError> {
    PgConnection::establish(url).map_err(|e| PersistenceError::TransientIo(format!("connect: {e}")))
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
pub(crate) fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes llegan como Unknown con texto; best-effort sin
        // acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff lineal (hasta 3 reintentos: 15ms, 30ms, 45ms).
///
/// No altera semántica de negocio; solo repite la unidad de trabajo provista
/// por `f`. Los errores de negocio (`Rejected`) nunca se reintentan.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// - Si `min_size > max_size`, usa `min_size = max_size`.
/// - Ejecuta migraciones con la primera conexión obtenida.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    debug!("pool ready min_idle={final_min} max_size={validated_max}");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_core::CoreError;

    #[test]
    fn business_rejections_are_not_retried() {
        let mut calls = 0;
        let r: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::Rejected(CoreError::NotFound("service 9".into())))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn transient_errors_retry_then_succeed() {
        let mut calls = 0;
        let r = with_retry(|| {
            calls += 1;
            if calls < 3 {
                Err(PersistenceError::SerializationConflict)
            } else {
                Ok(calls)
            }
        });
        assert_eq!(r.unwrap(), 3);
    }

    #[test]
    fn retries_are_bounded() {
        let mut calls = 0;
        let r: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::TransientIo("connection refused".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls, 4);
    }

    #[test]
    fn unknown_deadlock_text_is_retryable() {
        assert!(is_retryable(&PersistenceError::Unknown("ERROR: deadlock detected".into())));
        assert!(!is_retryable(&PersistenceError::UniqueViolation("dup".into())));
    }
}
