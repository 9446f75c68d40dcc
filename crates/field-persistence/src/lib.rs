//! field-persistence
//!
//! Implementaciones Postgres (Diesel) del despacho y de los repositorios
//! auxiliares.
//!
//! Módulos:
//! - `pg`: `PgDispatchStore`, catálogo, órdenes de trabajo, garantías y sonda
//!   de salud; proveedores de conexión.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, AppConfig, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, db_check, provider_from_config, AnyProvider, ConnectionProvider, DbInfo,
             DirectProvider, PgCatalog, PgDispatchStore, PgPool, PgWarranties, PgWorkorders, PoolProvider};
