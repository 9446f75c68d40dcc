//! Carga de configuración desde variables de entorno.
//! Usa convención `DATABASE_URL` y parámetros opcionales de pool y despacho.
//! El valor resultante se inyecta explícitamente en los stores; no hay estado
//! global salvo la carga única del archivo `.env`.

use std::env;

use dotenvy::{dotenv, from_filename};
use field_core::AssignmentPolicy;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// Carga perezosa del archivo .env una sola vez. `DOTENV_PATH` permite apuntar
// a otro archivo (p. ej. `.env.test`).
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = match env::var("DOTENV_PATH") {
        Ok(path) => from_filename(path),
        Err(_) => dotenv(),
    };
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// `false`: una conexión nueva por transacción; `true`: pool r2d2.
    pub pooled: bool,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").map_err(|_| PersistenceError::Config("DATABASE_URL no definido".into()))?;
        let min_connections = env_parse("DATABASE_MIN_CONNECTIONS").unwrap_or(2);
        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(16);
        let pooled = env_flag("DATABASE_POOLED");
        Ok(Self { url,
                  min_connections,
                  max_connections,
                  pooled })
    }
}

/// Configuración completa de la aplicación: base de datos + política de
/// asignación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbConfig,
    pub policy: AssignmentPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        let db = DbConfig::from_env()?;
        let policy = if env_flag("DISPATCH_PERSIST_FALLBACK") {
            AssignmentPolicy::PersistFallback
        } else {
            AssignmentPolicy::RecommendOnly
        };
        Ok(Self { db, policy })
    }
}

fn env_parse(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "t" | "yes" | "y")
}

/// Carga temprana de .env (binarios: antes de inicializar el logger).
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
