use diesel::prelude::*;
use diesel::sql_types::Text;
use field_core::CoreError;
use serde::Serialize;

use super::ConnectionProvider;
use crate::error::PersistenceError;

/// Información básica de la conexión activa.
#[derive(QueryableByName, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DbInfo {
    #[diesel(sql_type = Text)]
    pub database: String,
    #[diesel(sql_type = Text)]
    #[serde(rename = "user")]
    pub db_user: String,
    #[diesel(sql_type = Text)]
    #[serde(rename = "schema")]
    pub db_schema: String,
}

/// Sonda de salud: sin reintentos, para reflejar el estado real.
pub fn db_check<P: ConnectionProvider>(provider: &P) -> Result<DbInfo, CoreError> {
    let info = provider.with_connection(|conn| {
                           diesel::sql_query("SELECT current_database()::text AS database, current_user::text AS db_user, \
                                              current_schema()::text AS db_schema")
                               .get_result::<DbInfo>(conn)
                               .map_err(PersistenceError::from)
                       })?;
    Ok(info)
}
