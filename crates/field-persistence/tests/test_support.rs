#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::Connection;
use field_domain::NewService;
use field_persistence::config::DbConfig;
use field_persistence::migrations::run_pending_migrations;
use field_persistence::{ConnectionProvider, PersistenceError, PgCatalog};
use once_cell::sync::Lazy;

// Migra una sola vez por proceso; los tests del mismo binario corren en
// paralelo.
static MIGRATED: Lazy<Option<String>> = Lazy::new(|| {
    let cfg = DbConfig::from_env().ok()?;
    let mut conn = match PgConnection::establish(&cfg.url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("No se pudo conectar para migrar: {e}");
            return None;
        }
    };
    match run_pending_migrations(&mut conn) {
        Ok(()) => Some(cfg.url),
        Err(e) => {
            eprintln!("No se pudieron aplicar migraciones: {e}");
            None
        }
    }
});

// Los tests que reescriben `employee` dentro de su transacción se serializan
// para no bloquearse entre sí.
static SERIAL: Mutex<()> = Mutex::new(());

pub fn database_url() -> Option<String> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return None;
    }
    (*MIGRATED).clone()
}

/// Una conexión dentro de una transacción de test (siempre se revierte al
/// soltarla). Clonable para compartirla entre varios repositorios.
#[derive(Clone)]
pub struct TestProvider {
    conn: Arc<Mutex<PgConnection>>,
}

impl ConnectionProvider for TestProvider {
    fn with_connection<T, F>(&self, f: F) -> Result<T, PersistenceError>
        where F: FnOnce(&mut PgConnection) -> Result<T, PersistenceError>
    {
        let mut conn = self.conn
                           .lock()
                           .map_err(|_| PersistenceError::Unknown("test connection poisoned".into()))?;
        f(&mut conn)
    }
}

impl TestProvider {
    pub fn exec(&self, sql: &str) {
        self.with_connection(|c| c.batch_execute(sql).map_err(PersistenceError::from))
            .expect("exec sql");
    }

    pub fn count(&self, sql: &str) -> i64 {
        #[derive(diesel::QueryableByName)]
        struct CountRow {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            count: i64,
        }
        use diesel::RunQueryDsl;
        self.with_connection(|c| {
                diesel::sql_query(sql).get_result::<CountRow>(c)
                                      .map_err(PersistenceError::from)
            })
            .expect("count")
            .count
    }
}

pub struct TestDb {
    pub provider: TestProvider,
    _serial: MutexGuard<'static, ()>,
}

/// `None` si no hay base configurada.
pub fn test_db() -> Option<TestDb> {
    let url = database_url()?;
    let serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
    let mut conn = PgConnection::establish(&url).expect("connect");
    conn.begin_test_transaction().expect("begin test transaction");
    Some(TestDb { provider: TestProvider { conn: Arc::new(Mutex::new(conn)) },
                  _serial: serial })
}

impl TestDb {
    /// Deja la plantilla de técnicos vacía (solo dentro de esta transacción).
    pub fn clear_staff(&self) {
        self.provider.exec("DELETE FROM work_assignments; DELETE FROM employee;");
    }

    pub fn add_employee(&self, id: i64, first: &str) {
        self.provider.exec(&format!("INSERT INTO employee (employeeid, firstname, lastname, phone, email) \
                                     VALUES ({id}, '{first}', 'Tech', '555-01{id:02}', '{}@shop.test')",
                                    first.to_lowercase()));
    }

    /// Crea categoría + servicio y devuelve el id del servicio.
    pub fn seed_service(&self, category: &str, name: &str) -> i64 {
        let catalog = PgCatalog::new(self.provider.clone());
        catalog.ensure_category(category).expect("category");
        catalog.create_service(&NewService { name: name.into(),
                                             category: category.into(),
                                             price_cents: 9_900,
                                             duration_minutes: Some(60),
                                             description: None })
               .expect("service")
               .id
    }
}
