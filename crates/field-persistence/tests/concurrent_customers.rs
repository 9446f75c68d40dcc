//! Carrera real sobre un pool: varias transacciones con el mismo email deben
//! terminar en un único cliente. Las filas se confirman y se limpian al final.

use std::sync::Arc;
use std::thread;

use diesel::connection::SimpleConnection;
use field_core::DispatchService;
use field_domain::{AddressInput, CustomerInput, NewService, ServiceRequestPayload};
use field_persistence::{build_pool, DbConfig, PgCatalog, PgDispatchStore, PoolProvider};

#[test]
fn concurrent_requests_with_same_email_create_one_customer() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return;
    }
    let cfg = DbConfig::from_env().expect("config");
    let pool = build_pool(&cfg.url, 2, 8).expect("pool");
    let tag = std::process::id();
    let email = format!("race-{tag}@x.test");
    let category = format!("Race category {tag}");

    let catalog = PgCatalog::new(PoolProvider { pool: pool.clone() });
    catalog.ensure_category(&category).expect("category");
    let service = catalog.create_service(&NewService { name: "Race job".into(),
                                                       category: category.clone(),
                                                       price_cents: 100,
                                                       duration_minutes: None,
                                                       description: None })
                         .expect("service");

    let svc = Arc::new(DispatchService::new(PgDispatchStore::new(PoolProvider { pool: pool.clone() })));
    let handles: Vec<_> = (0..8).map(|i| {
                                   let svc = Arc::clone(&svc);
                                   let email = email.clone();
                                   let service_id = service.id;
                                   thread::spawn(move || {
                                       let payload = ServiceRequestPayload { customer: CustomerInput::new("Race", "Runner", "555-0000", &email),
                                                                             address: AddressInput::new("9 Loop Rd", "Springfield", "IL", "62701"),
                                                                             service_id,
                                                                             description: String::new(),
                                                                             requested_at: format!("2025-10-22T{:02}:00:00Z", 8 + i) };
                                       svc.create_service_request_with_assignment(&payload)
                                   })
                               })
                               .collect();
    let outcomes: Vec<_> = handles.into_iter()
                                  .map(|h| h.join().expect("thread"))
                                  .collect();

    let mut conn = pool.get().expect("conn");
    let cleanup = format!("DELETE FROM servicerequests WHERE service_id = {0}; \
                           DELETE FROM addressbook a USING customer c WHERE a.customer_id = c.customerid AND c.email = '{email}'; \
                           DELETE FROM customer WHERE email = '{email}'; \
                           DELETE FROM services WHERE service_id = {0}; \
                           DELETE FROM service_types WHERE service_type_name = '{category}';",
                          service.id);

    let ok: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    let failures = outcomes.len() - ok.len();
    let created = ok.iter().filter(|o| o.customer_created).count();
    let mut ids: Vec<i64> = ok.iter().map(|o| o.customer_id).collect();
    ids.sort_unstable();
    ids.dedup();
    conn.batch_execute(&cleanup).expect("cleanup");

    assert_eq!(failures, 0, "{outcomes:?}");
    assert_eq!(ids.len(), 1, "all requests must share one customer");
    assert_eq!(created, 1, "exactly one transaction creates the customer");
}
