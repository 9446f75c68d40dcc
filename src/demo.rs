//! Escenario de ejemplo: dos técnicos sin trabajos ese día (ids 3 y 7), un
//! cliente nuevo y el servicio 5. El balanceo debe elegir al técnico 3.

use field_core::{AssignmentPolicy, CoreError, DispatchOutcome, DispatchService, InMemoryDispatchStore};
use field_domain::{AddressInput, CustomerInput, Employee, Service, ServiceRequestPayload};

pub const DEMO_SERVICE_ID: i64 = 5;

pub fn demo_payload(service_id: i64) -> ServiceRequestPayload {
    ServiceRequestPayload { customer: CustomerInput::new("Ada", "Lovelace", "555-0100", "a@x.com"),
                            address: AddressInput::new("1 Main St", "Springfield", "IL", "62701"),
                            service_id,
                            description: "Kitchen faucet leaking".into(),
                            requested_at: "2025-10-22T14:00:00Z".into() }
}

fn technician(id: i64, first: &str, last: &str) -> Employee {
    Employee { id,
               first_name: first.into(),
               last_name: last.into(),
               phone: format!("555-02{id:02}"),
               email: format!("{}@fieldflow.test", first.to_lowercase()) }
}

/// Store en memoria con el catálogo y la plantilla del escenario.
pub fn demo_store() -> Result<InMemoryDispatchStore, CoreError> {
    let store = InMemoryDispatchStore::new();
    store.add_service(Service { id: DEMO_SERVICE_ID,
                                category: "Plumbing".into(),
                                name: "Faucet repair".into(),
                                description: Some("Repair or replace a leaking faucet".into()),
                                price_cents: 12_500,
                                duration_minutes: Some(90) })?;
    store.add_employee(technician(3, "Alice", "Nguyen"))?;
    store.add_employee(technician(7, "Bob", "Ortiz"))?;
    Ok(store)
}

pub fn run_memory_demo(policy: AssignmentPolicy) -> Result<DispatchOutcome, CoreError> {
    let svc = DispatchService::new(demo_store()?).with_policy(policy);
    svc.create_service_request_with_assignment(&demo_payload(DEMO_SERVICE_ID))
}

/// Mismo escenario contra Postgres: asegura categoría y servicio, y usa la
/// plantilla de técnicos que haya en la base.
#[cfg(feature = "pg_demo")]
pub fn run_pg_demo() -> Result<DispatchOutcome, CoreError> {
    use field_domain::NewService;
    use field_persistence::{provider_from_config, AppConfig, PgCatalog, PgDispatchStore};

    let cfg = AppConfig::from_env()?;
    let catalog = PgCatalog::new(provider_from_config(&cfg.db)?);
    catalog.ensure_category("Plumbing")?;
    let service_id = match catalog.services_by_category("Plumbing")?.into_iter().find(|s| s.name == "Faucet repair") {
        Some(s) => s.id,
        None => {
            catalog.create_service(&NewService { name: "Faucet repair".into(),
                                                 category: "Plumbing".into(),
                                                 price_cents: 12_500,
                                                 duration_minutes: Some(90),
                                                 description: None })?
                   .id
        }
    };
    let svc = DispatchService::new(PgDispatchStore::new(catalog.provider)).with_policy(cfg.policy);
    svc.create_service_request_with_assignment(&demo_payload(service_id))
}
