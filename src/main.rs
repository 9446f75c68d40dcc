use field_core::AssignmentPolicy;
use fieldflow_rust::demo;
use log::info;

fn print_outcome(label: &str, outcome: &field_core::DispatchOutcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(json) => println!("[{label}] {json}"),
        Err(e) => eprintln!("[{label}] no se pudo serializar: {e}"),
    }
}

fn main() {
    // Cargar variables de entorno desde .env si existe (respeta DOTENV_PATH)
    fieldflow_rust::persistence::init_dotenv();
    env_logger::init();

    match demo::run_memory_demo(AssignmentPolicy::RecommendOnly) {
        Ok(outcome) => {
            info!("memory demo technician={:?}", outcome.technician.as_ref().map(|t| t.employee_id));
            print_outcome("MEMORY", &outcome);
        }
        Err(e) => {
            eprintln!("[MEMORY] Error: {e}");
            std::process::exit(1);
        }
    }

    #[cfg(feature = "pg_demo")]
    {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("[PG DEMO] DATABASE_URL no definido; omitiendo demo PG");
            return;
        }
        match demo::run_pg_demo() {
            Ok(outcome) => print_outcome("PG DEMO", &outcome),
            Err(e) => eprintln!("[PG DEMO] Error: {e}"),
        }
    }
}
