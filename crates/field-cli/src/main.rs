//! `fieldctl`: operaciones de despacho, catálogo, órdenes de trabajo y
//! garantías contra Postgres (`DATABASE_URL`).
//!
//! Códigos de salida: 0 ok, 2 validación, 4 no encontrado / conflicto,
//! 5 almacenamiento.

use clap::{Parser, Subcommand};
use field_core::{classify_error, AssignmentPolicy, CoreError, DispatchService, ErrorClass};
use field_domain::{ServiceRequestPayload, WarrantyClaim, WarrantyLookup, WorkorderPatch, WorkorderPayload};
use field_persistence::pg::warranties::CLAIM_STATUS_PENDING;
use field_persistence::pg::workorders::DEFAULT_LIST_LIMIT;
use field_persistence::{db_check, provider_from_config, AnyProvider, AppConfig, PgCatalog, PgDispatchStore, PgWarranties,
                        PgWorkorders};
use log::debug;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "fieldctl", version, about = "Despacho de técnicos y utilidades de consulta")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Alta de solicitud con asignación de técnico (payload JSON).
    Request {
        /// `{"customer":{..},"address":{..},"serviceId":5,"requestedAt":".."}`
        #[arg(long)]
        payload: String,
        /// Persiste la asignación elegida por balanceo de carga (también
        /// `DISPATCH_PERSIST_FALLBACK=1`).
        #[arg(long)]
        persist_fallback: bool,
    },
    /// Lista servicios, opcionalmente filtrados por categoría.
    Services {
        #[arg(long)]
        category: Option<String>,
    },
    /// Lista categorías de servicio.
    Categories,
    #[command(subcommand)]
    Workorders(WorkorderCommand),
    #[command(subcommand)]
    Warranty(WarrantyCommand),
    /// Sonda de conexión: base, usuario y esquema activos.
    DbCheck,
}

#[derive(Subcommand, Debug)]
enum WorkorderCommand {
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: i64,
    },
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Payload JSON con workorderId, requestId, customerId, scheduledDate e isCompleted.
    Create {
        #[arg(long)]
        payload: String,
    },
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        patch: String,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum WarrantyCommand {
    Lookup {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Solicitud de servicio en garantía: warrantyId, workOrderId, issueType,
    /// urgency y problemDescription (email/phone opcionales).
    Request {
        #[arg(long)]
        payload: String,
    },
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::Validation(format!("invalid JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Storage(format!("serialize: {e}")))
}

fn provider(cfg: &AppConfig) -> Result<AnyProvider, CoreError> {
    Ok(provider_from_config(&cfg.db)?)
}

fn run(cli: Cli) -> Result<Value, CoreError> {
    let cfg = AppConfig::from_env()?;
    debug!("fieldctl command={:?} pooled={}", cli.command, cfg.db.pooled);
    match cli.command {
        Command::Request { payload, persist_fallback } => {
            let payload: ServiceRequestPayload = parse_json(&payload)?;
            let policy = if persist_fallback { AssignmentPolicy::PersistFallback } else { cfg.policy };
            let svc = DispatchService::new(PgDispatchStore::new(provider(&cfg)?)).with_policy(policy);
            to_json(&svc.create_service_request_with_assignment(&payload)?)
        }
        Command::Services { category } => {
            let catalog = PgCatalog::new(provider(&cfg)?);
            match category {
                Some(c) => to_json(&catalog.services_by_category(&c)?),
                None => to_json(&catalog.list_services()?),
            }
        }
        Command::Categories => to_json(&PgCatalog::new(provider(&cfg)?).list_categories()?),
        Command::Workorders(cmd) => {
            let repo = PgWorkorders::new(provider(&cfg)?);
            match cmd {
                WorkorderCommand::List { limit } => to_json(&repo.list(limit)?),
                WorkorderCommand::Get { id } => match repo.get(id)? {
                    Some(w) => to_json(&w),
                    None => Err(CoreError::NotFound(format!("Workorder {id} not found"))),
                },
                WorkorderCommand::Create { payload } => {
                    let payload: WorkorderPayload = parse_json(&payload)?;
                    to_json(&repo.create(&payload)?)
                }
                WorkorderCommand::Update { id, patch } => {
                    let patch: WorkorderPatch = parse_json(&patch)?;
                    if patch.is_empty() {
                        return Err(CoreError::Validation("No fields to update".into()));
                    }
                    if !repo.update(id, &patch)? {
                        return Err(CoreError::NotFound(format!("Workorder {id} not found")));
                    }
                    Ok(serde_json::json!({ "updated": id }))
                }
                WorkorderCommand::Delete { id } => {
                    if !repo.delete(id)? {
                        return Err(CoreError::NotFound(format!("Workorder {id} not found")));
                    }
                    Ok(serde_json::json!({ "deleted": id }))
                }
            }
        }
        Command::Warranty(cmd) => {
            let repo = PgWarranties::new(provider(&cfg)?);
            match cmd {
                WarrantyCommand::Lookup { email, phone } => to_json(&repo.lookup(&WarrantyLookup { email, phone })?),
                WarrantyCommand::Request { payload } => {
                    let claim: WarrantyClaim = parse_json(&payload)?;
                    let id = repo.request_service(&claim)?;
                    Ok(serde_json::json!({ "requestId": id, "status": CLAIM_STATUS_PENDING }))
                }
            }
        }
        Command::DbCheck => to_json(&db_check(&provider(&cfg)?)?),
    }
}

fn exit_code(e: &CoreError) -> i32 {
    match classify_error(e) {
        ErrorClass::Client => 2,
        ErrorClass::Missing => 4,
        ErrorClass::Server => 5,
    }
}

fn main() {
    // Antes del logger, para que RUST_LOG pueda venir del .env.
    field_persistence::init_dotenv();
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(out) => {
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string()));
        }
        Err(e) => {
            eprintln!("[fieldctl] {e}");
            std::process::exit(exit_code(&e));
        }
    }
}
