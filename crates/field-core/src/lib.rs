//! field-core: procedimiento de despacho de técnicos.
//!
//! Flujo estrictamente hacia adelante dentro de una transacción:
//! cliente -> dirección -> solicitud -> asignación.
pub mod assignment;
pub mod dispatch;
pub mod errors;
pub mod intake;
pub mod memory;
pub mod store;

pub use assignment::{pick_least_loaded, resolve_assignment, AssignmentDecision, AssignmentPolicy, AssignmentSource};
pub use dispatch::{DispatchOutcome, DispatchService};
pub use errors::{classify_error, CoreError, ErrorClass};
pub use memory::{InMemoryDispatchStore, MemoryTables};
pub use store::{CustomerResolution, DispatchStore, DispatchTx, EmployeeLoad, NewServiceRequest};
