//! FieldFlow Rust Library
//!
//! Fachada del workspace de despacho de técnicos:
//! - Reexporta `field_domain`, `field_core` y `field_persistence`.
//! - Expone `demo` con el escenario de ejemplo que ejecuta `main-core`.

pub mod demo;

pub use field_core as core;
pub use field_domain as domain;
pub use field_persistence as persistence;
