//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the fetch/persist contracts the editing core depends on.
//! - Isolate SQLite query details from session and service orchestration.
//!
//! # Invariants
//! - Record writes must enforce `Record::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `IdMismatch`) in
//!   addition to DB transport errors.

pub mod page_repo;
pub mod record_repo;
