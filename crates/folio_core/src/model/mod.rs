//! Domain model for catalog records and landing page content.
//!
//! # Responsibility
//! - Define canonical data structures used by the editing core.
//! - Normalize loosely shaped input once, at the model boundary.
//!
//! # Invariants
//! - Every record is identified by a stable positive `RecordId`.
//! - Section order is significant and preserved by every operation except
//!   explicit removal.

pub mod block;
pub mod record;
pub mod page;
