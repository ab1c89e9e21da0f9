//! In-place editing core.
//!
//! # Responsibility
//! - Stage edits in a draft without touching committed state.
//! - Persist or discard a draft atomically.
//!
//! # Invariants
//! - Committed state changes only through session transitions.
//! - Section edits are whole-sequence transformations.

pub mod draft_store;
pub mod page_session;
pub mod section_editor;
pub mod session;
