//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into detail, catalog and page use cases.
//! - Keep presentation layers decoupled from storage details.

pub mod catalog_service;
pub mod detail_service;
pub mod page_service;
