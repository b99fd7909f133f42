//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: a mutex-guarded in-process store, used when no database is
//!   configured and by the integration tests.
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters are thin translators between domain types and storage
//! representations. The only rule they run is the domain's own
//! `apply_submission`, inside their unit of work.

pub mod memory;
pub mod persistence;
