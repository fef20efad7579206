//! # Carebook Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (environment variables, JSON/TOML files)
//! - Tracing subscriber initialisation
//! - In-memory `AppointmentRepository` adapter
//!
//! ## Architecture
//! - Implements traits defined in `carebook-core`
//! - Depends on `carebook-domain` and `carebook-core`
//! - Contains all "impure" code (environment, files, global subscriber)

pub mod config;
pub mod observability;
pub mod repository;

// Re-export commonly used items
pub use observability::init_tracing;
pub use repository::InMemoryAppointmentRepository;
