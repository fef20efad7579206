//! `AppointmentRepository` adapters

pub mod memory;

pub use memory::InMemoryAppointmentRepository;
