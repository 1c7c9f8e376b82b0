//! Prescription handlers.

mod start_prescription;

pub use start_prescription::{StartPrescriptionCommand, StartPrescriptionHandler};
