//! Record repository services.
//!
//! One module per record family: patient records, their odontogram version
//! stores, and the shared appointment book.

pub mod appointments;
pub mod odontogram;
pub mod patients;
pub mod shared;
