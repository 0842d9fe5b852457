//! API route modules.

pub mod active;
pub mod meetings;
