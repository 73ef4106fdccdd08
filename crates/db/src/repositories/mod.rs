//! Repository layer for database operations.
//!
//! Inherent methods return `DbErr`; the core store traits are implemented
//! on top of them and translate errors with `store_error`.

pub mod client;
pub mod organization;
pub mod service_record;
pub mod technician;
pub mod user;

pub use client::{ClientRepository, CreateClientInput};
pub use organization::OrganizationRepository;
pub use service_record::{ServiceRecordFilter, ServiceRecordRepository};
pub use technician::{CreateTechnicianInput, TechnicianRepository};
pub use user::{ProfileInput, UserRepository};
