//! Core business logic for FieldOps.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the traits in [`store`].
//!
//! # Modules
//!
//! - `tenancy` - Authorization guard, roles, organization provisioning
//! - `service` - Service records, status axes, input validation
//! - `lifecycle` - Drift detection and the reconciliation engine
//! - `calendar` - Day-bucketed calendar and revenue projections
//! - `store` - Persistence seams implemented by the db crate
//! - `clock` - Injectable time source

pub mod calendar;
pub mod clock;
pub mod lifecycle;
pub mod service;
pub mod store;
pub mod tenancy;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{
    MembershipStore, OrganizationStore, ProjectionStore, ReferenceStore, ServiceRecordStore,
    StoreError,
};
