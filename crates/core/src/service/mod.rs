//! Service records.
//!
//! # Modules
//!
//! - `types` - Status axes, records and change sets
//! - `input` - Request payloads and validation
//! - `error` - Error type
//! - `service` - Create, read and update operations

pub mod error;
pub mod input;
#[allow(clippy::module_inception)]
pub mod service;
pub mod types;

pub use error::ServiceRecordError;
pub use input::{CreateServiceRecordInput, UpdateServiceRecordInput, parse_calendar_date};
pub use service::ServiceRecordService;
pub use types::{
    NewServiceRecord, PaymentStatus, ServiceRecord, ServiceRecordChanges, ServiceStatus,
};
