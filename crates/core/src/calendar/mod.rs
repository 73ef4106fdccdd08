//! Calendar and revenue aggregation.
//!
//! Day buckets use the stored date's literal year, month and day. A record
//! stored as `2024-03-01` is on day 1 whatever the process timezone is.

pub mod service;
pub mod types;

pub use service::CalendarService;
pub use types::{
    CalendarEntry, CalendarMonth, MonthError, MonthQuery, MonthRange, RevenueSummary,
    ServiceProjection, technician_display_name,
};
