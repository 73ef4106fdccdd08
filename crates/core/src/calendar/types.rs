//! Calendar and revenue projection types.

use chrono::{Datelike, NaiveDate};
use fieldops_shared::types::{Amount, ServiceRecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::service::{PaymentStatus, ServiceStatus};

/// Invalid month selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    /// Month outside 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    Month(u32),

    /// Year outside the supported range.
    #[error("year must be between {min} and {max}, got {year}", min = MonthRange::MIN_YEAR, max = MonthRange::MAX_YEAR)]
    Year {
        /// Requested year.
        year: i32,
    },
}

impl From<MonthError> for fieldops_shared::AppError {
    fn from(err: MonthError) -> Self {
        let field = match err {
            MonthError::Month(_) => "month",
            MonthError::Year { .. } => "year",
        };
        Self::validation(field, err.to_string())
    }
}

/// Query string for month-scoped projections.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MonthQuery {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

/// A calendar month as a half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// First day of the month.
    pub start: NaiveDate,
    /// First day of the following month.
    pub end: NaiveDate,
}

impl MonthRange {
    /// Smallest accepted year.
    pub const MIN_YEAR: i32 = 2000;
    /// Largest accepted year.
    pub const MAX_YEAR: i32 = 2100;

    /// Validates a year and month.
    ///
    /// # Errors
    ///
    /// Returns `MonthError` if either is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(MonthError::Year { year });
        }
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(MonthError::Month(month))?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(MonthError::Year { year })?;

        Ok(Self {
            year,
            month,
            start,
            end,
        })
    }

    /// True if `date` falls in this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl TryFrom<MonthQuery> for MonthRange {
    type Error = MonthError;

    fn try_from(query: MonthQuery) -> Result<Self, Self::Error> {
        Self::new(query.year, query.month)
    }
}

/// One service record joined with its client and technician names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProjection {
    /// Record ID.
    pub id: ServiceRecordId,
    /// Stored calendar day.
    pub date: NaiveDate,
    /// Billed amount.
    pub gross_value: Amount,
    /// Invoice issued.
    pub has_invoice: bool,
    /// Fulfillment axis.
    pub status: ServiceStatus,
    /// Payment axis.
    pub payment_status: PaymentStatus,
    /// Client name.
    pub client_name: String,
    /// Technician full name.
    pub technician_full_name: String,
    /// Technician nickname.
    pub technician_nickname: Option<String>,
}

/// Nickname when set, full name otherwise.
#[must_use]
pub fn technician_display_name(full_name: &str, nickname: Option<&str>) -> String {
    nickname
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(full_name)
        .to_string()
}

/// An entry in a calendar day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    /// Record ID.
    pub id: ServiceRecordId,
    /// Stored calendar day.
    pub date: NaiveDate,
    /// Billed amount.
    pub gross_value: Amount,
    /// Invoice issued.
    pub has_invoice: bool,
    /// Fulfillment axis.
    pub status: ServiceStatus,
    /// Payment axis.
    pub payment_status: PaymentStatus,
    /// Client name.
    pub client_name: String,
    /// Technician nickname or full name.
    pub technician_name: String,
}

impl From<ServiceProjection> for CalendarEntry {
    fn from(row: ServiceProjection) -> Self {
        let technician_name =
            technician_display_name(&row.technician_full_name, row.technician_nickname.as_deref());
        Self {
            id: row.id,
            date: row.date,
            gross_value: row.gross_value,
            has_invoice: row.has_invoice,
            status: row.status,
            payment_status: row.payment_status,
            client_name: row.client_name,
            technician_name,
        }
    }
}

/// Records of one month grouped by day of month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Day of month to entries; days without records are absent.
    pub days: BTreeMap<u32, Vec<CalendarEntry>>,
}

impl CalendarMonth {
    /// Groups projections by the literal day of their stored date.
    /// Rows outside `range` are dropped.
    #[must_use]
    pub fn group(range: MonthRange, rows: Vec<ServiceProjection>) -> Self {
        let mut days: BTreeMap<u32, Vec<CalendarEntry>> = BTreeMap::new();
        for row in rows.into_iter().filter(|r| range.contains(r.date)) {
            days.entry(row.date.day()).or_default().push(row.into());
        }

        Self {
            year: range.year,
            month: range.month,
            days,
        }
    }

    /// Number of entries across all days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// True when no day has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Monthly revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueSummary {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Sum of all non-cancelled records.
    pub total: Amount,
    /// Sum of records paid in full.
    pub paid: Amount,
    /// Sum of records pending or partially paid.
    pub outstanding: Amount,
    /// Number of non-cancelled records.
    pub count: usize,
}

impl RevenueSummary {
    /// Sums `rows`, skipping any record cancelled on either axis.
    #[must_use]
    pub fn summarize(range: MonthRange, rows: &[ServiceProjection]) -> Self {
        let counted = rows.iter().filter(|r| {
            range.contains(r.date)
                && r.status != ServiceStatus::Cancelado
                && r.payment_status != PaymentStatus::Cancelado
        });

        let mut summary = Self {
            year: range.year,
            month: range.month,
            total: Amount::ZERO,
            paid: Amount::ZERO,
            outstanding: Amount::ZERO,
            count: 0,
        };
        for row in counted {
            summary.total = summary.total + row.gross_value;
            summary.count += 1;
            match row.payment_status {
                PaymentStatus::Pago => summary.paid = summary.paid + row.gross_value,
                PaymentStatus::Pendente | PaymentStatus::Parcial => {
                    summary.outstanding = summary.outstanding + row.gross_value;
                }
                PaymentStatus::Cancelado => {}
            }
        }
        summary
    }
}
