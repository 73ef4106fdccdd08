//! The drift predicate and repair planning.
//!
//! Earlier business rules allowed a record to be marked paid while its
//! fulfillment status stayed open. A record is drifted when it is paid,
//! its day is strictly in the past, its status is still open and it has
//! no completion instant. The repair closes it as `concluido` and derives
//! the completion instant from the payment, or from the end of its day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use fieldops_shared::types::{OrganizationId, ServiceRecordId};

use crate::service::{PaymentStatus, ServiceRecord, ServiceStatus};

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Pure drift predicate.
#[must_use]
pub fn is_drifted(
    status: ServiceStatus,
    payment_status: PaymentStatus,
    date: NaiveDate,
    completed_date: Option<DateTime<Utc>>,
    today: NaiveDate,
) -> bool {
    payment_status == PaymentStatus::Pago
        && date < today
        && status.is_open()
        && completed_date.is_none()
}

impl ServiceRecord {
    /// True if this record matches the drift predicate relative to `today`.
    #[must_use]
    pub fn is_drifted(&self, today: NaiveDate) -> bool {
        is_drifted(
            self.status,
            self.payment_status,
            self.date,
            self.completed_date,
            today,
        )
    }
}

/// 23:59:59 on `date` in `tz`, as an instant.
///
/// When that local time is ambiguous the earlier instant wins; when it does
/// not exist the wall-clock value is read as UTC.
#[must_use]
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(END_OF_DAY);
    tz.from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}

/// Completion instant for a drifted record: the payment instant if known.
#[must_use]
pub fn completion_instant(record: &ServiceRecord, tz: Tz) -> DateTime<Utc> {
    record
        .payment_date
        .unwrap_or_else(|| end_of_day(record.date, tz))
}

/// A conditional repair: set `status = concluido` and `completed_date`,
/// only if the record is still open, paid and without completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repair {
    /// Target record.
    pub record_id: ServiceRecordId,
    /// Owning organization; the store filters on it.
    pub organization_id: OrganizationId,
    /// Completion instant to write.
    pub completed_date: DateTime<Utc>,
}

impl Repair {
    /// Status written by every repair.
    pub const STATUS: ServiceStatus = ServiceStatus::Concluido;

    /// Applies the repair to an in-memory record, with the same condition
    /// the store enforces. Returns false if the record was already consistent.
    pub fn apply_to(&self, record: &mut ServiceRecord) -> bool {
        let applicable = record.id == self.record_id
            && record.organization_id == self.organization_id
            && record.payment_status == PaymentStatus::Pago
            && record.status.is_open()
            && record.completed_date.is_none();

        if applicable {
            record.status = Self::STATUS;
            record.completed_date = Some(self.completed_date);
        }
        applicable
    }
}

/// Plans the repair of `record` in an organization using `tz`.
#[must_use]
pub fn plan_repair(record: &ServiceRecord, tz: Tz) -> Repair {
    Repair {
        record_id: record.id,
        organization_id: record.organization_id,
        completed_date: completion_instant(record, tz),
    }
}
