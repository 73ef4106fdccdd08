//! Property tests for the drift predicate and repair planning.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use fieldops_shared::types::OrganizationId;
use proptest::prelude::*;

use crate::lifecycle::drift::{end_of_day, is_drifted, plan_repair};
use crate::service::{PaymentStatus, ServiceStatus};
use crate::testing::sample_record;

fn service_status() -> impl Strategy<Value = ServiceStatus> {
    prop::sample::select(ServiceStatus::ALL.to_vec())
}

fn payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop::sample::select(PaymentStatus::ALL.to_vec())
}

fn timezone() -> impl Strategy<Value = Tz> {
    prop::sample::select(vec![
        Tz::UTC,
        chrono_tz::America::Sao_Paulo,
        chrono_tz::America::New_York,
        chrono_tz::Asia::Tokyo,
        chrono_tz::Pacific::Auckland,
    ])
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

proptest! {
    #[test]
    fn prop_completed_never_drifted(
        status in service_status(),
        payment in payment_status(),
        offset in -400i64..400,
    ) {
        let today = base_date();
        let completed = Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
        prop_assert!(!is_drifted(status, payment, today + Duration::days(offset), completed, today));
    }

    #[test]
    fn prop_today_or_future_never_drifted(
        status in service_status(),
        payment in payment_status(),
        offset in 0i64..400,
    ) {
        let today = base_date();
        prop_assert!(!is_drifted(status, payment, today + Duration::days(offset), None, today));
    }

    #[test]
    fn prop_drift_requires_pago_and_open(
        status in service_status(),
        payment in payment_status(),
        offset in 1i64..400,
    ) {
        let today = base_date();
        let drifted = is_drifted(status, payment, today - Duration::days(offset), None, today);
        prop_assert_eq!(drifted, payment == PaymentStatus::Pago && status.is_open());
    }

    #[test]
    fn prop_repair_clears_drift(
        status in prop::sample::select(vec![ServiceStatus::Pendente, ServiceStatus::EmAndamento]),
        offset in 1i64..400,
        tz in timezone(),
        paid_hours in prop::option::of(0i64..2000),
    ) {
        let today = base_date();
        let mut record = sample_record(OrganizationId::new(), today - Duration::days(offset));
        record.status = status;
        record.payment_status = PaymentStatus::Pago;
        record.payment_date = paid_hours.map(|h| Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h));
        prop_assert!(record.is_drifted(today));

        let repair = plan_repair(&record, tz);
        prop_assert!(repair.apply_to(&mut record));
        prop_assert!(!record.is_drifted(today));
        prop_assert!(!repair.apply_to(&mut record));
    }

    #[test]
    fn prop_end_of_day_stays_on_local_date(offset in -2000i64..2000, tz in timezone()) {
        let date = base_date() + Duration::days(offset);
        let instant = end_of_day(date, tz);
        prop_assert_eq!(instant.with_timezone(&tz).date_naive(), date);
    }
}
