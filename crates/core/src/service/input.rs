//! Request payloads for service records and their validation.

use chrono::{DateTime, NaiveDate, Utc};
use fieldops_shared::types::{Amount, ClientId, OrganizationId, TechnicianId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::service::error::ServiceRecordError;
use crate::service::types::{
    NewServiceRecord, PaymentStatus, ServiceRecordChanges, ServiceStatus,
};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses a stored calendar date from its literal `YYYY-MM-DD` prefix.
///
/// A value such as `2024-03-01T23:30:00-03:00` is March 1st: the date part is
/// read as written and never shifted through a UTC instant.
///
/// # Errors
///
/// Returns `ServiceRecordError::Invalid` for anything else.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, ServiceRecordError> {
    let trimmed = value.trim();
    let literal = trimmed.get(..10).unwrap_or(trimmed);
    let rest = trimmed.get(10..).unwrap_or("");
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return Err(ServiceRecordError::invalid(
            "date",
            format!("`{value}` is not a YYYY-MM-DD date"),
        ));
    }

    NaiveDate::parse_from_str(literal, "%Y-%m-%d").map_err(|_| {
        ServiceRecordError::invalid("date", format!("`{value}` is not a YYYY-MM-DD date"))
    })
}

fn parse_amount(value: Decimal) -> Result<Amount, ServiceRecordError> {
    Amount::new(value).map_err(|e| ServiceRecordError::invalid("gross_value", e.to_string()))
}

fn parse_status(value: &str) -> Result<ServiceStatus, ServiceRecordError> {
    ServiceStatus::parse(value).ok_or_else(|| {
        ServiceRecordError::invalid(
            "status",
            format!("`{value}` is not one of pendente, em_andamento, concluido, cancelado"),
        )
    })
}

fn parse_payment_status(value: &str) -> Result<PaymentStatus, ServiceRecordError> {
    PaymentStatus::parse(value).ok_or_else(|| {
        ServiceRecordError::invalid(
            "payment_status",
            format!("`{value}` is not one of pendente, pago, parcial, cancelado"),
        )
    })
}

/// Payload for creating a service record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRecordInput {
    /// Client served.
    pub client_id: Uuid,
    /// Technician assigned.
    pub technician_id: Uuid,
    /// Calendar day (`YYYY-MM-DD`).
    pub date: String,
    /// Billed amount, must not be negative.
    pub gross_value: Decimal,
    /// Initial status, defaults to `pendente`.
    #[serde(default)]
    pub status: Option<String>,
    /// Initial payment status, defaults to `pendente`.
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Payment instant.
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    /// Invoice issued.
    #[serde(default)]
    pub has_invoice: bool,
    /// Notes.
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateServiceRecordInput {
    /// Validates the payload for `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceRecordError::Invalid` naming the first bad field.
    pub fn validate(
        self,
        organization_id: OrganizationId,
    ) -> Result<NewServiceRecord, ServiceRecordError> {
        Ok(NewServiceRecord {
            organization_id,
            client_id: ClientId::from_uuid(self.client_id),
            technician_id: TechnicianId::from_uuid(self.technician_id),
            date: parse_calendar_date(&self.date)?,
            gross_value: parse_amount(self.gross_value)?,
            status: self
                .status
                .as_deref()
                .map_or(Ok(ServiceStatus::Pendente), parse_status)?,
            payment_status: self
                .payment_status
                .as_deref()
                .map_or(Ok(PaymentStatus::Pendente), parse_payment_status)?,
            payment_date: self.payment_date,
            has_invoice: self.has_invoice,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Payload for a partial update. An explicit `null` clears nullable columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceRecordInput {
    /// New client.
    #[serde(default)]
    pub client_id: Option<Uuid>,
    /// New technician.
    #[serde(default)]
    pub technician_id: Option<Uuid>,
    /// New calendar day.
    #[serde(default)]
    pub date: Option<String>,
    /// New amount.
    #[serde(default)]
    pub gross_value: Option<Decimal>,
    /// New status.
    #[serde(default)]
    pub status: Option<String>,
    /// New payment status.
    #[serde(default)]
    pub payment_status: Option<String>,
    /// New or cleared payment instant.
    #[serde(default, deserialize_with = "double_option")]
    pub payment_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared completion instant.
    #[serde(default, deserialize_with = "double_option")]
    pub completed_date: Option<Option<DateTime<Utc>>>,
    /// New invoice flag.
    #[serde(default)]
    pub has_invoice: Option<bool>,
    /// New or cleared notes.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateServiceRecordInput {
    /// Validates the payload into a change set.
    ///
    /// # Errors
    ///
    /// Returns `ServiceRecordError::Invalid` for a bad field and
    /// `ServiceRecordError::EmptyUpdate` if nothing would change.
    pub fn validate(self) -> Result<ServiceRecordChanges, ServiceRecordError> {
        let changes = ServiceRecordChanges {
            client_id: self.client_id.map(ClientId::from_uuid),
            technician_id: self.technician_id.map(TechnicianId::from_uuid),
            date: self.date.as_deref().map(parse_calendar_date).transpose()?,
            gross_value: self.gross_value.map(parse_amount).transpose()?,
            status: self.status.as_deref().map(parse_status).transpose()?,
            payment_status: self
                .payment_status
                .as_deref()
                .map(parse_payment_status)
                .transpose()?,
            payment_date: self.payment_date,
            completed_date: self.completed_date,
            has_invoice: self.has_invoice,
            description: self.description,
        };

        if changes.is_empty() {
            return Err(ServiceRecordError::EmptyUpdate);
        }
        Ok(changes)
    }
}
