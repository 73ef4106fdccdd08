//! Service record domain types.
//!
//! A record carries two status axes that evolve independently: fulfillment
//! (`ServiceStatus`) and payment (`PaymentStatus`). Both are closed sets;
//! the wire and database spellings are the Portuguese snake_case names.

use chrono::{DateTime, NaiveDate, Utc};
use fieldops_shared::types::{Amount, ClientId, OrganizationId, ServiceRecordId, TechnicianId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Scheduled, not started.
    Pendente,
    /// Work in progress.
    EmAndamento,
    /// Work finished.
    Concluido,
    /// Service cancelled.
    Cancelado,
}

impl ServiceStatus {
    /// All variants.
    pub const ALL: [Self; 4] = [
        Self::Pendente,
        Self::EmAndamento,
        Self::Concluido,
        Self::Cancelado,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::EmAndamento => "em_andamento",
            Self::Concluido => "concluido",
            Self::Cancelado => "cancelado",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendente" => Some(Self::Pendente),
            "em_andamento" => Some(Self::EmAndamento),
            "concluido" => Some(Self::Concluido),
            "cancelado" => Some(Self::Cancelado),
            _ => None,
        }
    }

    /// Returns true once the lifecycle does not move further.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluido | Self::Cancelado)
    }

    /// Returns true for the states the reconciliation engine may promote.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pendente | Self::EmAndamento)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not paid yet.
    Pendente,
    /// Fully paid.
    Pago,
    /// Partially paid.
    Parcial,
    /// Charge cancelled.
    Cancelado,
}

impl PaymentStatus {
    /// All variants.
    pub const ALL: [Self; 4] = [Self::Pendente, Self::Pago, Self::Parcial, Self::Cancelado];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Pago => "pago",
            Self::Parcial => "parcial",
            Self::Cancelado => "cancelado",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendente" => Some(Self::Pendente),
            "pago" => Some(Self::Pago),
            "parcial" => Some(Self::Parcial),
            "cancelado" => Some(Self::Cancelado),
            _ => None,
        }
    }

    /// Returns true once the lifecycle does not move further.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Pago | Self::Cancelado)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billable service performed for a client by a technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    /// Record ID.
    pub id: ServiceRecordId,
    /// Owning organization, fixed at creation.
    pub organization_id: OrganizationId,
    /// Client served.
    pub client_id: ClientId,
    /// Technician who performed the work.
    pub technician_id: TechnicianId,
    /// Calendar day of the service.
    pub date: NaiveDate,
    /// Billed amount.
    pub gross_value: Amount,
    /// Fulfillment axis.
    pub status: ServiceStatus,
    /// Payment axis.
    pub payment_status: PaymentStatus,
    /// When payment was received.
    pub payment_date: Option<DateTime<Utc>>,
    /// When the work was completed.
    pub completed_date: Option<DateTime<Utc>>,
    /// Whether an invoice was issued.
    pub has_invoice: bool,
    /// Free-form notes.
    pub description: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// A validated record ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRecord {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Client served.
    pub client_id: ClientId,
    /// Technician.
    pub technician_id: TechnicianId,
    /// Calendar day.
    pub date: NaiveDate,
    /// Billed amount.
    pub gross_value: Amount,
    /// Initial fulfillment status.
    pub status: ServiceStatus,
    /// Initial payment status.
    pub payment_status: PaymentStatus,
    /// Payment instant, if already paid.
    pub payment_date: Option<DateTime<Utc>>,
    /// Whether an invoice was issued.
    pub has_invoice: bool,
    /// Free-form notes.
    pub description: Option<String>,
}

/// A validated partial update. `None` leaves a column untouched; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRecordChanges {
    /// New client.
    pub client_id: Option<ClientId>,
    /// New technician.
    pub technician_id: Option<TechnicianId>,
    /// New calendar day.
    pub date: Option<NaiveDate>,
    /// New amount.
    pub gross_value: Option<Amount>,
    /// New fulfillment status.
    pub status: Option<ServiceStatus>,
    /// New payment status.
    pub payment_status: Option<PaymentStatus>,
    /// New or cleared payment instant.
    pub payment_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared completion instant.
    pub completed_date: Option<Option<DateTime<Utc>>>,
    /// New invoice flag.
    pub has_invoice: Option<bool>,
    /// New or cleared notes.
    pub description: Option<Option<String>>,
}

impl ServiceRecordChanges {
    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the changes to an in-memory record.
    pub fn apply_to(&self, record: &mut ServiceRecord) {
        if let Some(v) = self.client_id {
            record.client_id = v;
        }
        if let Some(v) = self.technician_id {
            record.technician_id = v;
        }
        if let Some(v) = self.date {
            record.date = v;
        }
        if let Some(v) = self.gross_value {
            record.gross_value = v;
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.payment_status {
            record.payment_status = v;
        }
        if let Some(v) = self.payment_date {
            record.payment_date = v;
        }
        if let Some(v) = self.completed_date {
            record.completed_date = v;
        }
        if let Some(v) = self.has_invoice {
            record.has_invoice = v;
        }
        if let Some(v) = &self.description {
            record.description.clone_from(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in ServiceStatus::ALL {
            assert_eq!(ServiceStatus::parse(status.as_str()), Some(status));
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        for status in PaymentStatus::ALL {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        assert_eq!(ServiceStatus::parse("done"), None);
        assert_eq!(PaymentStatus::parse("paid"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ServiceStatus::Pendente.is_terminal());
        assert!(!ServiceStatus::EmAndamento.is_terminal());
        assert!(ServiceStatus::Concluido.is_terminal());
        assert!(ServiceStatus::Cancelado.is_terminal());

        assert!(!PaymentStatus::Pendente.is_terminal());
        assert!(!PaymentStatus::Parcial.is_terminal());
        assert!(PaymentStatus::Pago.is_terminal());
        assert!(PaymentStatus::Cancelado.is_terminal());
    }

    #[test]
    fn test_empty_changes() {
        assert!(ServiceRecordChanges::default().is_empty());
        let changes = ServiceRecordChanges {
            completed_date: Some(None),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
