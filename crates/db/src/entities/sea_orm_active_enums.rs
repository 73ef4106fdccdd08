//! Postgres enum types and their domain counterparts.

use fieldops_core::service::{PaymentStatus as DomainPaymentStatus, ServiceStatus as DomainServiceStatus};
use fieldops_core::tenancy::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Organization admin.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}

/// `service_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "service_status")]
pub enum ServiceStatus {
    /// Scheduled.
    #[sea_orm(string_value = "pendente")]
    Pendente,
    /// In progress.
    #[sea_orm(string_value = "em_andamento")]
    EmAndamento,
    /// Done.
    #[sea_orm(string_value = "concluido")]
    Concluido,
    /// Cancelled.
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

/// `payment_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Unpaid.
    #[sea_orm(string_value = "pendente")]
    Pendente,
    /// Paid in full.
    #[sea_orm(string_value = "pago")]
    Pago,
    /// Partially paid.
    #[sea_orm(string_value = "parcial")]
    Parcial,
    /// Charge cancelled.
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Member => Self::Member,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Member => Self::Member,
        }
    }
}

impl From<ServiceStatus> for DomainServiceStatus {
    fn from(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Pendente => Self::Pendente,
            ServiceStatus::EmAndamento => Self::EmAndamento,
            ServiceStatus::Concluido => Self::Concluido,
            ServiceStatus::Cancelado => Self::Cancelado,
        }
    }
}

impl From<DomainServiceStatus> for ServiceStatus {
    fn from(status: DomainServiceStatus) -> Self {
        match status {
            DomainServiceStatus::Pendente => Self::Pendente,
            DomainServiceStatus::EmAndamento => Self::EmAndamento,
            DomainServiceStatus::Concluido => Self::Concluido,
            DomainServiceStatus::Cancelado => Self::Cancelado,
        }
    }
}

impl From<PaymentStatus> for DomainPaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pendente => Self::Pendente,
            PaymentStatus::Pago => Self::Pago,
            PaymentStatus::Parcial => Self::Parcial,
            PaymentStatus::Cancelado => Self::Cancelado,
        }
    }
}

impl From<DomainPaymentStatus> for PaymentStatus {
    fn from(status: DomainPaymentStatus) -> Self {
        match status {
            DomainPaymentStatus::Pendente => Self::Pendente,
            DomainPaymentStatus::Pago => Self::Pago,
            DomainPaymentStatus::Parcial => Self::Parcial,
            DomainPaymentStatus::Cancelado => Self::Cancelado,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_spelling_matches_domain() {
        for status in DomainServiceStatus::ALL {
            let db = ServiceStatus::from(status);
            assert_eq!(db.to_value(), status.as_str());
            assert_eq!(DomainServiceStatus::from(db), status);
        }
        for status in DomainPaymentStatus::ALL {
            let db = PaymentStatus::from(status);
            assert_eq!(db.to_value(), status.as_str());
            assert_eq!(DomainPaymentStatus::from(db), status);
        }
        for role in [Role::Admin, Role::Member] {
            assert_eq!(UserRole::from(role).to_value(), role.as_str());
        }
    }
}
