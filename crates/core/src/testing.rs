//! In-memory store used by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fieldops_shared::types::{
    Amount, ClientId, OrganizationId, ServiceRecordId, TechnicianId, UserId,
};
use rust_decimal_macros::dec;

use crate::calendar::{MonthRange, ServiceProjection};
use crate::lifecycle::Repair;
use crate::service::{
    NewServiceRecord, PaymentStatus, ServiceRecord, ServiceRecordChanges, ServiceStatus,
};
use crate::store::{
    MembershipStore, OrganizationStore, ProjectionStore, ReferenceStore, ServiceRecordStore,
    StoreError,
};
use crate::tenancy::{Member, Membership, NewOrganization, Organization, Role};

const CLIENT_NAME: &str = "Padaria Central";
const TECHNICIAN_NAME: &str = "José da Silva";
const TECHNICIAN_NICKNAME: &str = "Zé";

/// A pending record of 100.00 for a fresh client and technician.
pub fn sample_record(organization_id: OrganizationId, date: NaiveDate) -> ServiceRecord {
    let now = Utc::now();
    ServiceRecord {
        id: ServiceRecordId::new(),
        organization_id,
        client_id: ClientId::new(),
        technician_id: TechnicianId::new(),
        date,
        gross_value: Amount::new(dec!(100.00)).unwrap(),
        status: ServiceStatus::Pendente,
        payment_status: PaymentStatus::Pendente,
        payment_date: None,
        completed_date: None,
        has_invoice: false,
        description: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, Member>,
    organizations: Vec<Organization>,
    clients: HashMap<ClientId, String>,
    technicians: HashMap<TechnicianId, (String, Option<String>)>,
    records: Vec<ServiceRecord>,
    fail_promotions: bool,
    fail_candidates: bool,
    failing_repairs: HashSet<ServiceRecordId>,
    racing_repairs: HashSet<ServiceRecordId>,
}

impl State {
    fn member_in(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<&mut Member, StoreError> {
        self.users
            .get_mut(&user_id)
            .filter(|m| m.belongs_to(organization_id))
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))
    }
}

/// Shared in-memory store implementing every store trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Adds an active, un-onboarded user.
    pub fn add_user(&self) -> UserId {
        self.add_user_with_email(&format!("{}@example.com", UserId::new()))
    }

    /// Adds an active, un-onboarded user with `email`.
    pub fn add_user_with_email(&self, email: &str) -> UserId {
        let id = UserId::new();
        self.state().users.insert(
            id,
            Member {
                user_id: id,
                display_name: "Test User".to_string(),
                email: Some(email.to_string()),
                phone: None,
                organization_id: None,
                role: Role::Member,
                active: true,
            },
        );
        id
    }

    /// Adds an active user already in `organization_id`.
    pub fn add_member(&self, organization_id: OrganizationId, role: Role) -> UserId {
        let id = self.add_user();
        if let Some(member) = self.state().users.get_mut(&id) {
            member.organization_id = Some(organization_id);
            member.role = role;
        }
        id
    }

    /// Current state of a user.
    pub fn member(&self, id: UserId) -> Option<Member> {
        self.state().users.get(&id).cloned()
    }

    /// Soft-deletes a user.
    pub fn deactivate_user(&self, id: UserId) {
        if let Some(member) = self.state().users.get_mut(&id) {
            member.active = false;
        }
    }

    /// Makes every subsequent `promote_to_admin` fail.
    pub fn fail_promotions(&self) {
        self.state().fail_promotions = true;
    }

    /// Makes every subsequent `drift_candidates` fail.
    pub fn fail_candidates(&self) {
        self.state().fail_candidates = true;
    }

    /// Makes `apply_repair` fail for `id`.
    pub fn fail_repair_for(&self, id: ServiceRecordId) {
        self.state().failing_repairs.insert(id);
    }

    /// Simulates a concurrent run repairing `id` just before this one writes.
    pub fn race_repair_for(&self, id: ServiceRecordId) {
        self.state().racing_repairs.insert(id);
    }

    /// Number of organizations stored.
    pub fn organization_count(&self) -> usize {
        self.state().organizations.len()
    }

    /// Adds an active organization.
    pub fn add_organization(&self, timezone: &str, onboarded: bool) -> OrganizationId {
        let id = OrganizationId::new();
        self.state().organizations.push(Organization {
            id,
            name: format!("Org {id}"),
            slug: id.to_string(),
            timezone: timezone.to_string(),
            active: true,
            onboarding_completo: onboarded,
            created_at: Utc::now(),
        });
        id
    }

    /// Marks an organization inactive.
    pub fn deactivate_organization(&self, id: OrganizationId) {
        if let Some(org) = self
            .state()
            .organizations
            .iter_mut()
            .find(|o| o.id == id)
        {
            org.active = false;
        }
    }

    /// Adds a client.
    pub fn add_client(&self) -> ClientId {
        let id = ClientId::new();
        self.state().clients.insert(id, CLIENT_NAME.to_string());
        id
    }

    /// Adds a technician with a nickname.
    pub fn add_technician(&self) -> TechnicianId {
        let id = TechnicianId::new();
        self.state().technicians.insert(
            id,
            (
                TECHNICIAN_NAME.to_string(),
                Some(TECHNICIAN_NICKNAME.to_string()),
            ),
        );
        id
    }

    /// Stores a record as is, registering its client and technician.
    pub fn insert_raw_record(&self, record: ServiceRecord) -> ServiceRecordId {
        let id = record.id;
        let mut state = self.state();
        state
            .clients
            .entry(record.client_id)
            .or_insert_with(|| CLIENT_NAME.to_string());
        state.technicians.entry(record.technician_id).or_insert_with(|| {
            (
                TECHNICIAN_NAME.to_string(),
                Some(TECHNICIAN_NICKNAME.to_string()),
            )
        });
        state.records.push(record);
        id
    }

    /// Current state of a record.
    pub fn record(&self, id: ServiceRecordId) -> Option<ServiceRecord> {
        self.state().records.iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn get_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .state()
            .users
            .get(&user_id)
            .and_then(Member::membership))
    }

    async fn promote_to_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        if state.fail_promotions {
            return Err(StoreError::Backend("injected promotion failure".into()));
        }
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        if user.organization_id.is_some() {
            return Err(StoreError::Conflict(format!("user {user_id} already onboarded")));
        }
        user.organization_id = Some(organization_id);
        user.role = Role::Admin;
        Ok(())
    }

    async fn find_member(&self, user_id: UserId) -> Result<Option<Member>, StoreError> {
        Ok(self.member(user_id))
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        Ok(self
            .state()
            .users
            .values()
            .find(|m| {
                m.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn assign(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        if user.organization_id.is_some() {
            return Err(StoreError::Conflict(format!("user {user_id} already onboarded")));
        }
        user.organization_id = Some(organization_id);
        user.role = role;
        Ok(())
    }

    async fn clear(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        let user = state.member_in(user_id, organization_id)?;
        user.organization_id = None;
        user.role = Role::Member;
        Ok(())
    }

    async fn set_role(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError> {
        self.state().member_in(user_id, organization_id)?.role = role;
        Ok(())
    }

    async fn set_active(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        active: bool,
    ) -> Result<(), StoreError> {
        self.state().member_in(user_id, organization_id)?.active = active;
        Ok(())
    }

    async fn list_members(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .state()
            .users
            .values()
            .filter(|m| m.belongs_to(organization_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        Ok(self
            .state()
            .organizations
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.state().organizations.iter().any(|o| o.slug == slug))
    }

    async fn insert_organization(
        &self,
        new: &NewOrganization,
    ) -> Result<Organization, StoreError> {
        let organization = Organization {
            id: OrganizationId::new(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            timezone: new.timezone.clone(),
            active: true,
            onboarding_completo: false,
            created_at: Utc::now(),
        };
        self.state().organizations.push(organization.clone());
        Ok(organization)
    }

    async fn delete_organization(&self, id: OrganizationId) -> Result<(), StoreError> {
        self.state().organizations.retain(|o| o.id != id);
        Ok(())
    }

    async fn active_organization_ids(&self) -> Result<Vec<OrganizationId>, StoreError> {
        Ok(self
            .state()
            .organizations
            .iter()
            .filter(|o| o.active)
            .map(|o| o.id)
            .collect())
    }
}

#[async_trait]
impl ReferenceStore for InMemoryStore {
    async fn client_exists(&self, id: ClientId) -> Result<bool, StoreError> {
        Ok(self.state().clients.contains_key(&id))
    }

    async fn technician_exists(&self, id: TechnicianId) -> Result<bool, StoreError> {
        Ok(self.state().technicians.contains_key(&id))
    }
}

#[async_trait]
impl ServiceRecordStore for InMemoryStore {
    async fn insert_record(&self, new: &NewServiceRecord) -> Result<ServiceRecord, StoreError> {
        let now = Utc::now();
        let record = ServiceRecord {
            id: ServiceRecordId::new(),
            organization_id: new.organization_id,
            client_id: new.client_id,
            technician_id: new.technician_id,
            date: new.date,
            gross_value: new.gross_value,
            status: new.status,
            payment_status: new.payment_status,
            payment_date: new.payment_date,
            completed_date: None,
            has_invoice: new.has_invoice,
            description: new.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state().records.push(record.clone());
        Ok(record)
    }

    async fn find_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
    ) -> Result<Option<ServiceRecord>, StoreError> {
        Ok(self
            .state()
            .records
            .iter()
            .find(|r| r.id == id && r.organization_id == organization_id)
            .cloned())
    }

    async fn update_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
        changes: &ServiceRecordChanges,
    ) -> Result<Option<ServiceRecord>, StoreError> {
        let mut state = self.state();
        let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.id == id && r.organization_id == organization_id)
        else {
            return Ok(None);
        };
        changes.apply_to(record);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn drift_candidates(
        &self,
        organization_id: OrganizationId,
        today: NaiveDate,
    ) -> Result<Vec<ServiceRecord>, StoreError> {
        let state = self.state();
        if state.fail_candidates {
            return Err(StoreError::Backend("injected candidate failure".into()));
        }
        Ok(state
            .records
            .iter()
            .filter(|r| r.organization_id == organization_id && r.is_drifted(today))
            .cloned()
            .collect())
    }

    async fn apply_repair(&self, repair: &Repair) -> Result<bool, StoreError> {
        let mut state = self.state();
        if state.failing_repairs.contains(&repair.record_id) {
            return Err(StoreError::Backend("injected repair failure".into()));
        }
        let racing = state.racing_repairs.remove(&repair.record_id);
        let Some(record) = state.records.iter_mut().find(|r| r.id == repair.record_id) else {
            return Ok(false);
        };
        if racing {
            repair.apply_to(record);
        }
        Ok(repair.apply_to(record))
    }
}

#[async_trait]
impl ProjectionStore for InMemoryStore {
    async fn month_projection(
        &self,
        organization_id: OrganizationId,
        range: MonthRange,
    ) -> Result<Vec<ServiceProjection>, StoreError> {
        let state = self.state();
        let mut rows: Vec<ServiceProjection> = state
            .records
            .iter()
            .filter(|r| r.organization_id == organization_id && range.contains(r.date))
            .map(|r| {
                let (technician_full_name, technician_nickname) = state
                    .technicians
                    .get(&r.technician_id)
                    .cloned()
                    .unwrap_or_default();
                ServiceProjection {
                    id: r.id,
                    date: r.date,
                    gross_value: r.gross_value,
                    has_invoice: r.has_invoice,
                    status: r.status,
                    payment_status: r.payment_status,
                    client_name: state
                        .clients
                        .get(&r.client_id)
                        .cloned()
                        .unwrap_or_default(),
                    technician_full_name,
                    technician_nickname,
                }
            })
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}
