//! Property-based tests for the authorization guard.

use fieldops_shared::types::{OrganizationId, UserId};
use proptest::prelude::*;
use uuid::Uuid;

use crate::tenancy::guard::{AuthorizationGuard, Decision, DenyReason, MemberChange};
use crate::tenancy::types::{Membership, Role};

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Member)]
}

fn arb_org() -> impl Strategy<Value = OrganizationId> {
    any::<u128>().prop_map(|n| OrganizationId::from_uuid(Uuid::from_u128(n)))
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn arb_required() -> impl Strategy<Value = Option<Role>> {
    prop_oneof![Just(None), arb_role().prop_map(Some)]
}

fn arb_change() -> impl Strategy<Value = MemberChange> {
    prop_oneof![
        Just(MemberChange::Remove),
        arb_role().prop_map(MemberChange::ChangeRole),
        any::<bool>().prop_map(MemberChange::SetActive),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Inactive members are denied whatever their role or organization.
    #[test]
    fn prop_inactive_always_denied(
        member_org in arb_org(),
        target_org in arb_org(),
        same_org in any::<bool>(),
        role in arb_role(),
        required in arb_required(),
    ) {
        let target = if same_org { member_org } else { target_org };
        let m = Membership { organization_id: member_org, role, active: false };

        prop_assert_eq!(
            AuthorizationGuard::authorize(Some(&m), target, required),
            Decision::Deny(DenyReason::Inactive)
        );
    }

    /// A member of O1 is denied everything scoped to O2.
    #[test]
    fn prop_cross_tenant_always_denied(
        o1 in arb_org(),
        o2 in arb_org(),
        role in arb_role(),
        required in arb_required(),
        caller in arb_user(),
        target in arb_user(),
        change in arb_change(),
    ) {
        prop_assume!(o1 != o2);
        let m = Membership { organization_id: o1, role, active: true };

        prop_assert!(!AuthorizationGuard::authorize(Some(&m), o2, required).is_allowed());
        prop_assert!(
            !AuthorizationGuard::authorize_member_change(caller, Some(&m), o2, target, change)
                .is_allowed()
        );
    }

    /// Removing oneself is forbidden for every admin.
    #[test]
    fn prop_self_removal_forbidden(org in arb_org(), admin in arb_user()) {
        let m = Membership { organization_id: org, role: Role::Admin, active: true };

        prop_assert_eq!(
            AuthorizationGuard::authorize_member_change(admin, Some(&m), org, admin, MemberChange::Remove),
            Decision::Deny(DenyReason::SelfRemoval)
        );
    }

    /// Without a role requirement, any active member of the organization passes.
    #[test]
    fn prop_active_member_allowed_in_own_org(org in arb_org(), role in arb_role()) {
        let m = Membership { organization_id: org, role, active: true };
        prop_assert!(AuthorizationGuard::authorize(Some(&m), org, None).is_allowed());
    }
}
