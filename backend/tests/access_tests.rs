//! Access state machine tests
//!
//! Covers how a persisted profile maps to a state, the transition table,
//! page routing and the buy-action gate.

use proptest::prelude::*;
use shared::{
    AccessError, AccessEvent, AccessState, ApprovalStatus, Page, ProfileSnapshot, UserRole,
};

fn snapshot(role: UserRole, completed: bool, status: Option<ApprovalStatus>) -> ProfileSnapshot {
    ProfileSnapshot {
        role,
        onboarding_completed: completed,
        approval_status: status,
    }
}

const ALL_STATES: [AccessState; 7] = [
    AccessState::Unauthenticated,
    AccessState::ProfileMissing,
    AccessState::OnboardingInProgress,
    AccessState::SellerActive,
    AccessState::BuyerPending,
    AccessState::BuyerApproved,
    AccessState::BuyerRejected,
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_login_without_profile_goes_to_onboarding() {
        let state = AccessState::Unauthenticated
            .transition(AccessEvent::Authenticated { profile: None })
            .unwrap();
        assert_eq!(state, AccessState::ProfileMissing);
        assert_eq!(state.home_page(), Page::Onboarding);
    }

    #[test]
    fn test_login_with_profile_skips_onboarding() {
        let profile = snapshot(UserRole::BuyerBusiness, true, Some(ApprovalStatus::Approved));
        let state = AccessState::Unauthenticated
            .transition(AccessEvent::Authenticated {
                profile: Some(profile),
            })
            .unwrap();
        assert_eq!(state, AccessState::BuyerApproved);
    }

    #[test]
    fn test_full_buyer_lifecycle() {
        let state = AccessState::ProfileMissing
            .transition(AccessEvent::BeginOnboarding)
            .and_then(|s| {
                s.transition(AccessEvent::CompleteOnboarding {
                    role: UserRole::BuyerBusiness,
                })
            })
            .unwrap();
        assert_eq!(state, AccessState::BuyerPending);
        assert!(!state.can_buy());
        assert!(state.can_browse());

        let approved = state
            .transition(AccessEvent::ReviewDecision {
                status: ApprovalStatus::Approved,
            })
            .unwrap();
        assert!(approved.can_buy());
    }

    #[test]
    fn test_rejected_buyer_cannot_be_reviewed_again() {
        let result = AccessState::BuyerRejected.transition(AccessEvent::ReviewDecision {
            status: ApprovalStatus::Approved,
        });
        assert!(matches!(result, Err(AccessError::InvalidTransition { .. })));
    }

    #[test]
    fn test_begin_onboarding_only_from_profile_missing() {
        assert!(AccessState::OnboardingInProgress
            .transition(AccessEvent::BeginOnboarding)
            .is_err());
        assert!(AccessState::SellerActive
            .transition(AccessEvent::BeginOnboarding)
            .is_err());
    }

    #[test]
    fn test_buyer_without_status_is_still_onboarding() {
        let state = AccessState::from_profile(Some(&snapshot(UserRole::BuyerBusiness, true, None)));
        assert_eq!(state, AccessState::OnboardingInProgress);
    }

    #[test]
    fn test_dashboards_redirect_to_own_side() {
        assert_eq!(
            AccessState::SellerActive.resolve(Page::BuyerDashboard),
            Page::SellerDashboard
        );
        assert_eq!(
            AccessState::BuyerPending.resolve(Page::SellerDashboard),
            Page::BuyerDashboard
        );
        assert_eq!(
            AccessState::ProfileMissing.resolve(Page::BuyerDashboard),
            Page::Onboarding
        );
        assert_eq!(
            AccessState::Unauthenticated.resolve(Page::SellerDashboard),
            Page::Welcome
        );
    }

    #[test]
    fn test_pending_buyer_sees_review_notice() {
        let decision = AccessState::BuyerPending.decide(Some(Page::BuyerDashboard));
        assert_eq!(decision.page, Page::BuyerDashboard);
        assert!(!decision.can_buy);
        let notice = decision.notice.unwrap();
        assert_eq!(notice.status, ApprovalStatus::Pending);
        assert!(notice.document_under_review);
    }

    #[test]
    fn test_guest_decision() {
        let decision = shared::AccessDecision::guest();
        assert_eq!(decision.state, AccessState::Unauthenticated);
        assert_eq!(decision.page, Page::Welcome);
        assert!(!decision.can_buy);
        assert!(!decision.can_browse);
        assert!(decision.notice.is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn role_strategy() -> impl Strategy<Value = UserRole> {
        prop::sample::select(vec![
            UserRole::SellerPersonal,
            UserRole::SellerBusiness,
            UserRole::BuyerBusiness,
        ])
    }

    fn status_strategy() -> impl Strategy<Value = Option<ApprovalStatus>> {
        prop::option::of(prop::sample::select(vec![
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ]))
    }

    fn state_strategy() -> impl Strategy<Value = AccessState> {
        prop::sample::select(ALL_STATES.to_vec())
    }

    fn page_strategy() -> impl Strategy<Value = Page> {
        prop::sample::select(vec![
            Page::Welcome,
            Page::Onboarding,
            Page::SellerDashboard,
            Page::BuyerDashboard,
        ])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Sellers are active as soon as onboarding completes, whatever the stored status
        #[test]
        fn prop_sellers_active_after_onboarding(
            role in role_strategy().prop_filter("seller", |r| r.is_seller()),
            status in status_strategy(),
        ) {
            let state = AccessState::from_profile(Some(&snapshot(role, true, status)));
            prop_assert_eq!(state, AccessState::SellerActive);
            prop_assert!(state.can_buy());

            let via_events = AccessState::OnboardingInProgress
                .transition(AccessEvent::CompleteOnboarding { role })
                .unwrap();
            prop_assert_eq!(via_events, AccessState::SellerActive);
        }

        /// A buyer may buy if and only if approved
        #[test]
        fn prop_buyer_can_buy_iff_approved(status in status_strategy()) {
            let state = AccessState::from_profile(Some(&snapshot(UserRole::BuyerBusiness, true, status)));
            prop_assert_eq!(state.can_buy(), status == Some(ApprovalStatus::Approved));
        }

        /// Incomplete profiles never buy
        #[test]
        fn prop_incomplete_profiles_cannot_buy(role in role_strategy(), status in status_strategy()) {
            let state = AccessState::from_profile(Some(&snapshot(role, false, status)));
            prop_assert_eq!(state, AccessState::OnboardingInProgress);
            prop_assert!(!state.can_buy());
        }

        /// Logout is accepted from every state
        #[test]
        fn prop_logout_always_succeeds(state in state_strategy()) {
            prop_assert_eq!(
                state.transition(AccessEvent::Logout),
                Ok(AccessState::Unauthenticated)
            );
        }

        /// Resolution is idempotent and lands on a page the state may see
        #[test]
        fn prop_resolve_is_stable(state in state_strategy(), page in page_strategy()) {
            let resolved = state.resolve(page);
            prop_assert_eq!(state.resolve(resolved), resolved);
            prop_assert!(resolved == page || resolved == state.home_page());
        }

        /// The buy gate and its error agree
        #[test]
        fn prop_ensure_can_buy_matches_flag(state in state_strategy()) {
            prop_assert_eq!(state.ensure_can_buy().is_ok(), state.can_buy());
        }
    }
}
