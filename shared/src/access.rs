//! Access state machine for onboarding and marketplace gating
//!
//! Decides, from a user's persisted profile, which page the user may reach and
//! whether the buy action is enabled.
//!
//! ```text
//! Unauthenticated ──▶ ProfileMissing ──▶ OnboardingInProgress
//!                                              │
//!                     ┌────────────────────────┴───────────┐
//!                     ▼                                    ▼
//!               SellerActive                         BuyerPending
//!                                                  │             │
//!                                                  ▼             ▼
//!                                           BuyerApproved  BuyerRejected
//!
//! any state ──(logout)──▶ Unauthenticated
//! ```
//!
//! Reviewer decisions are made outside this system and only become visible
//! when the profile is read again, so `AccessState::from_profile` is the entry
//! point on every page load and `transition` covers in-session events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ApprovalStatus, UserProfile, UserRole};
use crate::types::LocalizedText;

/// Where a user stands in the onboarding and approval lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Unauthenticated,
    ProfileMissing,
    OnboardingInProgress,
    SellerActive,
    BuyerPending,
    BuyerApproved,
    BuyerRejected,
}

/// The fields of a profile that drive access decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub role: UserRole,
    pub onboarding_completed: bool,
    pub approval_status: Option<ApprovalStatus>,
}

impl From<&UserProfile> for ProfileSnapshot {
    fn from(profile: &UserProfile) -> Self {
        Self {
            role: profile.role,
            onboarding_completed: profile.onboarding_completed,
            approval_status: profile.approval_status,
        }
    }
}

/// In-session events that move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    /// External authentication succeeded; carries the profile lookup result
    Authenticated { profile: Option<ProfileSnapshot> },
    BeginOnboarding,
    CompleteOnboarding { role: UserRole },
    /// A reviewer decision observed on the next profile read
    ReviewDecision { status: ApprovalStatus },
    Logout,
}

impl AccessEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AccessEvent::Authenticated { .. } => "authenticated",
            AccessEvent::BeginOnboarding => "begin_onboarding",
            AccessEvent::CompleteOnboarding { .. } => "complete_onboarding",
            AccessEvent::ReviewDecision { .. } => "review_decision",
            AccessEvent::Logout => "logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("cannot apply {event} in state {from}")]
    InvalidTransition {
        from: AccessState,
        event: &'static str,
    },

    #[error("purchases are not enabled in state {state}")]
    PurchaseNotPermitted { state: AccessState },

    #[error("only active sellers can publish listings (state {state})")]
    PublishNotPermitted { state: AccessState },
}

/// Pages the UI can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Welcome,
    Onboarding,
    SellerDashboard,
    BuyerDashboard,
}

impl AccessState {
    /// Derive the state from a profile lookup made on page load
    pub fn from_profile(profile: Option<&ProfileSnapshot>) -> Self {
        let Some(profile) = profile else {
            return AccessState::ProfileMissing;
        };

        if !profile.onboarding_completed {
            return AccessState::OnboardingInProgress;
        }

        if profile.role.is_seller() {
            return AccessState::SellerActive;
        }

        match profile.approval_status {
            // A buyer without a status has not finished onboarding
            None => AccessState::OnboardingInProgress,
            Some(ApprovalStatus::Pending) => AccessState::BuyerPending,
            Some(ApprovalStatus::Approved) => AccessState::BuyerApproved,
            Some(ApprovalStatus::Rejected) => AccessState::BuyerRejected,
        }
    }

    /// Derive the state for a request, whether or not it was authenticated
    pub fn for_session(authenticated: bool, profile: Option<&UserProfile>) -> Self {
        if !authenticated {
            return AccessState::Unauthenticated;
        }
        let snapshot = profile.map(ProfileSnapshot::from);
        Self::from_profile(snapshot.as_ref())
    }

    /// Apply an event, rejecting pairs outside the transition table
    pub fn transition(self, event: AccessEvent) -> Result<AccessState, AccessError> {
        use AccessEvent as E;
        use AccessState as S;

        let next = match (self, event) {
            (_, E::Logout) => S::Unauthenticated,
            (S::Unauthenticated, E::Authenticated { profile }) => Self::from_profile(profile.as_ref()),
            (S::ProfileMissing, E::BeginOnboarding) => S::OnboardingInProgress,
            (S::OnboardingInProgress, E::CompleteOnboarding { role }) if role.is_seller() => {
                S::SellerActive
            }
            (S::OnboardingInProgress, E::CompleteOnboarding { .. }) => S::BuyerPending,
            (S::BuyerPending, E::ReviewDecision { status }) => match status {
                ApprovalStatus::Pending => S::BuyerPending,
                ApprovalStatus::Approved => S::BuyerApproved,
                ApprovalStatus::Rejected => S::BuyerRejected,
            },
            (from, event) => {
                return Err(AccessError::InvalidTransition {
                    from,
                    event: event.name(),
                })
            }
        };

        Ok(next)
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AccessState::Unauthenticated)
    }

    pub fn is_buyer(&self) -> bool {
        matches!(
            self,
            AccessState::BuyerPending | AccessState::BuyerApproved | AccessState::BuyerRejected
        )
    }

    /// Only active sellers and approved buyers may execute the buy action
    pub fn can_buy(&self) -> bool {
        matches!(self, AccessState::SellerActive | AccessState::BuyerApproved)
    }

    /// Any finished profile may look at the marketplace
    pub fn can_browse(&self) -> bool {
        matches!(self, AccessState::SellerActive) || self.is_buyer()
    }

    pub fn can_publish_listings(&self) -> bool {
        matches!(self, AccessState::SellerActive)
    }

    pub fn ensure_can_buy(&self) -> Result<(), AccessError> {
        if self.can_buy() {
            Ok(())
        } else {
            Err(AccessError::PurchaseNotPermitted { state: *self })
        }
    }

    pub fn ensure_can_publish(&self) -> Result<(), AccessError> {
        if self.can_publish_listings() {
            Ok(())
        } else {
            Err(AccessError::PublishNotPermitted { state: *self })
        }
    }

    /// The page this state lands on
    pub fn home_page(&self) -> Page {
        match self {
            AccessState::Unauthenticated => Page::Welcome,
            AccessState::ProfileMissing | AccessState::OnboardingInProgress => Page::Onboarding,
            AccessState::SellerActive => Page::SellerDashboard,
            AccessState::BuyerPending | AccessState::BuyerApproved | AccessState::BuyerRejected => {
                Page::BuyerDashboard
            }
        }
    }

    /// Resolve a requested page to the page the user actually gets
    pub fn resolve(&self, requested: Page) -> Page {
        let allowed = match requested {
            Page::Welcome => true,
            Page::Onboarding => matches!(
                self,
                AccessState::ProfileMissing | AccessState::OnboardingInProgress
            ),
            Page::SellerDashboard => matches!(self, AccessState::SellerActive),
            Page::BuyerDashboard => self.is_buyer(),
        };

        if allowed {
            requested
        } else {
            self.home_page()
        }
    }

    /// Status explanation shown on the buyer dashboard
    pub fn approval_notice(&self) -> Option<ApprovalNotice> {
        let status = match self {
            AccessState::BuyerPending => ApprovalStatus::Pending,
            AccessState::BuyerApproved => ApprovalStatus::Approved,
            AccessState::BuyerRejected => ApprovalStatus::Rejected,
            _ => return None,
        };
        Some(ApprovalNotice::for_status(status))
    }

    /// Full routing and gating decision for the UI
    pub fn decide(&self, requested: Option<Page>) -> AccessDecision {
        AccessDecision {
            state: *self,
            page: requested.map_or_else(|| self.home_page(), |page| self.resolve(page)),
            can_buy: self.can_buy(),
            can_browse: self.can_browse(),
            can_publish_listings: self.can_publish_listings(),
            notice: self.approval_notice(),
        }
    }
}

impl std::fmt::Display for AccessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccessState::Unauthenticated => "unauthenticated",
            AccessState::ProfileMissing => "profile_missing",
            AccessState::OnboardingInProgress => "onboarding_in_progress",
            AccessState::SellerActive => "seller_active",
            AccessState::BuyerPending => "buyer_pending",
            AccessState::BuyerApproved => "buyer_approved",
            AccessState::BuyerRejected => "buyer_rejected",
        };
        f.write_str(name)
    }
}

/// Routing decision plus UI gating flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub state: AccessState,
    pub page: Page,
    pub can_buy: bool,
    pub can_browse: bool,
    pub can_publish_listings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<ApprovalNotice>,
}

impl AccessDecision {
    /// Decision used whenever authentication fails or is absent
    pub fn guest() -> Self {
        AccessState::Unauthenticated.decide(None)
    }
}

/// Approval explanation rendered in place of the buy action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalNotice {
    pub status: ApprovalStatus,
    pub title: LocalizedText,
    pub message: LocalizedText,
    /// The uploaded permit is still being reviewed
    pub document_under_review: bool,
}

impl ApprovalNotice {
    pub fn for_status(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => Self {
                status,
                title: LocalizedText::new("Verification pending", "Verificación Pendiente"),
                message: LocalizedText::new(
                    "Your permit is under review. You can buy waste once it is approved. \
                     This usually takes 24-48 hours.",
                    "Tu permiso está siendo revisado. Podrás comprar residuos una vez aprobado. \
                     Esto suele tomar 24-48 horas.",
                ),
                document_under_review: true,
            },
            ApprovalStatus::Approved => Self {
                status,
                title: LocalizedText::new("Account approved!", "¡Cuenta Aprobada!"),
                message: LocalizedText::new(
                    "Your permit has been verified. You can now buy waste on the platform.",
                    "Tu permiso ha sido verificado. Ya puedes comprar residuos en la plataforma.",
                ),
                document_under_review: false,
            },
            ApprovalStatus::Rejected => Self {
                status,
                title: LocalizedText::new("Permit rejected", "Permiso Rechazado"),
                message: LocalizedText::new(
                    "We could not verify your permit. Please contact support for more information.",
                    "No pudimos verificar tu permiso. Por favor contacta a soporte para más información.",
                ),
                document_under_review: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(role: UserRole, completed: bool, status: Option<ApprovalStatus>) -> ProfileSnapshot {
        ProfileSnapshot {
            role,
            onboarding_completed: completed,
            approval_status: status,
        }
    }

    #[test]
    fn test_from_profile() {
        assert_eq!(AccessState::from_profile(None), AccessState::ProfileMissing);
        assert_eq!(
            AccessState::from_profile(Some(&snapshot(UserRole::SellerPersonal, false, None))),
            AccessState::OnboardingInProgress
        );
        assert_eq!(
            AccessState::from_profile(Some(&snapshot(
                UserRole::SellerBusiness,
                true,
                Some(ApprovalStatus::Approved)
            ))),
            AccessState::SellerActive
        );
        assert_eq!(
            AccessState::from_profile(Some(&snapshot(UserRole::BuyerBusiness, true, None))),
            AccessState::OnboardingInProgress
        );
        assert_eq!(
            AccessState::from_profile(Some(&snapshot(
                UserRole::BuyerBusiness,
                true,
                Some(ApprovalStatus::Rejected)
            ))),
            AccessState::BuyerRejected
        );
    }

    #[test]
    fn test_happy_path_buyer() {
        let state = AccessState::Unauthenticated
            .transition(AccessEvent::Authenticated { profile: None })
            .and_then(|s| s.transition(AccessEvent::BeginOnboarding))
            .and_then(|s| {
                s.transition(AccessEvent::CompleteOnboarding {
                    role: UserRole::BuyerBusiness,
                })
            })
            .unwrap();
        assert_eq!(state, AccessState::BuyerPending);

        let approved = state
            .transition(AccessEvent::ReviewDecision {
                status: ApprovalStatus::Approved,
            })
            .unwrap();
        assert_eq!(approved, AccessState::BuyerApproved);
        assert!(approved.can_buy());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let err = AccessState::Unauthenticated
            .transition(AccessEvent::BeginOnboarding)
            .unwrap_err();
        assert_eq!(
            err,
            AccessError::InvalidTransition {
                from: AccessState::Unauthenticated,
                event: "begin_onboarding"
            }
        );

        assert!(AccessState::SellerActive
            .transition(AccessEvent::ReviewDecision {
                status: ApprovalStatus::Rejected
            })
            .is_err());
        assert!(AccessState::BuyerApproved
            .transition(AccessEvent::CompleteOnboarding {
                role: UserRole::SellerPersonal
            })
            .is_err());
    }

    #[test]
    fn test_logout_from_any_state() {
        for state in [
            AccessState::Unauthenticated,
            AccessState::ProfileMissing,
            AccessState::OnboardingInProgress,
            AccessState::SellerActive,
            AccessState::BuyerPending,
            AccessState::BuyerApproved,
            AccessState::BuyerRejected,
        ] {
            assert_eq!(
                state.transition(AccessEvent::Logout),
                Ok(AccessState::Unauthenticated)
            );
        }
    }

    #[test]
    fn test_resolve_redirects() {
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
        assert_eq!(
            AccessState::BuyerApproved.resolve(Page::Onboarding),
            Page::BuyerDashboard
        );
    }

    #[test]
    fn test_guest_decision() {
        let decision = AccessDecision::guest();
        assert_eq!(decision.page, Page::Welcome);
        assert!(!decision.can_buy);
        assert!(!decision.can_browse);
        assert!(decision.notice.is_none());
    }

    #[test]
    fn test_pending_buyer_browses_without_buying() {
        let decision = AccessState::BuyerPending.decide(None);
        assert!(decision.can_browse);
        assert!(!decision.can_buy);
        let notice = decision.notice.unwrap();
        assert_eq!(notice.status, ApprovalStatus::Pending);
        assert!(notice.document_under_review);
        assert!(AccessState::BuyerPending.ensure_can_buy().is_err());
    }
}
