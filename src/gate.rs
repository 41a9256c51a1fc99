//! Gated view: what a visitor may see of a post.
//!
//! ```text
//! Disconnected ──Connect──► Loading ──AccessResolved──► ConnectedNoAccess
//!                             ▲                         ConnectedWithAccess
//!                             │                         AccessFailed
//!                             ├──CheckoutOpened── ConnectedNoAccess
//!                             └──Refresh───────── AccessFailed
//! ```
//!
//! The machine is pure: it returns [`Effect`]s and the caller runs them. Each
//! query carries an epoch, and only the answer to the latest query is applied,
//! so an address change while a query is in flight cannot surface the old
//! address's result.

use crate::{access::AccessResult, paywall::CheckoutRequest, wallet::WalletSession};

/// Rendering state of a gated post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Disconnected,
    Loading,
    ConnectedNoAccess,
    ConnectedWithAccess,
    /// The membership query failed; carries the reason.
    AccessFailed(String),
}

impl GateState {
    /// Only members see the article body.
    pub const fn shows_body(&self) -> bool {
        matches!(self, Self::ConnectedWithAccess)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// The visitor connected a wallet.
    Connect(String),
    /// The wallet switched to another account.
    AddressChanged(String),
    /// A membership query finished.
    AccessResolved { epoch: u64, result: AccessResult },
    /// The visitor asked to purchase a membership.
    CheckoutOpened,
    /// Re-query the current address (retry or on-chain watch).
    Refresh,
}

/// Work requested by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the membership query for `address`; report back with `epoch`.
    QueryAccess { epoch: u64, address: String },
    /// Send the visitor to the checkout.
    OpenCheckout(CheckoutRequest),
}

#[derive(Debug, Clone)]
pub struct GatedView {
    session: WalletSession,
    access: AccessResult,
    /// Epoch of the latest issued query.
    epoch: u64,
    checkout: CheckoutRequest,
}

impl GatedView {
    pub fn new(checkout: CheckoutRequest) -> Self {
        Self {
            session: WalletSession::new(),
            access: AccessResult::Loading,
            epoch: 0,
            checkout,
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> GateState {
        if !self.session.is_connected() {
            return GateState::Disconnected;
        }
        match &self.access {
            AccessResult::Loading => GateState::Loading,
            AccessResult::Resolved(true) => GateState::ConnectedWithAccess,
            AccessResult::Resolved(false) => GateState::ConnectedNoAccess,
            AccessResult::Failed(reason) => GateState::AccessFailed(reason.clone()),
        }
    }

    pub fn handle(&mut self, event: GateEvent) -> Vec<Effect> {
        match event {
            GateEvent::Connect(address) | GateEvent::AddressChanged(address) => {
                if !self.session.connect(&address) {
                    return Vec::new();
                }
                self.access = AccessResult::Loading;
                vec![self.next_query()]
            }
            GateEvent::AccessResolved { epoch, result } => {
                if self.session.is_connected() && epoch == self.epoch {
                    self.access = result;
                }
                Vec::new()
            }
            GateEvent::CheckoutOpened => {
                if self.state() != GateState::ConnectedNoAccess {
                    return Vec::new();
                }
                self.access = AccessResult::Loading;
                vec![Effect::OpenCheckout(self.checkout.clone()), self.next_query()]
            }
            GateEvent::Refresh => {
                if !self.session.is_connected() {
                    return Vec::new();
                }
                // A known answer stays on screen until the new one arrives.
                if matches!(self.access, AccessResult::Failed(_)) {
                    self.access = AccessResult::Loading;
                }
                vec![self.next_query()]
            }
        }
    }

    fn next_query(&mut self) -> Effect {
        self.epoch += 1;
        Effect::QueryAccess {
            epoch: self.epoch,
            address: self.session.address().unwrap_or_default().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::{
            AccessOracle, query_access,
            testing::{ALICE, BOB, FixedOracle, test_lock},
        },
        config::{LockConfig, PaywallConfig},
    };

    fn view() -> GatedView {
        let request = CheckoutRequest::for_lock(&LockConfig::default(), &PaywallConfig::default()).unwrap();
        GatedView::new(request)
    }

    /// Run every query effect against `oracle` and feed the results back.
    async fn settle(view: &mut GatedView, oracle: &dyn AccessOracle, effects: Vec<Effect>) {
        for effect in effects {
            if let Effect::QueryAccess { epoch, address } = effect {
                let result = query_access(oracle, &test_lock(), &address).await;
                view.handle(GateEvent::AccessResolved { epoch, result });
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let view = view();
        assert_eq!(view.state(), GateState::Disconnected);
        assert!(!view.state().shows_body());
    }

    #[test]
    fn test_connect_moves_to_loading() {
        let mut view = view();
        let effects = view.handle(GateEvent::Connect(ALICE.into()));

        assert_eq!(view.state(), GateState::Loading);
        assert_eq!(
            effects,
            [Effect::QueryAccess {
                epoch: 1,
                address: ALICE.into()
            }]
        );
    }

    #[test]
    fn test_blank_connect_is_ignored() {
        let mut view = view();
        assert!(view.handle(GateEvent::Connect("  ".into())).is_empty());
        assert_eq!(view.state(), GateState::Disconnected);
    }

    #[test]
    fn test_disconnected_ignores_results() {
        let mut view = view();
        view.handle(GateEvent::AccessResolved {
            epoch: 0,
            result: AccessResult::Resolved(true),
        });
        assert_eq!(view.state(), GateState::Disconnected);
        assert!(view.handle(GateEvent::Refresh).is_empty());
        assert!(view.handle(GateEvent::CheckoutOpened).is_empty());
    }

    #[tokio::test]
    async fn test_zero_balance_shows_purchase() {
        let oracle = FixedOracle::with(ALICE, 0);
        let mut view = view();
        let effects = view.handle(GateEvent::Connect(ALICE.into()));
        settle(&mut view, &oracle, effects).await;

        assert_eq!(view.state(), GateState::ConnectedNoAccess);
        assert!(!view.state().shows_body());
    }

    #[tokio::test]
    async fn test_positive_balance_shows_body() {
        let oracle = FixedOracle::with(ALICE, 1);
        let mut view = view();
        let effects = view.handle(GateEvent::Connect(ALICE.into()));
        settle(&mut view, &oracle, effects).await;

        assert_eq!(view.state(), GateState::ConnectedWithAccess);
        assert!(view.state().shows_body());
    }

    #[tokio::test]
    async fn test_oracle_failure_is_distinct_state() {
        let oracle = FixedOracle::failing();
        let mut view = view();
        let effects = view.handle(GateEvent::Connect(ALICE.into()));
        settle(&mut view, &oracle, effects).await;

        let state = view.state();
        assert!(matches!(state, GateState::AccessFailed(ref reason) if reason.contains("header not found")));
        assert!(!state.shows_body());

        // Retry goes back through Loading.
        let effects = view.handle(GateEvent::Refresh);
        assert_eq!(view.state(), GateState::Loading);
        assert_eq!(effects.len(), 1);
    }

    #[tokio::test]
    async fn test_address_change_mid_query_uses_latest() {
        let oracle = FixedOracle::with(ALICE, 1);
        oracle.set(BOB, 0);
        let mut view = view();

        let stale = view.handle(GateEvent::Connect(ALICE.into()));
        let latest = view.handle(GateEvent::AddressChanged(BOB.into()));

        // Newer answer lands first, the stale one after it.
        settle(&mut view, &oracle, latest).await;
        settle(&mut view, &oracle, stale).await;

        assert_eq!(view.session().address(), Some(BOB));
        assert_eq!(view.state(), GateState::ConnectedNoAccess);
    }

    #[tokio::test]
    async fn test_stale_result_while_loading_is_ignored() {
        let oracle = FixedOracle::with(ALICE, 1);
        let mut view = view();

        let stale = view.handle(GateEvent::Connect(ALICE.into()));
        view.handle(GateEvent::AddressChanged(BOB.into()));
        settle(&mut view, &oracle, stale).await;

        assert_eq!(view.state(), GateState::Loading);
    }

    #[tokio::test]
    async fn test_checkout_then_purchase_grants_access() {
        let oracle = FixedOracle::with(ALICE, 0);
        let mut view = view();
        let effects = view.handle(GateEvent::Connect(ALICE.into()));
        settle(&mut view, &oracle, effects).await;
        assert_eq!(view.state(), GateState::ConnectedNoAccess);

        let effects = view.handle(GateEvent::CheckoutOpened);
        assert_eq!(view.state(), GateState::Loading);

        let Effect::OpenCheckout(request) = &effects[0] else {
            panic!("expected checkout first, got {effects:?}");
        };
        assert_eq!(request.lock_address, "0x8C1C77B37549De45834739f8cf8b9181D690e2bf");
        assert_eq!(request.network, 5);

        // Purchase mined before the re-query lands.
        oracle.set(ALICE, 1);
        settle(&mut view, &oracle, effects).await;
        assert_eq!(view.state(), GateState::ConnectedWithAccess);
    }

    #[test]
    fn test_checkout_only_without_access() {
        let mut view = view();
        view.handle(GateEvent::Connect(ALICE.into()));
        view.handle(GateEvent::AccessResolved {
            epoch: 1,
            result: AccessResult::Resolved(true),
        });
        assert!(view.handle(GateEvent::CheckoutOpened).is_empty());
        assert_eq!(view.state(), GateState::ConnectedWithAccess);
    }

    #[test]
    fn test_refresh_keeps_known_answer() {
        let mut view = view();
        view.handle(GateEvent::Connect(ALICE.into()));
        view.handle(GateEvent::AccessResolved {
            epoch: 1,
            result: AccessResult::Resolved(true),
        });

        let effects = view.handle(GateEvent::Refresh);
        assert_eq!(view.state(), GateState::ConnectedWithAccess);
        assert_eq!(
            effects,
            [Effect::QueryAccess {
                epoch: 2,
                address: ALICE.into()
            }]
        );

        // Membership expired on chain.
        view.handle(GateEvent::AccessResolved {
            epoch: 2,
            result: AccessResult::Resolved(false),
        });
        assert_eq!(view.state(), GateState::ConnectedNoAccess);
    }
}
