//! Session state shared by the refresh worker and the orchestrator
//!
//! The refresh path overwrites the cached [`RefreshedState`]; the orchestrator
//! only applies the optimistic update after a confirmed mint. Every write is
//! republished to subscribers as a [`SessionView`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use candy_mint_common::clock::{ledger_now, unix_time};
use candy_mint_common::{Amount, MintConfigSnapshot};
use tokio::sync::watch;

use crate::eligibility::{evaluate, EligibilityResult};
use crate::fetcher::RefreshedState;
use crate::orchestrator::{AlertState, MintState};

/// Read-only projection observed by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    /// Latest snapshot, `None` until the first refresh succeeds
    pub snapshot: Option<Arc<MintConfigSnapshot>>,
    /// Eligibility of the latest snapshot
    pub eligibility: Option<EligibilityResult>,
    /// Native balance of the wallet
    pub native_balance: Option<Amount>,
    /// Orchestrator state
    pub state: MintState,
    /// Current alert
    pub alert: AlertState,
    /// Incremented by every successful refresh
    pub refresh_version: u64,
    /// Failed attempts so far, declined signatures excluded
    pub failed_attempts: u32,
    /// The refresh worker stopped on a configuration error
    pub halted: bool,
}

impl SessionView {
    /// Mint button enabled
    pub fn can_mint(&self) -> bool {
        self.eligibility
            .as_ref()
            .is_some_and(EligibilityResult::can_mint)
    }

    /// Items left, `None` until loaded
    pub fn items_remaining(&self) -> Option<u64> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.items_remaining())
    }
}

/// Cached refresh result
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionCache {
    pub refreshed: Option<Arc<RefreshedState>>,
    pub refresh_version: u64,
}

#[derive(Debug)]
pub(crate) struct Shared {
    cache: ArcSwap<SessionCache>,
    view: watch::Sender<SessionView>,
}

impl Shared {
    pub fn new() -> Self {
        let (view, _) = watch::channel(SessionView::default());
        Self {
            cache: ArcSwap::from_pointee(SessionCache::default()),
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Latest refresh result
    pub fn refreshed(&self) -> Option<Arc<RefreshedState>> {
        self.cache.load().refreshed.clone()
    }

    /// Authoritative overwrite from a refresh
    pub fn store_refresh(&self, refreshed: RefreshedState) {
        self.cache_refresh(refreshed);
        self.publish_latest();
    }

    fn cache_refresh(&self, refreshed: RefreshedState) {
        let refreshed = Arc::new(refreshed);
        self.cache.rcu(|cache| SessionCache {
            refreshed: Some(refreshed.clone()),
            refresh_version: cache.refresh_version + 1,
        });
    }

    /// Project the latest cached refresh under the view lock, so concurrent
    /// refreshes never publish an older version last
    fn publish_latest(&self) {
        self.view.send_if_modified(|view| {
            let cache = self.cache.load();
            match &cache.refreshed {
                Some(refreshed) if cache.refresh_version > view.refresh_version => {
                    project(view, refreshed);
                    view.refresh_version = cache.refresh_version;
                    true
                }
                _ => false,
            }
        });
    }

    /// Optimistic update after a confirmed mint.
    ///
    /// Never lowers the redeemed count: a refresh that already saw the mint
    /// is kept as is.
    pub fn apply_minted(&self, attempt_snapshot: &MintConfigSnapshot) {
        let expected = attempt_snapshot.items_redeemed.saturating_add(1);

        let previous = self.cache.rcu(|cache| {
            let mut cache = SessionCache::clone(cache);
            if let Some(refreshed) = &cache.refreshed {
                if refreshed.snapshot.items_redeemed < expected {
                    let mut next = RefreshedState::clone(refreshed);
                    next.snapshot = refreshed
                        .snapshot
                        .with_redeemed(expected - refreshed.snapshot.items_redeemed);
                    cache.refreshed = Some(Arc::new(next));
                }
            }
            cache
        });
        tracing::debug!(
            "Applied optimistic mint, redeemed was {:?}",
            previous
                .refreshed
                .as_ref()
                .map(|refreshed| refreshed.snapshot.items_redeemed)
        );

        self.view.send_if_modified(|view| match &self.cache.load().refreshed {
            Some(refreshed) => {
                project(view, refreshed);
                true
            }
            None => false,
        });
    }

    pub fn set_state(&self, state: MintState) {
        self.view.send_modify(|view| view.state = state);
    }

    pub fn set_alert(&self, alert: AlertState) {
        self.view.send_modify(|view| view.alert = alert);
    }

    pub fn dismiss_alert(&self) {
        self.view.send_modify(|view| view.alert.visible = false);
    }

    pub fn record_failure(&self) {
        self.view
            .send_modify(|view| view.failed_attempts = view.failed_attempts.saturating_add(1));
    }

    pub fn halt(&self, alert: AlertState) {
        self.view.send_modify(|view| {
            view.alert = alert;
            view.halted = true;
        });
    }

    pub fn is_halted(&self) -> bool {
        self.view.borrow().halted
    }
}

fn project(view: &mut SessionView, refreshed: &RefreshedState) {
    let now = ledger_now();
    view.eligibility = Some(evaluate(
        &refreshed.snapshot,
        now,
        refreshed.balance_sufficient,
        refreshed.gating_pass_present,
    ));
    view.snapshot = Some(Arc::new(refreshed.snapshot.clone()));
    view.native_balance = Some(refreshed.native_balance);
}

#[cfg(test)]
mod tests {
    use candy_mint_common::{Address, Commitment};
    use candy_mint_fake_rpc::sample_machine;

    use super::*;

    fn refreshed(items_redeemed: u64) -> RefreshedState {
        let mut machine = sample_machine(Address::new([2; 32]));
        machine.items_redeemed = items_redeemed;
        RefreshedState {
            snapshot: MintConfigSnapshot::from_account(
                Address::new([3; 32]),
                &machine,
                Commitment::Confirmed,
                unix_time(),
            ),
            native_balance: Amount::from(5_000_000_000),
            balance_sufficient: true,
            gating_pass_present: false,
        }
    }

    #[test]
    fn test_refresh_publishes_view() {
        let shared = Shared::new();
        let rx = shared.subscribe();
        assert!(!rx.borrow().can_mint());

        shared.store_refresh(refreshed(10));
        shared.store_refresh(refreshed(10));

        let view = rx.borrow().clone();
        assert_eq!(view.refresh_version, 2);
        assert_eq!(view.items_remaining(), Some(3323));
        assert!(view.can_mint());
        assert_eq!(view.native_balance, Some(Amount::from(5_000_000_000)));
    }

    #[test]
    fn test_optimistic_mint() {
        let shared = Shared::new();
        shared.store_refresh(refreshed(10));
        let attempt = shared.refreshed().unwrap();

        shared.apply_minted(&attempt.snapshot);

        assert_eq!(shared.view().items_remaining(), Some(3322));
        // Optimistic updates are not refreshes
        assert_eq!(shared.view().refresh_version, 1);
    }

    #[test]
    fn test_optimistic_mint_keeps_newer_refresh() {
        let shared = Shared::new();
        shared.store_refresh(refreshed(10));
        let attempt = shared.refreshed().unwrap();

        // A refresh during the attempt already saw other mints
        shared.store_refresh(refreshed(15));
        shared.apply_minted(&attempt.snapshot);

        assert_eq!(
            shared.refreshed().unwrap().snapshot.items_redeemed,
            15
        );
    }

    #[test]
    fn test_racing_refreshes_publish_the_newest() {
        let shared = Shared::new();

        // Two refreshes cache in order, then publish in reverse order
        shared.cache_refresh(refreshed(10));
        shared.cache_refresh(refreshed(15));
        shared.publish_latest();
        shared.publish_latest();

        let view = shared.view();
        assert_eq!(view.refresh_version, 2);
        assert_eq!(view.items_remaining(), Some(3333 - 15));

        shared.store_refresh(refreshed(16));
        assert_eq!(shared.view().refresh_version, 3);
    }

    #[test]
    fn test_last_item_sells_out() {
        let shared = Shared::new();
        shared.store_refresh(refreshed(3332));
        let attempt = shared.refreshed().unwrap();

        shared.apply_minted(&attempt.snapshot);

        let view = shared.view();
        assert_eq!(view.items_remaining(), Some(0));
        assert!(view.eligibility.unwrap().is_sold_out);
    }

    #[test]
    fn test_halt() {
        let shared = Shared::new();
        shared.halt(AlertState::persistent("bad machine id"));

        let view = shared.view();
        assert!(shared.is_halted());
        assert!(view.alert.visible);
        assert_eq!(view.alert.hide_after, None);
    }
}
