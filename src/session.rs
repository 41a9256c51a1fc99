//! Per-visitor gated views and the driver that runs their effects.
//!
//! ```text
//!  HTTP request ──cookie──► SessionStore ──► Arc<Mutex<GatedView>>
//!                                                   │
//!                     AccessDriver::dispatch(event) │ handle()
//!                                                   ▼
//!                 QueryAccess ──► tokio task ──► AccessResolved{epoch}
//!                 OpenCheckout ─► returned to the caller (redirect)
//! ```

use crate::{
    access::{AccessOracle, Lock, query_access},
    gate::{Effect, GateEvent, GateState, GatedView},
    log,
    paywall::CheckoutRequest,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tokio::runtime::Handle;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "lockblog_session";

/// Oldest sessions are dropped beyond this many.
const MAX_SESSIONS: usize = 10_000;

pub type SharedView = Arc<Mutex<GatedView>>;

struct Entry {
    view: SharedView,
    last_seen: Instant,
}

/// Gated views keyed by opaque session id.
pub struct SessionStore {
    sessions: Mutex<FxHashMap<String, Entry>>,
    checkout: CheckoutRequest,
    seed: [u8; 32],
    counter: AtomicU64,
}

impl SessionStore {
    pub fn new(checkout: CheckoutRequest) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let mut hasher = blake3::Hasher::new_derive_key("lockblog session ids");
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());

        Self {
            sessions: Mutex::new(FxHashMap::default()),
            checkout,
            seed: *hasher.finalize().as_bytes(),
            counter: AtomicU64::new(0),
        }
    }

    /// Look up the session named by `id`, creating a fresh one if unknown.
    ///
    /// Returns the id to set in the cookie when it changed.
    pub fn get_or_create(&self, id: Option<&str>) -> (SharedView, Option<String>) {
        let mut sessions = self.sessions.lock();

        if let Some(entry) = id.and_then(|id| sessions.get_mut(id)) {
            entry.last_seen = Instant::now();
            return (Arc::clone(&entry.view), None);
        }

        if sessions.len() >= MAX_SESSIONS {
            evict_oldest(&mut sessions);
        }

        let id = self.next_id();
        let view = Arc::new(Mutex::new(GatedView::new(self.checkout.clone())));
        sessions.insert(
            id.clone(),
            Entry {
                view: Arc::clone(&view),
                last_seen: Instant::now(),
            },
        );
        (view, Some(id))
    }

    /// Views with a settled answer, for the on-chain watch.
    ///
    /// Views still loading are skipped so a slow endpoint is not re-queried
    /// before it answers.
    pub fn settled_views(&self) -> Vec<SharedView> {
        self.sessions
            .lock()
            .values()
            .filter(|entry| {
                !matches!(
                    entry.view.lock().state(),
                    GateState::Disconnected | GateState::Loading
                )
            })
            .map(|entry| Arc::clone(&entry.view))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = blake3::Hasher::new_keyed(&self.seed);
        hasher.update(&n.to_le_bytes());
        hasher.finalize().to_hex().as_str()[..32].to_owned()
    }
}

fn evict_oldest(sessions: &mut FxHashMap<String, Entry>) {
    if let Some(oldest) = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_seen)
        .map(|(id, _)| id.clone())
    {
        sessions.remove(&oldest);
    }
}

/// Session id from a `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Runs gate effects: oracle queries on the runtime, the rest back to the caller.
pub struct AccessDriver {
    oracle: Arc<dyn AccessOracle>,
    lock: Lock,
    runtime: Handle,
}

impl AccessDriver {
    pub fn new(oracle: Arc<dyn AccessOracle>, lock: Lock, runtime: Handle) -> Self {
        Self {
            oracle,
            lock,
            runtime,
        }
    }

    /// Feed `event` to `view`. Queries are spawned; other effects are returned.
    pub fn dispatch(&self, view: &SharedView, event: GateEvent) -> Vec<Effect> {
        let effects = view.lock().handle(event);
        effects
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::QueryAccess { epoch, address } => {
                    self.spawn_query(view, epoch, address);
                    None
                }
                other => Some(other),
            })
            .collect()
    }

    fn spawn_query(&self, view: &SharedView, epoch: u64, address: String) {
        let view = Arc::downgrade(view);
        let oracle = Arc::clone(&self.oracle);
        let lock = self.lock;

        self.runtime.spawn(async move {
            let result = query_access(&*oracle, &lock, &address).await;
            // Session may have been evicted meanwhile.
            if let Some(view) = view.upgrade() {
                view.lock().handle(GateEvent::AccessResolved { epoch, result });
            }
        });
    }

    /// Re-query every settled session each `interval` so purchases and
    /// expirations show up without a reload. Stops when the store is dropped.
    pub fn spawn_watch(self: &Arc<Self>, sessions: Weak<SessionStore>, interval: Duration) {
        let driver = Arc::clone(self);
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = sessions.upgrade() else {
                    break;
                };
                let views = store.settled_views();
                drop(store);
                for view in &views {
                    driver.dispatch(view, GateEvent::Refresh);
                }
            }
            log!("session"; "watch stopped");
        });
    }
}
