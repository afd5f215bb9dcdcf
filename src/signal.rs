//! ChangeSignal: a registry of no-payload listeners addressed by
//! generational subscription tokens.
//!
//! Dispatch copies the current listener list under the registry lock and
//! invokes the copies after releasing it. Listeners may therefore
//! subscribe, unsubscribe or touch the owning store from inside a callback
//! without deadlocking; such changes apply from the next dispatch on. The
//! same holds across threads: a dispatch already in flight may still call
//! a listener that another thread has just unsubscribed.
//!
//! A panicking listener does not stop the dispatch. The remaining
//! listeners still run, then the first panic is resumed on the caller.

use slotmap::{DefaultKey, SlotMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Token returned by `subscribe`; pass it to `unsubscribe` to detach.
///
/// Tokens are generational: once a subscription is removed its token never
/// matches a later subscription, even if the slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Subscription(DefaultKey);

#[derive(Default)]
pub(crate) struct ChangeSignal {
    listeners: Mutex<SlotMap<DefaultKey, Listener>>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    // Listeners never run under this lock, so a poisoned registry still
    // holds a consistent slot map.
    fn registry(&self) -> MutexGuard<'_, SlotMap<DefaultKey, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let key = self.registry().insert(Arc::new(listener));
        log::debug!("change listener {:?} subscribed", key);
        Subscription(key)
    }

    pub fn unsubscribe(&self, token: Subscription) -> bool {
        let removed = self.registry().remove(token.0).is_some();
        if removed {
            log::debug!("change listener {:?} unsubscribed", token.0);
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.registry().len()
    }

    /// Invoke every listener registered at the time of the call.
    ///
    /// If any listener panics, the rest still run and the first panic is
    /// resumed once all of them have been called.
    pub fn fire(&self) {
        let listeners: Vec<Listener> = self.registry().values().cloned().collect();
        log::trace!("dispatching change signal to {} listener(s)", listeners.len());
        let mut first_panic = None;
        for listener in listeners {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                log::warn!("change listener panicked; continuing dispatch");
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }
}

impl core::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
