//! Lifecycle capabilities for display components.
//!
//! Components implement [`Initializable`] and [`Destroyable`] independently;
//! there is no shared base state. A component typically subscribes to the
//! bus in `init` and keeps the handles in a [`SubscriptionSet`] so that
//! `destroy` can release them.

use anyhow::Result;

use crate::events::{EventBus, Subscription};

pub trait Initializable {
    /// Bind to the bus. Calling `init` on an initialized component is a no-op.
    fn init(&mut self, bus: &EventBus) -> Result<()>;

    fn is_initialized(&self) -> bool;
}

pub trait Destroyable {
    /// Release every subscription. Safe to call more than once.
    fn destroy(&mut self);
}

/// A display collaborator with a name for diagnostics.
pub trait Component: Initializable + Destroyable + Send {
    fn name(&self) -> &'static str;
}

/// Subscriptions owned by one component.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribe everything; returns how many handlers were removed.
    pub fn release_all(&mut self) -> usize {
        self.subscriptions
            .drain(..)
            .map(Subscription::unsubscribe)
            .filter(|removed| *removed)
            .count()
    }
}
