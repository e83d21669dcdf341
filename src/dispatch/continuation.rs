use crate::dispatch::context::ContextModel;
use crate::dispatch::notification::{Notification, NotificationKind};
use crate::dispatch::subscription::{SubscriptionHandle, Subscriptions};
use std::cell::Cell;

/// Per-dispatch state: delivered notification and a decision about debugee resuming.
///
/// Resume flag starts as `true` and may only be cleared while subscribers run.
/// The decision is read with [`Continuation::will_resume`] which consumes the continuation,
/// so after dispatch completes the flag can't change anymore.
pub struct Continuation {
    kind: NotificationKind,
    notification: Notification,
    resume: Cell<bool>,
}

impl Continuation {
    pub fn new(notification: Notification) -> Self {
        Self {
            kind: notification.kind(),
            notification,
            resume: Cell::new(true),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Create a view of this continuation for a single subscriber invocation.
    pub(crate) fn envelope<'a>(
        &'a self,
        model: &'a ContextModel,
        subscriptions: &'a Subscriptions,
        subscription: SubscriptionHandle,
    ) -> Envelope<'a> {
        Envelope {
            continuation: self,
            model,
            subscriptions,
            subscription,
        }
    }

    /// Finish dispatch and return final decision.
    pub fn will_resume(self) -> bool {
        self.resume.get()
    }
}

/// A subscriber view of dispatching notification.
pub struct Envelope<'a> {
    continuation: &'a Continuation,
    model: &'a ContextModel,
    subscriptions: &'a Subscriptions,
    subscription: SubscriptionHandle,
}

impl<'a> Envelope<'a> {
    pub fn kind(&self) -> NotificationKind {
        self.continuation.kind
    }

    pub fn notification(&self) -> &'a Notification {
        &self.continuation.notification
    }

    /// Context model, already updated with current notification if it is a lifecycle one.
    pub fn model(&self) -> &'a ContextModel {
        self.model
    }

    /// Subscription registry. Changes made through it affect only subsequent deliveries.
    pub fn subscriptions(&self) -> &'a Subscriptions {
        self.subscriptions
    }

    /// Subscription of currently running subscriber.
    pub fn subscription(&self) -> SubscriptionHandle {
        self.subscription
    }

    /// Keep debugee suspended after dispatch. Idempotent.
    pub fn suppress_resume(&self) {
        self.continuation.resume.set(false);
    }
}
