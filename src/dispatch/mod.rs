pub mod config;
pub mod context;
pub mod continuation;
pub mod entity;
pub mod error;
pub mod notification;
pub mod subscription;

pub use config::DispatchConfig;
pub use context::ContextModel;
pub use continuation::{Continuation, Envelope};
pub use error::{Error, FailureClass};
pub use notification::{Notification, NotificationKind, RawNotification};
pub use subscription::{SubscriptionHandle, Subscriptions};

use crate::dispatch::notification::payload::DispatchFailure;
use crate::dispatch::subscription::Subscriber;
use crate::{bs_debug, bs_error, bs_warn};
use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::mem;
use std::panic::{self, AssertUnwindSafe};

/// Native debugging engine boundary.
///
/// Engine calls it once per debug event, never concurrently and never before a previous call
/// returns. Debugee stays suspended until the call returns.
pub trait NotificationSink {
    /// Handle a notification. Return true if debugee should continue execution.
    fn on_notification(&self, raw: RawNotification) -> bool;
}

/// Mark dispatcher busy until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Cell<Option<NotificationKind>>,
}

impl<'a> InFlightGuard<'a> {
    fn new(in_flight: &'a Cell<Option<NotificationKind>>, kind: NotificationKind) -> Self {
        in_flight.set(Some(kind));
        Self { in_flight }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.set(None);
    }
}

/// Debug notifications dispatcher.
///
/// For every notification dispatcher resolves its context, mirrors lifecycle changes into
/// the [`ContextModel`], calls subscribers in registration order and returns a continuation
/// decision to the engine. Any failure inside this process (unresolvable context, failed
/// subscriber, broken engine contract) is reported as a `DispatchFailure` notification
/// and never leaves the debugee suspended by itself.
pub struct Dispatcher {
    config: DispatchConfig,
    model: RefCell<ContextModel>,
    subscriptions: Subscriptions,
    /// Kind of the notification which dispatch is in progress.
    in_flight: Cell<Option<NotificationKind>>,
    /// Protocol violations waiting for a report.
    deferred: RefCell<Vec<DispatchFailure>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            model: RefCell::default(),
            subscriptions: Subscriptions::new(),
            in_flight: Cell::new(None),
            deferred: RefCell::default(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Return context model.
    ///
    /// Returned borrow must be released before next delivery, a delivery with active
    /// borrow fails as a protocol violation.
    pub fn model(&self) -> Ref<'_, ContextModel> {
        self.model.borrow()
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn subscribe<F>(&self, kind: NotificationKind, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&Envelope<'_>) -> anyhow::Result<()> + 'static,
    {
        self.subscriptions.subscribe(kind, callback)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.unsubscribe(handle)
    }

    /// True if some notification is dispatching now.
    pub fn is_dispatching(&self) -> bool {
        self.in_flight.get().is_some()
    }

    /// Dispatch a notification. Return true if debugee should resume its execution.
    ///
    /// Never panics because of subscribers (if `catch_panics` is set) and never fails:
    /// on any internal error debugee is resumed.
    pub fn deliver(&self, raw: RawNotification) -> bool {
        let kind = raw.kind();

        if let Some(in_flight) = self.in_flight.get() {
            let err = Error::ProtocolViolation {
                incoming: kind,
                in_flight,
            };
            log_failure(kind, &err);
            self.deferred
                .borrow_mut()
                .push(DispatchFailure::new(&err, None, Some(kind)));
            return true;
        }

        let _guard = InFlightGuard::new(&self.in_flight, kind);
        let resume = self.dispatch(kind, raw);
        self.flush_deferred();
        resume
    }

    fn dispatch(&self, kind: NotificationKind, raw: RawNotification) -> bool {
        let reported_thread = raw.raw_thread();
        let resolved = self.model.borrow().resolve(raw);
        let notification = match resolved {
            Ok(notification) => notification,
            Err(err) => {
                log_failure(kind, &err);
                self.report(DispatchFailure::new(&err, None, Some(kind)));
                return true;
            }
        };

        // engine may move a thread into another domain without any lifecycle notification
        let moved_thread = reported_thread.filter(|t| self.model.borrow().is_moved(t));
        if kind.is_lifecycle() || moved_thread.is_some() {
            let Ok(mut model) = self.model.try_borrow_mut() else {
                let err = Error::ModelBorrowed(kind);
                log_failure(kind, &err);
                self.report(DispatchFailure::new(
                    &err,
                    notification.controller(),
                    Some(kind),
                ));
                return true;
            };
            if let Some(thread) = moved_thread {
                model.move_thread(thread);
            }
            model.apply(&notification);
        }

        if self.config.trace_notifications {
            bs_debug!(target: "dispatch", "deliver: {notification}");
        }

        let continuation = Continuation::new(notification);
        let Some(subscribers) = self.subscriptions.snapshot(kind) else {
            return continuation.will_resume();
        };

        let model = self.model.borrow();
        for subscriber in subscribers.iter() {
            let envelope = continuation.envelope(&model, &self.subscriptions, subscriber.handle);
            if let Err(err) = self.invoke(subscriber, &envelope) {
                log_failure(kind, &err);
                if self.config.report_subscriber_failures {
                    self.report(DispatchFailure::new(
                        &err,
                        continuation.notification().controller(),
                        Some(kind),
                    ));
                }
            }
        }
        drop(model);

        let resume = continuation.will_resume();
        if !resume {
            bs_debug!(target: "dispatch", "{kind}: debugee stays suspended");
        }
        resume
    }

    fn invoke(&self, subscriber: &Subscriber, envelope: &Envelope<'_>) -> Result<(), Error> {
        let handle = subscriber.handle;
        let mut callback = subscriber
            .callback
            .try_borrow_mut()
            .map_err(|_| Error::SubscriberBusy(handle))?;

        if !self.config.catch_panics {
            return (&mut **callback)(envelope).map_err(|e| Error::Subscriber(handle, e));
        }

        match panic::catch_unwind(AssertUnwindSafe(|| (&mut **callback)(envelope))) {
            Ok(result) => result.map_err(|e| Error::Subscriber(handle, e)),
            Err(payload) => Err(Error::SubscriberPanic(handle, panic_message(&*payload))),
        }
    }

    /// Synchronously deliver a failure to `DispatchFailure` subscribers.
    /// Failures of this delivery are logged only.
    fn report(&self, failure: DispatchFailure) {
        let continuation = Continuation::new(Notification::DispatchFailure(failure));
        let Some(subscribers) = self.subscriptions.snapshot(NotificationKind::DispatchFailure)
        else {
            return;
        };

        let model = self.model.borrow();
        for subscriber in subscribers.iter() {
            let envelope = continuation.envelope(&model, &self.subscriptions, subscriber.handle);
            if let Err(err) = self.invoke(subscriber, &envelope) {
                bs_error!(target: "dispatch", "failure report dropped: {err}");
            }
        }
        // continuation decision of failure notification is meaningless
        _ = continuation.will_resume();
    }

    fn flush_deferred(&self) {
        let failures = mem::take(&mut *self.deferred.borrow_mut());
        failures.into_iter().for_each(|failure| self.report(failure));

        let dropped = mem::take(&mut *self.deferred.borrow_mut());
        if !dropped.is_empty() {
            bs_error!(
                target: "dispatch",
                "{} protocol violations raised while reporting failures",
                dropped.len()
            );
        }
    }
}

impl NotificationSink for Dispatcher {
    fn on_notification(&self, raw: RawNotification) -> bool {
        self.deliver(raw)
    }
}

/// Log a dispatch failure, errors breaking layer invariants are escalated.
fn log_failure(kind: NotificationKind, err: &Error) {
    if err.is_fatal() {
        bs_error!(target: "dispatch", "{kind} dispatch: {err}");
    } else {
        bs_warn!(target: "dispatch", "{kind} dispatch: {err}");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return msg.to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "unknown panic payload".to_string()
}
