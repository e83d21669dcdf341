use bs_notify::dispatch::entity::{BreakpointId, DomainId, ProcessId, RawThread, ThreadId};
use bs_notify::dispatch::notification::payload::DispatchFailure;
use bs_notify::dispatch::{Dispatcher, Notification, NotificationKind, RawNotification};
use std::cell::RefCell;
use std::rc::Rc;

pub const PID: ProcessId = ProcessId(100);
pub const DEFAULT_DOMAIN: DomainId = DomainId(1);
pub const PLUGIN_DOMAIN: DomainId = DomainId(2);
pub const MAIN_THREAD: ThreadId = ThreadId(7);
pub const WORKER_THREAD: ThreadId = ThreadId(8);

/// Create dispatcher with a process, two domains and two threads
/// (main thread in default domain, worker thread in plugin domain).
pub fn prepared_dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::default();
    let raws = [
        RawNotification::ProcessCreated { process: PID },
        RawNotification::DomainCreated {
            process: PID,
            domain: DEFAULT_DOMAIN,
            name: "DefaultDomain".to_string(),
        },
        RawNotification::DomainCreated {
            process: PID,
            domain: PLUGIN_DOMAIN,
            name: "plugin".to_string(),
        },
        RawNotification::ThreadCreated {
            domain: Some(DEFAULT_DOMAIN),
            thread: RawThread::new(MAIN_THREAD),
        },
        RawNotification::ThreadCreated {
            domain: None,
            thread: RawThread::in_domain(WORKER_THREAD, PLUGIN_DOMAIN),
        },
    ];
    for raw in raws {
        assert!(dispatcher.deliver(raw));
    }
    dispatcher
}

pub fn breakpoint_hit(thread: ThreadId) -> RawNotification {
    RawNotification::BreakpointHit {
        domain: None,
        thread: RawThread::new(thread),
        breakpoint: BreakpointId(1),
    }
}

/// Shared journal of things observed by subscribers.
pub struct Journal<T> {
    records: Rc<RefCell<Vec<T>>>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self {
            records: Rc::default(),
        }
    }
}

impl<T> Clone for Journal<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<T: Clone> Journal<T> {
    pub fn push(&self, record: T) {
        self.records.borrow_mut().push(record);
    }

    pub fn records(&self) -> Vec<T> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

/// Subscribe for `DispatchFailure` notifications and collect them.
pub fn collect_failures(dispatcher: &Dispatcher) -> Journal<DispatchFailure> {
    let journal = Journal::default();
    let failures = journal.clone();
    dispatcher.subscribe(NotificationKind::DispatchFailure, move |env| {
        if let Notification::DispatchFailure(failure) = env.notification() {
            failures.push(failure.clone());
        }
        Ok(())
    });
    journal
}
