use crate::dispatch::continuation::Envelope;
use crate::dispatch::notification::NotificationKind;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Subscriber callback. Returned error is isolated by dispatcher and never stops delivery
/// to other subscribers.
pub type Callback = dyn FnMut(&Envelope<'_>) -> anyhow::Result<()>;

/// Identity of a single subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionHandle {
    kind: NotificationKind,
    id: u32,
}

impl SubscriptionHandle {
    pub(crate) fn new(kind: NotificationKind, id: u32) -> Self {
        Self { kind, id }
    }

    /// Notification kind this subscription belongs to.
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Display for SubscriptionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({})", self.id, self.kind)
    }
}

#[derive(Clone)]
pub(crate) struct Subscriber {
    pub(crate) handle: SubscriptionHandle,
    pub(crate) callback: Rc<RefCell<Box<Callback>>>,
}

/// Immutable list of subscribers for a single notification kind.
pub(crate) type Snapshot = Rc<[Subscriber]>;

#[derive(Default)]
struct Registry {
    next_id: u32,
    lists: HashMap<NotificationKind, Snapshot>,
}

/// Per notification kind ordered lists of subscribers.
///
/// Lists are copy-on-write: any change replaces the list of the kind, so a snapshot taken
/// before the change stays as is. This allows subscribing and unsubscribing from inside
/// a subscriber callback without affecting the delivery in progress.
///
/// Handle is cheap to clone, all clones share the same registry.
#[derive(Clone, Default)]
pub struct Subscriptions {
    registry: Rc<RefCell<Registry>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber to the end of subscriber list of the `kind`.
    pub fn subscribe<F>(&self, kind: NotificationKind, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&Envelope<'_>) -> anyhow::Result<()> + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let handle = SubscriptionHandle::new(kind, registry.next_id);

        let boxed: Box<Callback> = Box::new(callback);
        let subscriber = Subscriber {
            handle,
            callback: Rc::new(RefCell::new(boxed)),
        };
        let list: Snapshot = registry
            .lists
            .get(&kind)
            .into_iter()
            .flat_map(|list| list.iter().cloned())
            .chain([subscriber])
            .collect();
        registry.lists.insert(kind, list);

        handle
    }

    /// Remove subscriber. Return false if subscriber already removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut registry = self.registry.borrow_mut();
        let Some(list) = registry.lists.get(&handle.kind) else {
            return false;
        };
        if !list.iter().any(|s| s.handle == handle) {
            return false;
        }

        let list: Vec<_> = list.iter().filter(|s| s.handle != handle).cloned().collect();
        if list.is_empty() {
            registry.lists.remove(&handle.kind);
        } else {
            registry.lists.insert(handle.kind, list.into());
        }
        true
    }

    /// Return current subscribers of the `kind` in registration order.
    pub(crate) fn snapshot(&self, kind: NotificationKind) -> Option<Snapshot> {
        self.registry.borrow().lists.get(&kind).cloned()
    }

    /// Return number of subscribers of the `kind`.
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.registry
            .borrow()
            .lists
            .get(&kind)
            .map(|list| list.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self, kind: NotificationKind) -> bool {
        self.count(kind) == 0
    }

    /// Return true if the subscription is still registered.
    pub fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.registry
            .borrow()
            .lists
            .get(&handle.kind)
            .map(|list| list.iter().any(|s| s.handle == handle))
            .unwrap_or_default()
    }
}
