//! Per-quantity multicast subscription channel.
//!
//! Observers receive one callback per committed value, in commit order.
//! Subscribing never replays the current value; a new observer only sees
//! future changes. Test-writers expecting an initial emission on subscribe
//! will wait forever.
//!
//! Single-threaded by design, matching the single-owner view-model it serves.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback = Box<dyn FnMut(f64)>;

struct Slot {
    active: Cell<bool>,
    callback: RefCell<Callback>,
}

#[derive(Default)]
pub struct Channel {
    observers: RefCell<Vec<Rc<Slot>>>,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Delivery starts with the next committed value.
    pub fn subscribe(&self, f: impl FnMut(f64) + 'static) -> Subscription {
        let slot = Rc::new(Slot {
            active: Cell::new(true),
            callback: RefCell::new(Box::new(f)),
        });
        self.observers.borrow_mut().push(Rc::clone(&slot));
        Subscription {
            slot: Rc::downgrade(&slot),
        }
    }

    /// Delivers one committed value to every live observer, in subscription
    /// order.
    ///
    /// The observer list is snapshotted first, so a callback may cancel any
    /// subscription (its own included) or add new ones without invalidating
    /// the pass. Observers added during delivery only see the next value.
    pub(crate) fn emit(&self, value: f64) {
        let snapshot: Vec<Rc<Slot>> = self.observers.borrow().clone();
        for slot in snapshot {
            if slot.active.get() {
                (&mut *slot.callback.borrow_mut())(value);
            }
        }
        self.observers.borrow_mut().retain(|s| s.active.get());
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|s| s.active.get())
            .count()
    }
}

/// Handle owned by the observer. Delivery continues until `cancel` is called;
/// dropping the handle alone does not unsubscribe.
pub struct Subscription {
    slot: Weak<Slot>,
}

impl Subscription {
    /// Stops further delivery. Idempotent: cancelling twice is a no-op.
    pub fn cancel(&self) {
        if let Some(slot) = self.slot.upgrade() {
            slot.active.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn test_subscribe_does_not_replay() {
        let channel = Channel::new();
        let (log, sink) = recorder();
        let _sub = channel.subscribe(sink);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_multicast_in_subscription_order() {
        let channel = Channel::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        let _a = channel.subscribe(move |v| first.borrow_mut().push(("a", v)));
        let second = Rc::clone(&log);
        let _b = channel.subscribe(move |v| second.borrow_mut().push(("b", v)));

        channel.emit(1.0);
        channel.emit(2.0);
        assert_eq!(
            *log.borrow(),
            vec![("a", 1.0), ("b", 1.0), ("a", 2.0), ("b", 2.0)]
        );
    }

    #[test]
    fn test_late_subscriber_sees_only_future_values() {
        let channel = Channel::new();
        channel.emit(1.0);

        let (log, sink) = recorder();
        let _sub = channel.subscribe(sink);
        channel.emit(2.0);
        assert_eq!(*log.borrow(), vec![2.0]);
    }

    #[test]
    fn test_cancel_stops_delivery_and_is_idempotent() {
        let channel = Channel::new();
        let (log, sink) = recorder();
        let sub = channel.subscribe(sink);

        channel.emit(1.0);
        sub.cancel();
        sub.cancel();
        channel.emit(2.0);

        assert_eq!(*log.borrow(), vec![1.0]);
        assert_eq!(channel.observer_count(), 0);
    }

    #[test]
    fn test_cancel_from_inside_callback() {
        let channel = Rc::new(Channel::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let sub_cell: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&log);
        let handle = Rc::clone(&sub_cell);
        let sub = channel.subscribe(move |v| {
            sink.borrow_mut().push(v);
            if let Some(s) = handle.borrow().as_ref() {
                s.cancel();
            }
        });
        *sub_cell.borrow_mut() = Some(sub);

        channel.emit(1.0);
        channel.emit(2.0);
        assert_eq!(*log.borrow(), vec![1.0]);
    }
}
