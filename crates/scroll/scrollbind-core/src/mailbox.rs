//! Single-threaded signal queue between collaborators and the animator.
//!
//! Collaborators never call back into the animator directly. They hold a
//! [`ReadySignal`] or a [`ProgressSink`] tagged with the binding they were
//! issued for, and posting queues a [`Signal`]. The animator drains the queue
//! in [`crate::Animator::pump`], which is where stale signals are dropped.
//! A post made while a pump is running lands in the same queue and is
//! handled by that pump.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::ids::BindingId;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Signal {
    Ready(BindingId),
    Progress(BindingId, f64),
}

impl Signal {
    pub(crate) fn binding(&self) -> BindingId {
        match *self {
            Signal::Ready(id) | Signal::Progress(id, _) => id,
        }
    }
}

type Waker = Rc<dyn Fn()>;

#[derive(Default)]
struct Inner {
    queue: RefCell<VecDeque<Signal>>,
    waker: RefCell<Option<Waker>>,
}

#[derive(Clone, Default)]
pub struct Mailbox {
    inner: Rc<Inner>,
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("pending", &self.len())
            .field("has_waker", &self.inner.waker.borrow().is_some())
            .finish()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a callback run after every post. Adapters use it to pump as
    /// soon as an engine event arrives.
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        *self.inner.waker.borrow_mut() = Some(Rc::new(waker));
    }

    pub fn clear_waker(&self) {
        self.inner.waker.borrow_mut().take();
    }

    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    pub fn ready_signal(&self, binding: BindingId) -> ReadySignal {
        ReadySignal {
            binding,
            mailbox: self.clone(),
        }
    }

    pub fn progress_sink(&self, binding: BindingId) -> ProgressSink {
        ProgressSink {
            binding,
            mailbox: self.clone(),
        }
    }

    pub(crate) fn post(&self, signal: Signal) {
        self.inner.queue.borrow_mut().push_back(signal);
        // Clone out so the waker may replace itself or post again.
        let waker = self.inner.waker.borrow().clone();
        if let Some(wake) = waker {
            wake();
        }
    }

    pub(crate) fn pop(&self) -> Option<Signal> {
        self.inner.queue.borrow_mut().pop_front()
    }

    pub(crate) fn drain(&self) -> Vec<Signal> {
        self.inner.queue.borrow_mut().drain(..).collect()
    }
}

/// One-shot readiness notification for a single binding.
#[derive(Debug)]
pub struct ReadySignal {
    binding: BindingId,
    mailbox: Mailbox,
}

impl ReadySignal {
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub fn notify(self) {
        self.mailbox.post(Signal::Ready(self.binding));
    }
}

/// Progress channel for a single binding.
#[derive(Clone, Debug)]
pub struct ProgressSink {
    binding: BindingId,
    mailbox: Mailbox,
}

impl ProgressSink {
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub fn send(&self, progress: f64) {
        self.mailbox.post(Signal::Progress(self.binding, progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn signals_queue_in_post_order() {
        let mb = Mailbox::new();
        let sink = mb.progress_sink(BindingId(3));
        mb.ready_signal(BindingId(3)).notify();
        sink.send(0.25);
        sink.send(0.5);
        assert_eq!(mb.len(), 3);
        assert_eq!(mb.pop(), Some(Signal::Ready(BindingId(3))));
        assert_eq!(mb.pop(), Some(Signal::Progress(BindingId(3), 0.25)));
        assert_eq!(mb.drain(), vec![Signal::Progress(BindingId(3), 0.5)]);
        assert!(mb.is_empty());
    }

    #[test]
    fn waker_runs_after_each_post_and_may_post_again() {
        let mb = Mailbox::new();
        let hits = Rc::new(Cell::new(0));
        let (h, inner) = (hits.clone(), mb.clone());
        mb.set_waker(move || {
            h.set(h.get() + 1);
            if h.get() == 1 {
                inner.progress_sink(BindingId(0)).send(1.0);
            }
        });
        mb.ready_signal(BindingId(0)).notify();
        assert_eq!(hits.get(), 2);
        assert_eq!(mb.len(), 2);

        mb.clear_waker();
        mb.progress_sink(BindingId(0)).send(0.0);
        assert_eq!(hits.get(), 2);
    }
}
