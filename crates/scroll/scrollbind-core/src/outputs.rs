//! Lifecycle events recorded by the animator.
//!
//! Events carry binding transitions only; per-frame renders are not recorded.
//! Hosts drain them with [`crate::Animator::take_events`] for diagnostics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ids::BindingId;

/// Why a bind was skipped without creating anything.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingContainer,
    MissingTrigger,
    Paused,
}

/// Kind of a signal that arrived for a binding unable to accept it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SignalKind {
    Ready,
    Progress,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LifecycleEvent {
    Skipped {
        reason: SkipReason,
    },
    Loading {
        binding: BindingId,
    },
    Bound {
        binding: BindingId,
        total_frames: u32,
    },
    /// A live binding was torn down because a new one targets its container.
    Evicted {
        binding: BindingId,
    },
    Unbound {
        binding: BindingId,
    },
    SignalIgnored {
        binding: BindingId,
        kind: SignalKind,
    },
    /// Handling a signal failed; the binding stays where it was.
    Failed {
        binding: BindingId,
        message: String,
    },
}

/// Bounded event buffer.
#[derive(Debug, Default)]
pub struct Outputs {
    events: VecDeque<LifecycleEvent>,
    capacity: usize,
}

impl Outputs {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn push(&mut self, event: LifecycleEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn take(&mut self) -> Vec<LifecycleEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
