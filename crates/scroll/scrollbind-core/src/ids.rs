//! Identifiers and a simple allocator for bindings.

use serde::{Deserialize, Serialize};

/// Identity of one Bind activation. Unique among live bindings: the counter
/// wraps, but an id still in use is never handed out again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingId(pub u32);

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// Opaque handle returned by [`crate::Animator::bind`]. Its only use is
/// handing it back to `unbind`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BindingHandle(pub(crate) BindingId);

impl BindingHandle {
    #[inline]
    pub fn id(&self) -> BindingId {
        self.0
    }
}

/// Monotonic allocator for BindingId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_binding: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_binding(&mut self) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding = self.next_binding.wrapping_add(1);
        id
    }

    /// Next id for which `in_use` is false. Terminates as long as fewer than
    /// `u32::MAX` ids are in use.
    pub fn alloc_binding_unless(&mut self, mut in_use: impl FnMut(BindingId) -> bool) -> BindingId {
        loop {
            let id = self.alloc_binding();
            if !in_use(id) {
                return id;
            }
        }
    }
}
