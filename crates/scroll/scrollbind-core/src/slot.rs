//! Host-side helper that rebinds only when the configuration changes.
//!
//! A host view owns one slot per animated element and calls [`BindingSlot::sync`]
//! whenever it re-renders or a target mounts. Partial reconfiguration of a
//! live binding is never attempted: any difference unbinds and binds again.

use crate::animator::Animator;
use crate::collaborators::{RenderEngine, ScrollObserver};
use crate::config::BindingConfig;
use crate::error::ScrollBindResult;
use crate::ids::BindingHandle;

#[derive(Debug)]
pub struct BindingSlot<C, T, S> {
    handle: Option<BindingHandle>,
    applied: Option<BindingConfig<C, T, S>>,
}

impl<C, T, S> Default for BindingSlot<C, T, S> {
    fn default() -> Self {
        Self {
            handle: None,
            applied: None,
        }
    }
}

impl<C, T, S> BindingSlot<C, T, S>
where
    C: Clone + PartialEq,
    T: Clone + PartialEq,
    S: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the binding this slot currently owns. `None` after a
    /// skipped bind.
    pub fn handle(&self) -> Option<BindingHandle> {
        self.handle
    }

    /// Apply `config`. Returns `true` when the previous binding was replaced.
    ///
    /// A skipped bind still records the config, so a later call whose only
    /// difference is a newly present container or trigger rebinds. A failed
    /// bind records nothing.
    pub fn sync<E, O>(
        &mut self,
        animator: &mut Animator<E, O>,
        config: &BindingConfig<C, T, S>,
    ) -> ScrollBindResult<bool>
    where
        E: RenderEngine<Container = C, Source = S>,
        O: ScrollObserver<Trigger = T>,
    {
        if self.applied.as_ref() == Some(config) {
            return Ok(false);
        }
        animator.unbind(self.handle.take());
        self.applied = None;
        self.handle = animator.bind(config.clone())?;
        self.applied = Some(config.clone());
        Ok(true)
    }

    /// Unbind and forget the applied config (host teardown).
    pub fn release<E, O>(&mut self, animator: &mut Animator<E, O>)
    where
        E: RenderEngine<Container = C, Source = S>,
        O: ScrollObserver<Trigger = T>,
    {
        animator.unbind(self.handle.take());
        self.applied = None;
    }
}
