//! Contracts for the external render engine and scroll observer.
//!
//! Adapters (wasm, native test doubles) implement these; the animator only
//! ever talks to the traits.

use crate::config::{RendererKind, RendererSettings, ScrollTriggerVars};
use crate::error::ScrollBindResult;
use crate::ids::BindingId;
use crate::mailbox::{ProgressSink, ReadySignal};

/// Parameters for loading one animation into a container.
#[derive(Debug)]
pub struct LoadRequest<'a, C, S> {
    pub binding: BindingId,
    pub container: &'a C,
    pub source: &'a S,
    pub renderer: RendererKind,
    pub settings: &'a RendererSettings,
    /// Always false: the animator drives every frame.
    pub autoplay: bool,
    /// Always false.
    pub looping: bool,
}

/// Parameters for one scroll-progress subscription.
#[derive(Debug)]
pub struct ObserveRequest<'a, T> {
    pub binding: BindingId,
    /// Element whose passage through the viewport drives progress. Takes
    /// precedence over any trigger named in `vars`.
    pub trigger: &'a T,
    pub vars: &'a ScrollTriggerVars,
}

pub trait RenderEngine {
    /// Render target. Compared to keep one live binding per container.
    type Container: PartialEq;
    type Source;
    type Animation: AnimationHandle;

    /// Start loading `request.source` into `request.container`. The engine
    /// must call `ready.notify()` once it has finished layout and asset
    /// setup; frames are never requested before that.
    fn load(
        &mut self,
        request: LoadRequest<'_, Self::Container, Self::Source>,
        ready: ReadySignal,
    ) -> ScrollBindResult<Self::Animation>;
}

/// A loaded animation owned by exactly one binding.
pub trait AnimationHandle {
    fn total_frames(&self) -> u32;

    /// Show `frame` and hold it, without advancing playback.
    fn render_frame(&mut self, frame: f64, force_redraw: bool);

    /// Release rendered content and internal timers. Called once.
    fn dispose(&mut self);
}

pub trait ScrollObserver {
    type Trigger;
    type Subscription: ScrollSubscription;

    /// Process-wide plugin registration. Called from
    /// [`crate::Animator::initialize`], never from bind.
    fn register(&mut self) -> ScrollBindResult<()> {
        Ok(())
    }

    /// Subscribe to progress of `request.trigger`; every change is reported
    /// through `sink`.
    fn observe(
        &mut self,
        request: ObserveRequest<'_, Self::Trigger>,
        sink: ProgressSink,
    ) -> ScrollBindResult<Self::Subscription>;
}

pub trait ScrollSubscription {
    /// Remove every effect registered under this subscription: pins,
    /// listeners and the progress callback itself.
    fn revert(&mut self);
}
