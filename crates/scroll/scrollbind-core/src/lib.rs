//! Scrollbind Core (engine-agnostic)
//!
//! Binds a pre-rendered vector animation's playhead to scroll progress.
//! A render engine loads the animation into a container; a scroll observer
//! reports progress of a trigger element through its scroll range; the
//! [`Animator`] maps each progress value to a clamped frame and renders it.
//! Both engines sit behind the traits in [`collaborators`], so adapters
//! (wasm, native test doubles) plug in without touching the binding logic.

pub mod animator;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod frame;
pub mod ids;
pub mod mailbox;
pub mod outputs;
pub mod slot;

// Re-exports for consumers (adapters)
pub use animator::{Animator, BindingState, ConfigFor};
pub use collaborators::{
    AnimationHandle, LoadRequest, ObserveRequest, RenderEngine, ScrollObserver, ScrollSubscription,
};
pub use config::{
    AnimatorConfig, BindingConfig, BindingOptions, Pin, RendererKind, RendererSettings, Scrub,
    ScrollTriggerVars,
};
pub use error::{ScrollBindError, ScrollBindResult};
pub use frame::{frame_for_progress, last_frame};
pub use ids::{BindingHandle, BindingId};
pub use mailbox::{Mailbox, ProgressSink, ReadySignal};
pub use outputs::{LifecycleEvent, SignalKind, SkipReason};
pub use slot::BindingSlot;
