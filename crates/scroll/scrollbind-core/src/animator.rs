//! Animator: owns every live binding and drives it from queued signals.
//!
//! Lifecycle per binding: `Loading` on bind, `Bound` once the render engine
//! reports ready and the scroll subscription exists, `Unbound` on unbind
//! from either state. Methods:
//! - initialize, bind, pump, unbind, rebind, unbind_all
//! - state / current_frame / total_frames queries, take_events

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::collaborators::{
    AnimationHandle, LoadRequest, ObserveRequest, RenderEngine, ScrollObserver, ScrollSubscription,
};
use crate::config::{AnimatorConfig, BindingConfig, BindingOptions};
use crate::error::{ScrollBindError, ScrollBindResult};
use crate::frame::frame_for_progress;
use crate::ids::{BindingHandle, BindingId, IdAllocator};
use crate::mailbox::{Mailbox, Signal};
use crate::outputs::{LifecycleEvent, Outputs, SignalKind, SkipReason};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BindingState {
    Unbound,
    Loading,
    Bound,
}

/// Bind configuration accepted by an `Animator<E, O>`.
pub type ConfigFor<E, O> = BindingConfig<
    <E as RenderEngine>::Container,
    <O as ScrollObserver>::Trigger,
    <E as RenderEngine>::Source,
>;

struct Binding<E: RenderEngine, O: ScrollObserver> {
    id: BindingId,
    state: BindingState,
    container: E::Container,
    trigger: O::Trigger,
    options: BindingOptions,
    animation: Option<E::Animation>,
    subscription: Option<O::Subscription>,
    current_frame: Option<f64>,
}

impl<E: RenderEngine, O: ScrollObserver> Binding<E, O> {
    /// Revert observer effects first, then dispose the animation. Either may
    /// be absent when teardown happens mid-load.
    fn teardown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.revert();
        }
        if let Some(mut animation) = self.animation.take() {
            animation.dispose();
        }
        self.state = BindingState::Unbound;
    }
}

pub struct Animator<E: RenderEngine, O: ScrollObserver> {
    cfg: AnimatorConfig,
    engine: E,
    observer: O,
    ids: IdAllocator,
    bindings: HashMap<BindingId, Binding<E, O>>,
    mailbox: Mailbox,
    outputs: Outputs,
    initialized: bool,
}

impl<E: RenderEngine, O: ScrollObserver> fmt::Debug for Animator<E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("cfg", &self.cfg)
            .field("initialized", &self.initialized)
            .field("live_bindings", &self.bindings.len())
            .field("mailbox", &self.mailbox)
            .finish()
    }
}

impl<E: RenderEngine, O: ScrollObserver> Animator<E, O> {
    pub fn new(engine: E, observer: O) -> Self {
        Self::with_config(AnimatorConfig::default(), engine, observer)
    }

    pub fn with_config(cfg: AnimatorConfig, engine: E, observer: O) -> Self {
        Self {
            outputs: Outputs::with_capacity(cfg.max_retained_events),
            cfg,
            engine,
            observer,
            ids: IdAllocator::new(),
            bindings: HashMap::new(),
            mailbox: Mailbox::new(),
            initialized: false,
        }
    }

    /// One-time observer plugin registration. Safe to call repeatedly.
    pub fn initialize(&mut self) -> ScrollBindResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.observer.register()?;
        self.initialized = true;
        log::debug!("scroll observer registered");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Queue shared with collaborators; adapters install a waker on it.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Establish one binding.
    ///
    /// Returns `Ok(None)` without touching either collaborator when the
    /// container or trigger is absent or the options are paused; the caller
    /// binds again once that changes. Otherwise the animation starts loading
    /// and the scroll subscription is created later, from [`Self::pump`],
    /// once the engine reports ready.
    pub fn bind(&mut self, config: ConfigFor<E, O>) -> ScrollBindResult<Option<BindingHandle>> {
        if !self.initialized {
            return Err(ScrollBindError::NotInitialized);
        }
        if let Some(reason) = config.skip_reason() {
            return Ok(self.skip(reason));
        }
        let BindingConfig {
            container,
            trigger,
            source,
            options,
        } = config;
        let (Some(container), Some(trigger)) = (container, trigger) else {
            return Ok(None);
        };

        self.evict_container(&container);

        let bindings = &self.bindings;
        let id = self.ids.alloc_binding_unless(|id| bindings.contains_key(&id));
        let animation = self.engine.load(
            LoadRequest {
                binding: id,
                container: &container,
                source: &source,
                renderer: options.renderer,
                settings: &options.renderer_settings,
                autoplay: false,
                looping: false,
            },
            self.mailbox.ready_signal(id),
        )?;
        log::debug!("{id} loading ({} renderer)", options.renderer.as_str());

        self.bindings.insert(
            id,
            Binding {
                id,
                state: BindingState::Loading,
                container,
                trigger,
                options,
                animation: Some(animation),
                subscription: None,
                current_frame: None,
            },
        );
        self.outputs.push(LifecycleEvent::Loading { binding: id });
        Ok(Some(BindingHandle(id)))
    }

    /// Tear down one binding. Accepts `None` (a skipped bind) and handles
    /// that were already unbound.
    pub fn unbind(&mut self, handle: impl Into<Option<BindingHandle>>) {
        let Some(handle) = handle.into() else {
            return;
        };
        let id = handle.id();
        match self.bindings.remove(&id) {
            Some(mut binding) => {
                binding.teardown();
                log::debug!("{id} unbound");
                self.outputs.push(LifecycleEvent::Unbound { binding: id });
            }
            None => log::trace!("{id} already unbound"),
        }
    }

    /// Replace a binding: unbind `previous`, then bind `config`.
    pub fn rebind(
        &mut self,
        previous: impl Into<Option<BindingHandle>>,
        config: ConfigFor<E, O>,
    ) -> ScrollBindResult<Option<BindingHandle>> {
        self.unbind(previous);
        self.bind(config)
    }

    pub fn unbind_all(&mut self) {
        let mut ids: Vec<BindingId> = self.bindings.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            self.unbind(BindingHandle(id));
        }
    }

    /// Process queued ready and progress signals.
    ///
    /// Signals for bindings that no longer exist, or that are not in the
    /// state the signal expects, are dropped. Every queued signal is handled
    /// even when one fails; each failure is recorded as a `Failed` event and
    /// the first one is returned. Returns the number of signals dispatched.
    pub fn pump(&mut self) -> ScrollBindResult<usize> {
        let mut dispatched = 0;
        let mut first_err = None;
        loop {
            let batch = if self.cfg.coalesce_progress {
                coalesce(self.mailbox.drain())
            } else {
                self.mailbox.pop().into_iter().collect()
            };
            if batch.is_empty() {
                break;
            }
            dispatched += batch.len();
            for signal in batch {
                if let Err(err) = self.dispatch(signal) {
                    let binding = signal.binding();
                    log::warn!("{binding}: {err}");
                    self.outputs.push(LifecycleEvent::Failed {
                        binding,
                        message: err.to_string(),
                    });
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(dispatched),
        }
    }

    pub fn state(&self, handle: BindingHandle) -> BindingState {
        self.bindings
            .get(&handle.id())
            .map_or(BindingState::Unbound, |b| b.state)
    }

    /// Last frame rendered for this binding, if any progress arrived yet.
    pub fn current_frame(&self, handle: BindingHandle) -> Option<f64> {
        self.bindings.get(&handle.id())?.current_frame
    }

    pub fn total_frames(&self, handle: BindingHandle) -> Option<u32> {
        let binding = self.bindings.get(&handle.id())?;
        binding.animation.as_ref().map(|a| a.total_frames())
    }

    pub fn live_bindings(&self) -> usize {
        self.bindings.len()
    }

    pub fn pending_signals(&self) -> usize {
        self.mailbox.len()
    }

    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        self.outputs.take()
    }

    fn skip(&mut self, reason: SkipReason) -> Option<BindingHandle> {
        log::debug!("bind skipped: {reason:?}");
        self.outputs.push(LifecycleEvent::Skipped { reason });
        None
    }

    fn evict_container(&mut self, container: &E::Container) {
        let mut stale: Vec<BindingId> = self
            .bindings
            .values()
            .filter(|b| &b.container == container)
            .map(|b| b.id)
            .collect();
        stale.sort_unstable();
        for id in stale {
            if let Some(mut binding) = self.bindings.remove(&id) {
                log::warn!("{id} still renders into the container; tearing it down first");
                binding.teardown();
                self.outputs.push(LifecycleEvent::Evicted { binding: id });
            }
        }
    }

    fn dispatch(&mut self, signal: Signal) -> ScrollBindResult<()> {
        match signal {
            Signal::Ready(id) => self.on_ready(id),
            Signal::Progress(id, progress) => {
                self.on_progress(id, progress);
                Ok(())
            }
        }
    }

    fn on_ready(&mut self, id: BindingId) -> ScrollBindResult<()> {
        let Some(binding) = self
            .bindings
            .get_mut(&id)
            .filter(|b| b.state == BindingState::Loading)
        else {
            log::trace!("ready for {id} ignored");
            self.outputs.push(LifecycleEvent::SignalIgnored {
                binding: id,
                kind: SignalKind::Ready,
            });
            return Ok(());
        };

        let subscription = self.observer.observe(
            ObserveRequest {
                binding: id,
                trigger: &binding.trigger,
                vars: &binding.options.scroll_trigger,
            },
            self.mailbox.progress_sink(id),
        )?;
        binding.subscription = Some(subscription);
        binding.state = BindingState::Bound;

        let total_frames = binding.animation.as_ref().map_or(0, |a| a.total_frames());
        log::debug!("{id} bound ({total_frames} frames)");
        self.outputs.push(LifecycleEvent::Bound {
            binding: id,
            total_frames,
        });
        Ok(())
    }

    fn on_progress(&mut self, id: BindingId, progress: f64) {
        let Some(binding) = self
            .bindings
            .get_mut(&id)
            .filter(|b| b.state == BindingState::Bound)
        else {
            log::trace!("progress for {id} ignored");
            self.outputs.push(LifecycleEvent::SignalIgnored {
                binding: id,
                kind: SignalKind::Progress,
            });
            return;
        };
        let Some(animation) = binding.animation.as_mut() else {
            return;
        };
        // totalFrames is read per update; a source that changes it needs a rebind.
        let frame = frame_for_progress(
            progress,
            animation.total_frames(),
            binding.options.speed_factor,
        );
        animation.render_frame(frame, true);
        binding.current_frame = Some(frame);
    }
}

impl<E: RenderEngine, O: ScrollObserver> Drop for Animator<E, O> {
    fn drop(&mut self) {
        self.unbind_all();
        self.mailbox.clear_waker();
    }
}

/// Keep every ready signal and only the last progress signal per binding,
/// at the position of that last signal.
fn coalesce(signals: Vec<Signal>) -> Vec<Signal> {
    let mut last: HashMap<BindingId, usize> = HashMap::new();
    for (i, signal) in signals.iter().enumerate() {
        if let Signal::Progress(id, _) = signal {
            last.insert(*id, i);
        }
    }
    signals
        .into_iter()
        .enumerate()
        .filter(|(i, signal)| match signal {
            Signal::Ready(_) => true,
            Signal::Progress(id, _) => last.get(id) == Some(i),
        })
        .map(|(_, signal)| signal)
        .collect()
}
