//! Recording doubles for the render engine and scroll observer.
//!
//! Both doubles share a [`World`] so a test can inspect calls and drive
//! readiness or scrolling after the doubles have moved into the animator.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use scrollbind_core::{
    AnimationHandle, Animator, AnimatorConfig, BindingConfig, BindingId, BindingOptions,
    LoadRequest, ObserveRequest, Pin, ProgressSink, ReadySignal, RenderEngine, RendererKind,
    ScrollBindError, ScrollBindResult, ScrollObserver, ScrollSubscription,
};

pub type Container = u32;
pub type Trigger = u32;
pub type TestAnimator = Animator<FakeEngine, FakeObserver>;
pub type TestConfig = BindingConfig<Container, Trigger, Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Register,
    Load {
        binding: BindingId,
        container: Container,
        renderer: RendererKind,
        preserve_aspect_ratio: String,
        autoplay: bool,
        looping: bool,
    },
    Observe {
        binding: BindingId,
        trigger: Trigger,
        pin: Option<Pin>,
    },
    Render {
        container: Container,
        frame: f64,
        force_redraw: bool,
    },
    Revert {
        binding: BindingId,
    },
    Dispose {
        container: Container,
    },
}

struct SinkEntry {
    binding: BindingId,
    sink: ProgressSink,
    active: Rc<Cell<bool>>,
}

#[derive(Default)]
struct WorldState {
    calls: Vec<Call>,
    pending_ready: Vec<ReadySignal>,
    sinks: Vec<SinkEntry>,
    ready_on_load: bool,
    fail_load: Option<String>,
    fail_observe: Option<String>,
    progress_on_observe: Option<f64>,
}

#[derive(Clone, Default)]
pub struct World {
    inner: Rc<RefCell<WorldState>>,
}

impl World {
    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn renders(&self) -> Vec<(Container, f64)> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Render {
                    container, frame, ..
                } => Some((*container, *frame)),
                _ => None,
            })
            .collect()
    }

    /// Engines report ready synchronously from inside `load`.
    pub fn set_ready_on_load(&self, on: bool) {
        self.inner.borrow_mut().ready_on_load = on;
    }

    pub fn fail_next_load(&self, msg: &str) {
        self.inner.borrow_mut().fail_load = Some(msg.to_string());
    }

    pub fn fail_next_observe(&self, msg: &str) {
        self.inner.borrow_mut().fail_observe = Some(msg.to_string());
    }

    /// Observer reports this progress synchronously while subscribing.
    pub fn set_progress_on_observe(&self, progress: Option<f64>) {
        self.inner.borrow_mut().progress_on_observe = progress;
    }

    /// Fire every outstanding ready event.
    pub fn fire_ready(&self) {
        let pending: Vec<ReadySignal> = self.inner.borrow_mut().pending_ready.drain(..).collect();
        for ready in pending {
            ready.notify();
        }
    }

    pub fn pending_ready(&self) -> usize {
        self.inner.borrow().pending_ready.len()
    }

    /// Report `progress` on every subscription that has not been reverted.
    pub fn scroll(&self, progress: f64) {
        let sinks: Vec<ProgressSink> = self
            .inner
            .borrow()
            .sinks
            .iter()
            .filter(|e| e.active.get())
            .map(|e| e.sink.clone())
            .collect();
        for sink in sinks {
            sink.send(progress);
        }
    }

    /// Sink issued for `binding`, whether or not it was reverted since.
    pub fn sink_for(&self, binding: BindingId) -> Option<ProgressSink> {
        self.inner
            .borrow()
            .sinks
            .iter()
            .find(|e| e.binding == binding)
            .map(|e| e.sink.clone())
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner
            .borrow()
            .sinks
            .iter()
            .filter(|e| e.active.get())
            .count()
    }
}

pub struct FakeEngine {
    world: World,
}

pub struct FakeAnimation {
    container: Container,
    total_frames: u32,
    world: World,
    disposed: bool,
}

impl RenderEngine for FakeEngine {
    type Container = Container;
    type Source = Value;
    type Animation = FakeAnimation;

    fn load(
        &mut self,
        request: LoadRequest<'_, Container, Value>,
        ready: ReadySignal,
    ) -> ScrollBindResult<FakeAnimation> {
        let mut state = self.world.inner.borrow_mut();
        if let Some(msg) = state.fail_load.take() {
            return Err(ScrollBindError::render(msg));
        }
        assert_eq!(ready.binding(), request.binding, "ready signal for another binding");
        let ip = request.source.get("ip").and_then(Value::as_f64).unwrap_or(0.0);
        let op = request.source.get("op").and_then(Value::as_f64).unwrap_or(0.0);
        state.calls.push(Call::Load {
            binding: request.binding,
            container: *request.container,
            renderer: request.renderer,
            preserve_aspect_ratio: request.settings.preserve_aspect_ratio.clone(),
            autoplay: request.autoplay,
            looping: request.looping,
        });
        let ready_now = if state.ready_on_load {
            Some(ready)
        } else {
            state.pending_ready.push(ready);
            None
        };
        drop(state);
        if let Some(ready) = ready_now {
            ready.notify();
        }
        Ok(FakeAnimation {
            container: *request.container,
            total_frames: (op - ip).max(0.0) as u32,
            world: self.world.clone(),
            disposed: false,
        })
    }
}

impl AnimationHandle for FakeAnimation {
    fn total_frames(&self) -> u32 {
        self.total_frames
    }

    fn render_frame(&mut self, frame: f64, force_redraw: bool) {
        assert!(!self.disposed, "render after dispose");
        self.world.inner.borrow_mut().calls.push(Call::Render {
            container: self.container,
            frame,
            force_redraw,
        });
    }

    fn dispose(&mut self) {
        assert!(!self.disposed, "dispose called twice");
        self.disposed = true;
        self.world.inner.borrow_mut().calls.push(Call::Dispose {
            container: self.container,
        });
    }
}

pub struct FakeObserver {
    world: World,
}

pub struct FakeSubscription {
    binding: BindingId,
    active: Rc<Cell<bool>>,
    world: World,
}

impl ScrollObserver for FakeObserver {
    type Trigger = Trigger;
    type Subscription = FakeSubscription;

    fn register(&mut self) -> ScrollBindResult<()> {
        self.world.inner.borrow_mut().calls.push(Call::Register);
        Ok(())
    }

    fn observe(
        &mut self,
        request: ObserveRequest<'_, Trigger>,
        sink: ProgressSink,
    ) -> ScrollBindResult<FakeSubscription> {
        let mut state = self.world.inner.borrow_mut();
        if let Some(msg) = state.fail_observe.take() {
            return Err(ScrollBindError::observer(msg));
        }
        assert_eq!(sink.binding(), request.binding, "progress sink for another binding");
        state.calls.push(Call::Observe {
            binding: request.binding,
            trigger: *request.trigger,
            pin: request.vars.pin.clone(),
        });
        let active = Rc::new(Cell::new(true));
        state.sinks.push(SinkEntry {
            binding: request.binding,
            sink: sink.clone(),
            active: active.clone(),
        });
        let initial = state.progress_on_observe;
        drop(state);
        if let Some(progress) = initial {
            sink.send(progress);
        }
        Ok(FakeSubscription {
            binding: request.binding,
            active,
            world: self.world.clone(),
        })
    }
}

impl ScrollSubscription for FakeSubscription {
    fn revert(&mut self) {
        assert!(self.active.get(), "revert called twice");
        self.active.set(false);
        self.world.inner.borrow_mut().calls.push(Call::Revert {
            binding: self.binding,
        });
    }
}

pub fn uninitialized(cfg: AnimatorConfig) -> (TestAnimator, World) {
    let world = World::default();
    let animator = Animator::with_config(
        cfg,
        FakeEngine {
            world: world.clone(),
        },
        FakeObserver {
            world: world.clone(),
        },
    );
    (animator, world)
}

pub fn animator_with(cfg: AnimatorConfig) -> (TestAnimator, World) {
    let (mut animator, world) = uninitialized(cfg);
    animator.initialize().unwrap();
    world.clear_calls();
    (animator, world)
}

pub fn animator() -> (TestAnimator, World) {
    animator_with(AnimatorConfig::default())
}

pub fn pulse() -> Value {
    scrollbind_test_fixtures::animations::load("pulse").unwrap()
}

pub fn options(name: &str) -> BindingOptions {
    BindingOptions::from_json(&scrollbind_test_fixtures::bindings::json(name).unwrap()).unwrap()
}

pub fn config(container: Container, trigger: Trigger, options: BindingOptions) -> TestConfig {
    BindingConfig::new(pulse())
        .with_container(container)
        .with_trigger(trigger)
        .with_options(options)
}

pub fn approx(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-9, "left={a} right={b}");
}
