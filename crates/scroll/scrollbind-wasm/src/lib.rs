use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Object, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use scrollbind_core::{
    Animator, AnimatorConfig, BindingConfig, BindingHandle, BindingOptions, BindingSlot,
    BindingState,
};

mod logging;
mod lottie;
mod scroll_trigger;
mod utils;

pub use logging::init_logging;
pub use lottie::{LottieAnimation, LottieEngine};
pub use scroll_trigger::{GsapObserver, GsapSubscription, ScrollTarget};

use scroll_trigger::typed_vars;
use utils::{describe, get, jsvalue_is_undefined_or_null, to_plain};

type Core = Animator<LottieEngine, GsapObserver>;

const SCROLL_TRIGGER_KEY: &str = "scrollTrigger";

/// Drives lottie-web animations from GSAP ScrollTrigger progress.
#[wasm_bindgen]
pub struct ScrollBoundAnimator {
    core: Rc<RefCell<Core>>,
    slot: BindingSlot<Element, ScrollTarget, JsValue>,
}

/// Handle to one binding created by `bind`.
#[wasm_bindgen]
pub struct Binding {
    handle: BindingHandle,
}

#[wasm_bindgen]
impl Binding {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> u32 {
        self.handle.id().0
    }
}

/// Pump queued engine events unless the animator is already busy; a busy
/// animator is inside a call that pumps before returning.
fn pump_if_idle(core: &Weak<RefCell<Core>>) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let Ok(mut core) = core.try_borrow_mut() else {
        return;
    };
    pump_logged(&mut core);
}

/// Pump on behalf of a call that must not fail for it. Failures are logged
/// and recorded as `Failed` lifecycle events.
fn pump_logged(core: &mut Core) {
    if let Err(e) = core.pump() {
        log::error!("{e}");
    }
}

/// Split `options` into typed binding options and the caller's
/// `scrollTrigger` object, which is forwarded to gsap as given.
fn parse_options(options: JsValue) -> Result<(BindingOptions, JsValue), JsError> {
    if jsvalue_is_undefined_or_null(&options) {
        return Ok((BindingOptions::default(), JsValue::UNDEFINED));
    }
    let err = |e: String| JsError::new(&format!("options error: {e}"));
    let vars = get(&options, SCROLL_TRIGGER_KEY).map_err(err)?;
    let rest = Object::assign(&Object::new(), options.unchecked_ref());
    Reflect::delete_property(&rest, &JsValue::from_str(SCROLL_TRIGGER_KEY))
        .map_err(|e| err(describe(&e)))?;
    let mut parsed: BindingOptions =
        swb::from_value(rest.into()).map_err(|e| err(e.to_string()))?;
    parsed.scroll_trigger = typed_vars(&vars);
    Ok((parsed, vars))
}

fn make_config(
    container: Option<Element>,
    trigger: Option<Element>,
    animation_data: JsValue,
    options: JsValue,
) -> Result<BindingConfig<Element, ScrollTarget, JsValue>, JsError> {
    let (options, vars) = parse_options(options)?;
    Ok(BindingConfig {
        container,
        trigger: trigger.map(|element| ScrollTarget { element, vars }),
        source: animation_data,
        options,
    })
}

#[wasm_bindgen]
impl ScrollBoundAnimator {
    /// Create an animator over the page's `lottie`, `gsap` and `ScrollTrigger`
    /// objects. Registers the ScrollTrigger plugin (once per page). `config`
    /// is optional JSON matching AnimatorConfig.
    /// Example:
    ///   new ScrollBoundAnimator(lottie, gsap, ScrollTrigger, { coalesce_progress: true })
    #[wasm_bindgen(constructor)]
    pub fn new(
        lottie: JsValue,
        gsap: JsValue,
        scroll_trigger: JsValue,
        config: JsValue,
    ) -> Result<ScrollBoundAnimator, JsError> {
        console_error_panic_hook::set_once();

        for (name, value) in [
            ("lottie", &lottie),
            ("gsap", &gsap),
            ("ScrollTrigger", &scroll_trigger),
        ] {
            if jsvalue_is_undefined_or_null(value) {
                return Err(JsError::new(&format!("{name} is null/undefined")));
            }
        }
        let cfg: AnimatorConfig = if jsvalue_is_undefined_or_null(&config) {
            AnimatorConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let mut core = Animator::with_config(
            cfg,
            LottieEngine::new(lottie),
            GsapObserver::new(gsap, scroll_trigger),
        );
        core.initialize()
            .map_err(|e| JsError::new(&format!("initialize error: {e}")))?;

        let core = Rc::new(RefCell::new(core));
        let weak = Rc::downgrade(&core);
        core.borrow()
            .mailbox()
            .set_waker(move || pump_if_idle(&weak));

        Ok(ScrollBoundAnimator {
            core,
            slot: BindingSlot::new(),
        })
    }

    /// Bind `animation_data` rendered into `container` to the scroll progress
    /// of `trigger`. Returns undefined when either element is missing or
    /// `options.pause` is set. Once the animation is loading the binding is
    /// returned even if observer setup fails; unbind it as usual.
    #[wasm_bindgen]
    pub fn bind(
        &mut self,
        container: Option<Element>,
        trigger: Option<Element>,
        animation_data: JsValue,
        options: JsValue,
    ) -> Result<Option<Binding>, JsError> {
        let config = make_config(container, trigger, animation_data, options)?;
        let mut core = self.core.borrow_mut();
        let handle = core
            .bind(config)
            .map_err(|e| JsError::new(&format!("bind error: {e}")))?;
        pump_logged(&mut core);
        Ok(handle.map(|handle| Binding { handle }))
    }

    /// Tear down a binding. Safe to call more than once.
    #[wasm_bindgen]
    pub fn unbind(&mut self, binding: &Binding) {
        self.core.borrow_mut().unbind(binding.handle);
    }

    /// Effect-style entry point for a host component: rebinds only when an
    /// argument differs from the previous call. Returns whether it rebound.
    #[wasm_bindgen]
    pub fn sync(
        &mut self,
        container: Option<Element>,
        trigger: Option<Element>,
        animation_data: JsValue,
        options: JsValue,
    ) -> Result<bool, JsError> {
        let config = make_config(container, trigger, animation_data, options)?;
        let mut core = self.core.borrow_mut();
        let rebound = self
            .slot
            .sync(&mut *core, &config)
            .map_err(|e| JsError::new(&format!("sync error: {e}")))?;
        pump_logged(&mut core);
        Ok(rebound)
    }

    /// Unbind whatever `sync` bound (component unmount).
    #[wasm_bindgen]
    pub fn release(&mut self) {
        let mut core = self.core.borrow_mut();
        self.slot.release(&mut *core);
    }

    /// Binding owned by `sync`, if any.
    #[wasm_bindgen(js_name = synced_binding)]
    pub fn synced_binding(&self) -> Option<Binding> {
        self.slot.handle().map(|handle| Binding { handle })
    }

    /// "unbound", "loading" or "bound".
    #[wasm_bindgen]
    pub fn state(&self, binding: &Binding) -> String {
        match self.core.borrow().state(binding.handle) {
            BindingState::Unbound => "unbound",
            BindingState::Loading => "loading",
            BindingState::Bound => "bound",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = current_frame)]
    pub fn current_frame(&self, binding: &Binding) -> Option<f64> {
        self.core.borrow().current_frame(binding.handle)
    }

    #[wasm_bindgen(js_name = live_bindings)]
    pub fn live_bindings(&self) -> usize {
        self.core.borrow().live_bindings()
    }

    /// Process queued engine events now. Returns how many were dispatched.
    #[wasm_bindgen]
    pub fn pump(&mut self) -> Result<usize, JsError> {
        self.core
            .borrow_mut()
            .pump()
            .map_err(|e| JsError::new(&format!("pump error: {e}")))
    }

    /// Drain recorded lifecycle events as plain JSON objects.
    #[wasm_bindgen(js_name = take_events)]
    pub fn take_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.borrow_mut().take_events();
        to_plain(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
