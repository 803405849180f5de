//! GSAP ScrollTrigger backed scroll observer.
//!
//! Each subscription is a `gsap.context` holding one linear tween of a
//! playhead object from 0 to 1. The tween's `scrollTrigger` is a shallow copy
//! of the caller's vars object with `trigger` set to the bound element, so
//! the tween progress is the scroll progress. Reverting the context removes
//! the tween, its trigger and any pin spacer it created.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Object;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use scrollbind_core::{
    ObserveRequest, Pin, ProgressSink, Scrub, ScrollBindError, ScrollBindResult, ScrollObserver,
    ScrollSubscription, ScrollTriggerVars,
};

use crate::utils::{describe, get, jsvalue_is_undefined_or_null, method, set};

const PLAYHEAD_KEY: &str = "progress";

thread_local! {
    // gsap.registerPlugin is global to the page.
    static PLUGIN_REGISTERED: Cell<bool> = const { Cell::new(false) };
}

/// Trigger element plus the caller's ScrollTrigger vars. The vars stay a JS
/// object so callbacks and element references reach gsap untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollTarget {
    pub element: Element,
    pub vars: JsValue,
}

/// Typed view of the vars the animator reads; everything else is left to gsap.
pub(crate) fn typed_vars(raw: &JsValue) -> ScrollTriggerVars {
    let field = |key: &str| {
        get(raw, key)
            .ok()
            .filter(|v| !jsvalue_is_undefined_or_null(v))
    };
    ScrollTriggerVars {
        pin: field("pin").and_then(|v| {
            v.as_bool()
                .map(Pin::Enabled)
                .or_else(|| v.as_string().map(Pin::Selector))
        }),
        start: field("start").and_then(|v| v.as_string()),
        end: field("end").and_then(|v| v.as_string()),
        scrub: field("scrub").and_then(|v| {
            v.as_bool()
                .map(Scrub::Enabled)
                .or_else(|| v.as_f64().map(Scrub::Smoothing))
        }),
        ..Default::default()
    }
}

pub struct GsapObserver {
    gsap: JsValue,
    plugin: JsValue,
}

impl GsapObserver {
    pub fn new(gsap: JsValue, plugin: JsValue) -> Self {
        Self { gsap, plugin }
    }
}

pub struct GsapSubscription {
    context: JsValue,
    on_update: Option<Closure<dyn FnMut()>>,
    body: Option<Closure<dyn FnMut()>>,
}

impl ScrollObserver for GsapObserver {
    type Trigger = ScrollTarget;
    type Subscription = GsapSubscription;

    fn register(&mut self) -> ScrollBindResult<()> {
        if PLUGIN_REGISTERED.with(Cell::get) {
            return Ok(());
        }
        let register = method(&self.gsap, "registerPlugin").map_err(ScrollBindError::observer)?;
        register
            .call1(&self.gsap, &self.plugin)
            .map_err(|e| ScrollBindError::observer(describe(&e)))?;
        PLUGIN_REGISTERED.with(|r| r.set(true));
        Ok(())
    }

    fn observe(
        &mut self,
        request: ObserveRequest<'_, ScrollTarget>,
        sink: ProgressSink,
    ) -> ScrollBindResult<GsapSubscription> {
        // Copied so the caller's object never gains a `trigger` key.
        let scroll_trigger = Object::new();
        if request.trigger.vars.is_object() {
            Object::assign(&scroll_trigger, request.trigger.vars.unchecked_ref());
        }
        let scroll_trigger: JsValue = scroll_trigger.into();
        set(&scroll_trigger, "trigger", request.trigger.element.as_ref())
            .map_err(ScrollBindError::observer)?;

        let playhead: JsValue = Object::new().into();
        set(&playhead, PLAYHEAD_KEY, &JsValue::from_f64(0.0)).map_err(ScrollBindError::observer)?;

        let on_update = {
            let playhead = playhead.clone();
            Closure::wrap(Box::new(move || {
                if let Some(progress) = get(&playhead, PLAYHEAD_KEY).ok().and_then(|v| v.as_f64()) {
                    sink.send(progress);
                }
            }) as Box<dyn FnMut()>)
        };

        let vars: JsValue = Object::new().into();
        let entries: [(&str, &JsValue); 4] = [
            (PLAYHEAD_KEY, &JsValue::from_f64(1.0)),
            ("ease", &JsValue::from_str("none")),
            ("onUpdate", on_update.as_ref()),
            ("scrollTrigger", &scroll_trigger),
        ];
        for (key, value) in entries {
            set(&vars, key, value).map_err(ScrollBindError::observer)?;
        }

        // gsap.context runs its function synchronously and records every
        // tween created inside it.
        let to = method(&self.gsap, "to").map_err(ScrollBindError::observer)?;
        let failure: Rc<RefCell<Option<JsValue>>> = Rc::new(RefCell::new(None));
        let body = {
            let gsap = self.gsap.clone();
            let failure = failure.clone();
            Closure::wrap(Box::new(move || {
                if let Err(e) = to.call2(&gsap, &playhead, &vars) {
                    *failure.borrow_mut() = Some(e);
                }
            }) as Box<dyn FnMut()>)
        };
        let context = method(&self.gsap, "context")
            .map_err(ScrollBindError::observer)?
            .call1(&self.gsap, body.as_ref().unchecked_ref())
            .map_err(|e| ScrollBindError::observer(describe(&e)))?;

        let mut subscription = GsapSubscription {
            context,
            on_update: Some(on_update),
            body: Some(body),
        };
        let failed = failure.borrow_mut().take();
        if let Some(err) = failed {
            subscription.revert();
            return Err(ScrollBindError::observer(describe(&err)));
        }
        log::debug!(
            "{} scroll trigger created (pin {:?}, {:?} to {:?})",
            request.binding,
            request.vars.pin,
            request.vars.start,
            request.vars.end
        );
        Ok(subscription)
    }
}

impl ScrollSubscription for GsapSubscription {
    fn revert(&mut self) {
        match method(&self.context, "revert") {
            Ok(revert) => {
                if let Err(e) = revert.call0(&self.context) {
                    log::warn!("gsap context revert failed: {}", describe(&e));
                }
            }
            Err(e) => log::warn!("gsap context cannot revert: {e}"),
        }
        // Reverting may still report progress; drop the callbacks only after.
        self.on_update = None;
        self.body = None;
    }
}
