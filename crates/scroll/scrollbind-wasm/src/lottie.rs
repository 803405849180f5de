//! lottie-web backed render engine.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use scrollbind_core::{
    AnimationHandle, LoadRequest, ReadySignal, RenderEngine, ScrollBindError, ScrollBindResult,
};

use crate::utils::{describe, get, method, set, to_plain};

const READY_EVENT: &str = "DOMLoaded";

/// Wraps the `lottie` module object (anything exposing `loadAnimation`).
pub struct LottieEngine {
    lottie: JsValue,
}

impl LottieEngine {
    pub fn new(lottie: JsValue) -> Self {
        Self { lottie }
    }
}

pub struct LottieAnimation {
    instance: JsValue,
    go_to_and_stop: Option<Function>,
    on_ready: Option<Closure<dyn FnMut()>>,
}

impl RenderEngine for LottieEngine {
    type Container = Element;
    type Source = JsValue;
    type Animation = LottieAnimation;

    fn load(
        &mut self,
        request: LoadRequest<'_, Element, JsValue>,
        ready: ReadySignal,
    ) -> ScrollBindResult<LottieAnimation> {
        let settings = to_plain(request.settings)
            .map_err(|e| ScrollBindError::render(format!("rendererSettings: {e}")))?;
        let params: JsValue = Object::new().into();
        let entries: [(&str, &JsValue); 6] = [
            ("container", request.container.as_ref()),
            ("renderer", &JsValue::from_str(request.renderer.as_str())),
            ("loop", &JsValue::from_bool(request.looping)),
            ("autoplay", &JsValue::from_bool(request.autoplay)),
            ("animationData", request.source),
            ("rendererSettings", &settings),
        ];
        for (key, value) in entries {
            set(&params, key, value).map_err(ScrollBindError::render)?;
        }

        let load = method(&self.lottie, "loadAnimation").map_err(ScrollBindError::render)?;
        let instance = load
            .call1(&self.lottie, &params)
            .map_err(|e| ScrollBindError::render(describe(&e)))?;

        let mut animation = LottieAnimation {
            go_to_and_stop: method(&instance, "goToAndStop").ok(),
            instance,
            on_ready: None,
        };
        if let Err(err) = animation.listen_ready(ready) {
            animation.dispose();
            return Err(err);
        }
        log::debug!("{} lottie instance created", request.binding);
        Ok(animation)
    }
}

impl LottieAnimation {
    fn listen_ready(&mut self, ready: ReadySignal) -> ScrollBindResult<()> {
        let pending = Rc::new(RefCell::new(Some(ready)));
        let slot = pending.clone();
        let on_ready = Closure::wrap(Box::new(move || {
            if let Some(ready) = slot.borrow_mut().take() {
                ready.notify();
            }
        }) as Box<dyn FnMut()>);

        let add = method(&self.instance, "addEventListener").map_err(ScrollBindError::render)?;
        add.call2(
            &self.instance,
            &JsValue::from_str(READY_EVENT),
            on_ready.as_ref().unchecked_ref(),
        )
        .map_err(|e| ScrollBindError::render(describe(&e)))?;
        self.on_ready = Some(on_ready);

        // With inline animation data the instance can finish loading inside
        // loadAnimation, before any listener exists.
        let loaded = get(&self.instance, "isLoaded")
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if loaded {
            let ready = pending.borrow_mut().take();
            if let Some(ready) = ready {
                ready.notify();
            }
        }
        Ok(())
    }
}

impl AnimationHandle for LottieAnimation {
    fn total_frames(&self) -> u32 {
        get(&self.instance, "totalFrames")
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|f| f.is_finite() && *f > 0.0)
            .map_or(0, |f| f as u32)
    }

    fn render_frame(&mut self, frame: f64, _force_redraw: bool) {
        // goToAndStop always redraws; its second argument selects frame
        // addressing over milliseconds.
        let Some(go_to_and_stop) = &self.go_to_and_stop else {
            log::warn!("lottie instance has no goToAndStop");
            return;
        };
        if let Err(e) = go_to_and_stop.call2(
            &self.instance,
            &JsValue::from_f64(frame),
            &JsValue::TRUE,
        ) {
            log::warn!("goToAndStop({frame}) failed: {}", describe(&e));
        }
    }

    fn dispose(&mut self) {
        if let Some(on_ready) = self.on_ready.take() {
            if let Ok(remove) = method(&self.instance, "removeEventListener") {
                let _ = remove.call2(
                    &self.instance,
                    &JsValue::from_str(READY_EVENT),
                    on_ready.as_ref().unchecked_ref(),
                );
            }
        }
        if let Ok(destroy) = method(&self.instance, "destroy") {
            if let Err(e) = destroy.call0(&self.instance) {
                log::warn!("lottie destroy failed: {}", describe(&e));
            }
        }
        self.go_to_and_stop = None;
    }
}
