//! Binding and animator configuration.
//!
//! Everything here is plain serde data. Wire names follow the JS conventions
//! of the engines the options are forwarded to (`speedFactor`,
//! `rendererSettings`, `preserveAspectRatio`, ...), so the same JSON can be
//! handed to the adapter or parsed natively with [`BindingOptions::from_json`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ScrollBindError, ScrollBindResult};
use crate::outputs::SkipReason;

/// Renderer backend requested from the render engine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Svg,
    Canvas,
    Html,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Svg => "svg",
            RendererKind::Canvas => "canvas",
            RendererKind::Html => "html",
        }
    }
}

fn default_preserve_aspect_ratio() -> String {
    // Fit inside the container, centered on both axes.
    "xMidYMid meet".to_string()
}

/// Renderer settings. Only the aspect-ratio policy is named; every other key
/// is carried verbatim to the render engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererSettings {
    #[serde(default = "default_preserve_aspect_ratio")]
    pub preserve_aspect_ratio: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            preserve_aspect_ratio: default_preserve_aspect_ratio(),
            extra: Map::new(),
        }
    }
}

/// Scrub mode: `true` ties progress directly to scroll position, a number
/// additionally smooths catch-up over that many seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scrub {
    Enabled(bool),
    Smoothing(f64),
}

/// Pinning: `true` pins the trigger itself, a selector pins another element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pin {
    Enabled(bool),
    Selector(String),
}

/// Scroll-trigger parameters. Forwarded to the scroll observer untouched;
/// the animator never interprets them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollTriggerVars {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Pin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrub: Option<Scrub>,
    /// Any other observer keys (markers, toggleActions, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-binding options; the serializable part of a [`BindingConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindingOptions {
    pub renderer: RendererKind,
    pub renderer_settings: RendererSettings,
    pub scroll_trigger: ScrollTriggerVars,
    /// Multiplier applied to the scroll-derived frame. Below 1 the animation
    /// only reaches part of its range over the scroll distance, above 1 it
    /// reaches the last frame early and holds it.
    pub speed_factor: f64,
    pub pause: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            renderer_settings: RendererSettings::default(),
            scroll_trigger: ScrollTriggerVars::default(),
            speed_factor: 1.0,
            pause: false,
        }
    }
}

impl BindingOptions {
    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> ScrollBindResult<Self> {
        serde_json::from_str(json).map_err(|e| ScrollBindError::config(e.to_string()))
    }
}

/// Everything one Bind call needs. `container` and `trigger` are optional
/// because the host may not have mounted them yet; a config missing either
/// is a skip, not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingConfig<C, T, S> {
    pub container: Option<C>,
    pub trigger: Option<T>,
    pub source: S,
    pub options: BindingOptions,
}

impl<C, T, S> BindingConfig<C, T, S> {
    pub fn new(source: S) -> Self {
        Self {
            container: None,
            trigger: None,
            source,
            options: BindingOptions::default(),
        }
    }

    pub fn with_container(mut self, container: C) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_trigger(mut self, trigger: T) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_options(mut self, options: BindingOptions) -> Self {
        self.options = options;
        self
    }

    /// Why a bind with this config would be skipped, if it would.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.container.is_none() {
            Some(SkipReason::MissingContainer)
        } else if self.trigger.is_none() {
            Some(SkipReason::MissingTrigger)
        } else if self.options.pause {
            Some(SkipReason::Paused)
        } else {
            None
        }
    }
}

/// Animator-wide configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Upper bound on buffered lifecycle events; the oldest are dropped first.
    pub max_retained_events: usize,
    /// Render only the latest queued progress per binding during one pump.
    pub coalesce_progress: bool,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_retained_events: 256,
            coalesce_progress: true,
        }
    }
}
