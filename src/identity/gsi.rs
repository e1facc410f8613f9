//! DOM glue for Google Identity Services: script injection, the rendered
//! button, the viewport observer and the timer clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{Either, select};
use js_sys::{Function, Object, Reflect};
use leptos::html::Div;
use leptos::prelude::*;
use tokio_util::sync::CancellationToken;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlScriptElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use super::bridge::{
    BridgeError, ButtonOptions, SCRIPT_ELEMENT_ID, SCRIPT_SRC, SCRIPT_STATUS_ATTR, ScriptStatus,
    reuse_existing_script,
};
use super::retry::{Clock, RenderTarget, VisibilityWatch};

/// `window.google.accounts.id`, once the SDK has evaluated.
fn sdk() -> Option<Object> {
    let mut node: JsValue = web_sys::window()?.into();
    for key in ["google", "accounts", "id"] {
        node = Reflect::get(&node, &JsValue::from_str(key)).ok()?;
        if node.is_undefined() || node.is_null() {
            return None;
        }
    }
    node.dyn_into::<Object>().ok()
}

pub fn sdk_loaded() -> bool {
    sdk().is_some()
}

fn method(target: &Object, name: &str) -> Result<Function, JsValue> {
    Reflect::get(target, &JsValue::from_str(name))?.dyn_into::<Function>()
}

type Settle = Rc<RefCell<Option<oneshot::Sender<bool>>>>;

fn settle_on(tx: &Settle, loaded: bool) -> Closure<dyn FnMut(web_sys::Event)> {
    let tx = Rc::clone(tx);
    Closure::new(move |_ev: web_sys::Event| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(loaded);
        }
    })
}

fn mark(script: &HtmlScriptElement, status: ScriptStatus) {
    let _ = script.set_attribute(SCRIPT_STATUS_ATTR, status.as_str());
}

/// Inject the GSI script unless a previous mount already loaded it.
///
/// The element carries its load status in [`SCRIPT_STATUS_ATTR`]. An element
/// that never finished loading is replaced, and one that fails to load is
/// removed again, so a later mount always retries the download. Returns
/// early without error if `cancel` fires first.
///
/// # Errors
///
/// [`BridgeError::ScriptLoad`] when the script cannot be attached or fails
/// to load.
pub async fn ensure_script(cancel: &CancellationToken) -> Result<(), BridgeError> {
    if sdk_loaded() {
        return Ok(());
    }
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(BridgeError::ScriptLoad)?;
    if let Some(existing) = document.get_element_by_id(SCRIPT_ELEMENT_ID) {
        if reuse_existing_script(existing.get_attribute(SCRIPT_STATUS_ATTR).as_deref()) {
            return Ok(());
        }
        log::debug!("replacing unfinished {SCRIPT_SRC} element");
        existing.remove();
    }

    let script = document
        .create_element("script")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlScriptElement>().ok())
        .ok_or(BridgeError::ScriptLoad)?;
    script.set_id(SCRIPT_ELEMENT_ID);
    script.set_src(SCRIPT_SRC);
    script.set_async(true);
    script.set_defer(true);
    mark(&script, ScriptStatus::Loading);

    let (tx, rx) = oneshot::channel::<bool>();
    let tx: Settle = Rc::new(RefCell::new(Some(tx)));
    let on_load = settle_on(&tx, true);
    let on_error = settle_on(&tx, false);
    let _ = script.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
    let _ = script.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());

    let head = document.head().ok_or(BridgeError::ScriptLoad)?;
    head.append_child(&script)
        .map_err(|_| BridgeError::ScriptLoad)?;
    log::debug!("injected {SCRIPT_SRC}");

    let cancelled = cancel.cancelled();
    futures::pin_mut!(cancelled);
    let settled = match select(rx, cancelled).await {
        Either::Left((settled, _)) => Some(settled.unwrap_or(false)),
        Either::Right(_) => None,
    };

    let _ = script.remove_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
    let _ = script.remove_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());

    match settled {
        Some(true) => {
            mark(&script, ScriptStatus::Loaded);
            Ok(())
        }
        // Left marked as loading; the next mount replaces it.
        None => Ok(()),
        Some(false) => {
            log::warn!("failed to load {SCRIPT_SRC}");
            script.remove();
            Err(BridgeError::ScriptLoad)
        }
    }
}

/// Wrap `on_credential` as the GSI `callback`. It receives the response's
/// `credential` string, if any.
pub fn credential_callback(
    mut on_credential: impl FnMut(Option<String>) + 'static,
) -> Closure<dyn FnMut(JsValue)> {
    Closure::new(move |response: JsValue| {
        let credential = Reflect::get(&response, &JsValue::from_str("credential"))
            .ok()
            .and_then(|v| v.as_string());
        on_credential(credential);
    })
}

/// The rendered button inside `container`.
pub struct GsiButton {
    container: NodeRef<Div>,
    client_id: String,
    callback: Function,
    options: ButtonOptions,
}

impl GsiButton {
    /// `callback` must outlive the button; GSI calls it on every sign-in.
    pub fn new(container: NodeRef<Div>, client_id: &str, callback: Function) -> Self {
        Self {
            container,
            client_id: client_id.to_owned(),
            callback,
            options: ButtonOptions::default(),
        }
    }

    fn render_into(&self, sdk: &Object, el: &web_sys::HtmlDivElement) -> Result<(), JsValue> {
        let config = Object::new();
        Reflect::set(
            &config,
            &JsValue::from_str("client_id"),
            &JsValue::from_str(&self.client_id),
        )?;
        Reflect::set(&config, &JsValue::from_str("callback"), &self.callback)?;
        method(sdk, "initialize")?.call1(sdk, &config)?;

        let options = serde_json::to_string(&self.options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let options = js_sys::JSON::parse(&options)?;
        method(sdk, "renderButton")?.call2(sdk, el, &options)?;
        Ok(())
    }
}

impl RenderTarget for GsiButton {
    fn try_render(&mut self) -> bool {
        let (Some(sdk), Some(el)) = (sdk(), self.container.get_untracked()) else {
            return false;
        };
        el.set_inner_html("");
        match self.render_into(&sdk, &el) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("renderButton failed: {err:?}");
                false
            }
        }
    }
}

/// `IntersectionObserver` on the button container.
pub struct DomVisibilityWatch {
    container: NodeRef<Div>,
    observer: Option<IntersectionObserver>,
    callback: Option<Closure<dyn FnMut(js_sys::Array)>>,
    seen: Option<oneshot::Receiver<()>>,
}

impl DomVisibilityWatch {
    pub fn new(container: NodeRef<Div>) -> Self {
        Self {
            container,
            observer: None,
            callback: None,
            seen: None,
        }
    }
}

impl VisibilityWatch for DomVisibilityWatch {
    fn observe(&mut self, threshold: f64) {
        let Some(el) = self.container.get_untracked() else {
            log::debug!("sign-in container not mounted; visibility fallback inert");
            return;
        };
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let hit = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|entry| {
                    entry.is_intersecting() && entry.intersection_ratio() >= threshold
                });
            if hit {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(());
                }
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                observer.observe(&el);
                self.observer = Some(observer);
                self.callback = Some(callback);
                self.seen = Some(rx);
            }
            Err(err) => log::warn!("IntersectionObserver unavailable: {err:?}"),
        }
    }

    async fn intersected(&mut self) {
        if let Some(seen) = self.seen.as_mut() {
            if seen.await.is_ok() {
                return;
            }
        }
        futures::future::pending::<()>().await;
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.callback = None;
        self.seen = None;
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GlooClock;

impl Clock for GlooClock {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
