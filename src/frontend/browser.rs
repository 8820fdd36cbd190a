//! Thin web-sys bindings for the pieces of logic that touch the document:
//! theme attribute and storage, stack panels and window listeners.

use crate::stack::{LayerTarget, PanelBox, StackLayer, ACTIVE_CLASS};
use crate::theme::{ThemeHost, THEME_ATTRIBUTE, THEME_KEY};
use js_sys::{Function, Reflect};
use std::cell::RefCell;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Document, Element, Event, HtmlElement, Storage};

thread_local! {
    /// Theme handed to a view transition whose update callback has not run yet.
    static PENDING_THEME: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn current_path() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| "/".to_string())
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

fn matches_media(query: &str) -> bool {
    window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

pub fn system_prefers_dark() -> bool {
    matches_media("(prefers-color-scheme: dark)")
}

fn prefers_reduced_motion() -> bool {
    matches_media("(prefers-reduced-motion: reduce)")
}

/// Theme state kept on `<body>` and mirrored to local storage. Missing body or
/// storage turns the matching reads into `None` and writes into no-ops.
pub struct WebThemeHost {
    body: Option<HtmlElement>,
    storage: Option<Storage>,
    animate: bool,
}

impl WebThemeHost {
    pub fn new(animate: bool) -> Self {
        Self {
            body: document().and_then(|d| d.body()),
            storage: local_storage(),
            animate,
        }
    }
}

impl ThemeHost for WebThemeHost {
    fn attribute(&self) -> Option<String> {
        self.body.as_ref()?.get_attribute(THEME_ATTRIBUTE)
    }

    fn set_attribute(&self, value: &str) {
        let Some(body) = self.body.clone() else {
            return;
        };

        if self.animate && !prefers_reduced_motion() {
            let target = body.clone();
            let next = value.to_string();
            PENDING_THEME.with(|pending| *pending.borrow_mut() = Some(next.clone()));
            if start_view_transition(move || {
                let _ = target.set_attribute(THEME_ATTRIBUTE, &next);
                PENDING_THEME.with(|pending| {
                    let mut pending = pending.borrow_mut();
                    if pending.as_deref() == Some(next.as_str()) {
                        *pending = None;
                    }
                });
            }) {
                return;
            }
        }

        PENDING_THEME.with(|pending| *pending.borrow_mut() = None);
        let _ = body.set_attribute(THEME_ATTRIBUTE, value);
    }

    fn pending(&self) -> Option<String> {
        PENDING_THEME.with(|pending| pending.borrow().clone())
    }

    fn stored(&self) -> Option<String> {
        self.storage.as_ref()?.get_item(THEME_KEY).ok().flatten()
    }

    fn store(&self, value: &str) {
        if let Some(storage) = self.storage.as_ref() {
            let _ = storage.set_item(THEME_KEY, value);
        }
    }
}

/// Runs `update` inside `document.startViewTransition` when the browser has it.
/// Returns `false` without calling `update` otherwise.
fn start_view_transition(update: impl FnOnce() + 'static) -> bool {
    let Some(document) = document() else {
        return false;
    };

    let document_js: JsValue = document.into();
    let Ok(start) = Reflect::get(&document_js, &JsValue::from_str("startViewTransition")) else {
        return false;
    };
    let Some(start) = start.dyn_ref::<Function>() else {
        return false;
    };

    let callback = Closure::once_into_js(update);
    start.call1(&document_js, &callback).is_ok()
}

/// Image, panel and menu link of one stack layer.
pub struct DomLayerTarget {
    image: Element,
    panel: Element,
    link: Option<Element>,
}

impl DomLayerTarget {
    pub fn locate(document: &Document, layer: &StackLayer) -> Option<Self> {
        Some(Self {
            image: document.get_element_by_id(&layer.image_id())?,
            panel: document.get_element_by_id(&layer.panel_id())?,
            link: document.get_element_by_id(&layer.menu_link_id()),
        })
    }
}

impl LayerTarget for DomLayerTarget {
    fn panel_box(&self) -> PanelBox {
        let rect = self.panel.get_bounding_client_rect();
        PanelBox {
            top: rect.top(),
            bottom: rect.bottom(),
        }
    }

    fn set_active(&self, active: bool) {
        let _ = self.image.class_list().toggle_with_force(ACTIVE_CLASS, active);
        if let Some(link) = self.link.as_ref() {
            let _ = link.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }
}

/// A `window` event listener that is detached when dropped.
pub struct WindowListener {
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
    pub fn add(event: &'static str, callback: impl FnMut(Event) + 'static) -> Option<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        window()?
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { event, callback })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        if let Some(w) = window() {
            let _ = w.remove_event_listener_with_callback(
                self.event,
                self.callback.as_ref().unchecked_ref(),
            );
        }
    }
}
