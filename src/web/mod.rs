//! Browser host
//!
//! Wires document touch and mouse events into a [`TrailEngine`], draws
//! markers as `<div>`s, and drives frames with `requestAnimationFrame`.
//! Call [`start_trails`] from JavaScript once the DOM is ready.

mod dom;
mod raf;

pub use dom::DomSurface;
pub use raf::RafScheduler;

use crate::config::TrailConfig;
use crate::engine::{FrameLoop, TrailEngine};
use crate::input::{ContactPoint, DeviceCapabilities, InputEvent};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, Event, MouseEvent, TouchEvent, TouchList, Window};

type SharedEngine = Rc<RefCell<TrailEngine<DomSurface>>>;
type Translate = fn(&Event) -> InputEvent;

struct Listener {
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// A running trail effect; dropping it detaches every listener and stops
/// the frame loop
pub struct TrailHandle {
    document: Document,
    frame_loop: FrameLoop<DomSurface>,
    listeners: Vec<Listener>,
}

impl TrailHandle {
    pub fn engine(&self) -> &SharedEngine {
        self.frame_loop.engine()
    }
}

impl Drop for TrailHandle {
    fn drop(&mut self) {
        self.frame_loop.stop();
        for listener in &self.listeners {
            let _ = self.document.remove_event_listener_with_callback(
                listener.name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

impl std::fmt::Debug for TrailHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailHandle")
            .field("frame_loop", &self.frame_loop)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Read touch and hover support once
pub fn detect_capabilities(window: &Window) -> DeviceCapabilities {
    let touch = js_sys::Reflect::has(window.as_ref(), &JsValue::from_str("ontouchstart")).unwrap_or(false);
    let hover = window
        .match_media("(hover: hover)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());
    DeviceCapabilities::new(touch, hover)
}

/// Install the trail effect on the current document
pub fn attach(config: TrailConfig) -> Result<TrailHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("No document body"))?;

    let capabilities = detect_capabilities(&window);
    let surface = DomSurface::new(document.clone(), body);
    let engine = TrailEngine::new(config, capabilities, surface)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let engine: SharedEngine = Rc::new(RefCell::new(engine));

    let mut listeners = Vec::new();
    for (name, translate) in translators() {
        listeners.push(listen(&document, name, Rc::clone(&engine), translate)?);
    }

    let frame_loop = FrameLoop::new(engine, Rc::new(RafScheduler::new(window)));
    frame_loop.start();

    Ok(TrailHandle {
        document,
        frame_loop,
        listeners,
    })
}

/// Start the trail effect with the default look for the page's lifetime
#[wasm_bindgen]
pub fn start_trails() -> Result<(), JsValue> {
    let handle = attach(TrailConfig::default())?;
    std::mem::forget(handle);
    Ok(())
}

/// Like [`start_trails`], with a JSON [`TrailConfig`]
#[wasm_bindgen]
pub fn start_trails_with_config(config_json: &str) -> Result<(), JsValue> {
    let config: TrailConfig =
        serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let handle = attach(config)?;
    std::mem::forget(handle);
    Ok(())
}

fn listen(
    document: &Document,
    name: &'static str,
    engine: SharedEngine,
    translate: Translate,
) -> Result<Listener, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let input = translate(&event);
        match engine.try_borrow_mut() {
            Ok(mut engine) => engine.handle(&input),
            Err(_) => tracing::trace!("Engine busy, dropping {}", event.type_()),
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;

    Ok(Listener { name, closure })
}

fn translators() -> [(&'static str, Translate); 7] {
    [
        ("touchstart", touch_start),
        ("touchmove", touch_move),
        ("touchend", touch_end),
        ("touchcancel", touch_cancel),
        ("mousemove", mouse_move),
        ("mouseenter", mouse_enter),
        ("mouseleave", mouse_leave),
    ]
}

fn contacts(list: &TouchList) -> Vec<ContactPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|touch| {
            ContactPoint::new(
                touch.identifier(),
                f64::from(touch.client_x()),
                f64::from(touch.client_y()),
            )
        })
        .collect()
}

fn touches(event: &Event) -> Vec<ContactPoint> {
    contacts(&event.unchecked_ref::<TouchEvent>().touches())
}

fn touch_start(event: &Event) -> InputEvent {
    InputEvent::ContactStart {
        contacts: touches(event),
    }
}

fn touch_move(event: &Event) -> InputEvent {
    InputEvent::ContactMove {
        contacts: touches(event),
    }
}

fn touch_end(event: &Event) -> InputEvent {
    InputEvent::ContactEnd {
        remaining: touches(event),
    }
}

fn touch_cancel(_event: &Event) -> InputEvent {
    InputEvent::ContactCancel
}

fn mouse_move(event: &Event) -> InputEvent {
    let mouse = event.unchecked_ref::<MouseEvent>();
    InputEvent::PointerMove {
        x: f64::from(mouse.client_x()),
        y: f64::from(mouse.client_y()),
    }
}

fn mouse_enter(_event: &Event) -> InputEvent {
    InputEvent::PointerEnter
}

fn mouse_leave(_event: &Event) -> InputEvent {
    InputEvent::PointerLeave
}
