//! Trail markers as DOM elements

use crate::render::{MarkerId, MarkerStyle, MarkerSurface};
use crate::trail::{SessionKey, TrailPoint};
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

/// Renders each marker as a fixed-position round `<div>` under `parent`
pub struct DomSurface {
    document: Document,
    parent: HtmlElement,
    elements: HashMap<MarkerId, HtmlElement>,
}

impl DomSurface {
    pub fn new(document: Document, parent: HtmlElement) -> Self {
        Self {
            document,
            parent,
            elements: HashMap::new(),
        }
    }

    pub fn element(&self, marker: MarkerId) -> Option<&HtmlElement> {
        self.elements.get(&marker)
    }

    fn build_element(&self, point: &TrailPoint, style: &MarkerStyle) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self
            .document
            .create_element("div")?
            .dyn_into()
            .map_err(JsValue::from)?;
        el.set_class_name(&style.class_name);

        let size = format!("{}px", point.size);
        let s = el.style();
        s.set_property("position", "fixed")?;
        s.set_property("width", &size)?;
        s.set_property("height", &size)?;
        s.set_property("background", &style.color)?;
        s.set_property("border-radius", "50%")?;
        s.set_property("pointer-events", "none")?;
        s.set_property("z-index", &style.z_index.to_string())?;
        s.set_property("transition", &style.transition)?;
        s.set_property("transform", "translate(-50%, -50%)")?;
        apply_point(&el, point)?;

        self.parent.append_child(&el)?;
        Ok(el)
    }
}

fn apply_point(el: &HtmlElement, point: &TrailPoint) -> Result<(), JsValue> {
    let s = el.style();
    s.set_property("left", &format!("{}px", point.position.x))?;
    s.set_property("top", &format!("{}px", point.position.y))?;
    s.set_property("opacity", &point.opacity.to_string())?;
    Ok(())
}

impl MarkerSurface for DomSurface {
    fn create_marker(&mut self, session: SessionKey, point: &TrailPoint, style: &MarkerStyle) {
        match self.build_element(point, style) {
            Ok(el) => {
                self.elements.insert(point.marker, el);
            }
            Err(err) => tracing::warn!(
                "Failed to create {} for session {}: {:?}",
                point.marker,
                session,
                err
            ),
        }
    }

    fn update_marker(&mut self, point: &TrailPoint) {
        if let Some(el) = self.elements.get(&point.marker) {
            // A skipped style write self-corrects on the next frame
            let _ = apply_point(el, point);
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if let Some(el) = self.elements.remove(&marker) {
            el.remove();
        }
    }
}

impl std::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomSurface")
            .field("parent", &"HtmlElement")
            .field("elements_len", &self.elements.len())
            .finish()
    }
}
