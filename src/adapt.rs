use std::rc::Rc;

use serde_json::json;

use crate::{
    dom::{Dom, DomEvent, EventKind, ListenTarget},
    page::Page,
    telemetry::{log_event, LogLevel},
};

pub const TOUCH_CLASS: &str = "no-fancy-ui";
pub const KEYBOARD_CLASS: &str = "keyboard-navigation";
const REDUCED_MOTION_STYLES: [(&str, &str); 4] = [
    ("animation-duration", "0.01ms"),
    ("animation-iteration-count", "1"),
    ("transition-duration", "0.01ms"),
    ("scroll-behavior", "auto"),
];

/// Returns whether the page was marked as touch-driven. Probe failures leave the page untouched.
pub fn apply_touch_marker<D: Dom>(page: &Page<D>) -> bool {
    match page.dom.touch_capable() {
        Ok(true) => {
            if let Some(root) = page.dom.root() {
                page.dom.add_class(&root, TOUCH_CLASS);
            }
            true
        }
        Ok(false) => false,
        Err(err) => {
            log_event(
                &page.config,
                LogLevel::Debug,
                "touch_probe_failed",
                json!({ "error": err.to_string() }),
            );
            false
        }
    }
}

/// One-shot at load: later changes to the media preference are not tracked.
pub fn apply_reduced_motion<D: Dom>(page: &Page<D>) -> bool {
    if !page.dom.prefers_reduced_motion() {
        return false;
    }

    let elements = page.dom.query_all("*");
    for element in &elements {
        for (property, value) in REDUCED_MOTION_STYLES {
            page.dom.set_style(element, property, value);
        }
    }
    log_event(
        &page.config,
        LogLevel::Info,
        "reduced_motion_applied",
        json!({ "elements": elements.len() }),
    );
    true
}

pub fn install_input_mode<D: Dom + 'static>(page: &Page<D>) {
    let key_dom = Rc::clone(&page.dom);
    page.dom.listen(
        ListenTarget::Document,
        EventKind::KeyDown,
        Box::new(move |event: &DomEvent<D::Element>| {
            if event.key_is("Tab") {
                if let Some(body) = key_dom.body() {
                    key_dom.add_class(&body, KEYBOARD_CLASS);
                }
            }
        }),
    );

    let mouse_dom = Rc::clone(&page.dom);
    page.dom.listen(
        ListenTarget::Document,
        EventKind::MouseDown,
        Box::new(move |_: &DomEvent<D::Element>| {
            if let Some(body) = mouse_dom.body() {
                mouse_dom.remove_class(&body, KEYBOARD_CLASS);
            }
        }),
    );
}
