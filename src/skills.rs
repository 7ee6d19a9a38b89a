use std::rc::Rc;

use serde_json::json;

use crate::{
    dom::{
        Dom, DomEvent, EventKind, IntersectionEntry, IntersectionHandler, ListenTarget, ObserverId,
        ObserverOptions, Rect,
    },
    page::Page,
    telemetry::{log_event, LogLevel},
};

const GRID_SELECTOR: &str = ".skills-visual-grid";
const BUBBLE_SELECTOR: &str = ".skill-bubble";
const WRAP_SELECTOR: &str = ".skillsicons-wrap";
const IMAGE_SELECTOR: &str = ".skillsicons-img";
const LOADED_CLASS: &str = "loaded";
const REVEALED_CLASS: &str = "revealed";

/// Indexes the skill bubbles for the CSS cascade and marks the grid loaded shortly after.
pub fn install_skills_grid<D: Dom + 'static>(page: &Page<D>) {
    let Some(grid) = page.find("skills_grid", GRID_SELECTOR) else {
        return;
    };

    for (index, bubble) in page.dom.query_all_within(&grid, BUBBLE_SELECTOR).iter().enumerate() {
        let index = index.to_string();
        page.dom.set_style(bubble, "--i", &index);
        page.dom.set_attribute(bubble, "data-index", &index);
    }

    let dom = Rc::clone(&page.dom);
    page.scheduler.set_timeout(
        page.config.skills_grid_delay_ms,
        Box::new(move || dom.add_class(&grid, LOADED_CLASS)),
    );
}

/// Offset for the icon image given a pointer position: each axis scales linearly from `-max` at
/// the wrapper's near edge to `+max` at its far edge, clamped outside the bounds.
pub fn icon_offset(bounds: Rect, client_x: f64, client_y: f64, max_x: f64, max_y: f64) -> Option<(f64, f64)> {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }

    let dx = ((client_x - bounds.left) / bounds.width * 2.0 - 1.0).clamp(-1.0, 1.0);
    let dy = ((client_y - bounds.top) / bounds.height * 2.0 - 1.0).clamp(-1.0, 1.0);
    Some((dx * max_x, dy * max_y))
}

pub fn install_skills_icon<D: Dom + 'static>(page: &Page<D>) {
    let Some(wrap) = page.find("skills_icon", WRAP_SELECTOR) else {
        return;
    };
    let Some(image) = page.find("skills_icon", IMAGE_SELECTOR) else {
        return;
    };

    let reveal_dom = Rc::clone(&page.dom);
    let handler: IntersectionHandler<D::Element> =
        Box::new(move |entries: &[IntersectionEntry<D::Element>], observer: ObserverId| {
            if let Some(entry) = entries.iter().find(|entry| entry.intersecting) {
                reveal_dom.add_class(&entry.target, REVEALED_CLASS);
                reveal_dom.disconnect(observer);
            }
        });
    let options = ObserverOptions {
        threshold: page.config.skills_reveal_threshold,
        bottom_margin_px: 0.0,
    };
    if let Err(err) = page.dom.observe_intersections(std::slice::from_ref(&wrap), options, handler) {
        log_event(
            &page.config,
            LogLevel::Warn,
            "skills_observer_failed",
            json!({ "error": err.to_string() }),
        );
    }

    let move_page = page.clone();
    let move_wrap = wrap.clone();
    let move_image = image.clone();
    page.dom.listen(
        ListenTarget::Element(wrap.clone()),
        EventKind::MouseMove,
        Box::new(move |event: &DomEvent<D::Element>| {
            let dom = &move_page.dom;
            if !dom.has_class(&move_wrap, REVEALED_CLASS) {
                return;
            }
            let Some((x, y)) = icon_offset(
                dom.bounding_rect(&move_wrap),
                event.client_x,
                event.client_y,
                move_page.config.skills_parallax_x_px,
                move_page.config.skills_parallax_y_px,
            ) else {
                return;
            };
            dom.set_style(
                &move_image,
                "transform",
                &format!("translate3d({x}px, {y}px, 0) scale(1.02)"),
            );
        }),
    );

    let leave_dom = Rc::clone(&page.dom);
    page.dom.listen(
        ListenTarget::Element(wrap),
        EventKind::MouseLeave,
        Box::new(move |_: &DomEvent<D::Element>| leave_dom.set_style(&image, "transform", "")),
    );
}
