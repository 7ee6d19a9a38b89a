use std::rc::Rc;

use serde_json::json;

use crate::{
    dom::{Dom, DomEvent, EventKind, ListenTarget},
    page::Page,
    schedule::debounce,
    telemetry::{log_event, LogLevel},
};

pub const NAV_LINK_SELECTOR: &str = "nav a[href^=\"#\"]";
const HEADER_SELECTOR: &str = "header";
const TEXT_SELECTOR: &str = "section p, section h3";
const PULSE_TRANSFORM: &str = "scale(0.95)";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaderEffect {
    pub translate_y: f64,
    pub opacity: f64,
}

/// Parallax offset and fade for the header, or `None` once the header has scrolled a full
/// viewport away and should be left as is.
pub fn header_effect(
    scroll_offset: f64,
    viewport_height: f64,
    factor: f64,
    min_opacity: f64,
) -> Option<HeaderEffect> {
    if viewport_height <= 0.0 || scroll_offset >= viewport_height {
        return None;
    }

    let progress = (scroll_offset / viewport_height).max(0.0);
    Some(HeaderEffect {
        translate_y: scroll_offset * factor,
        opacity: 1.0 - progress * (1.0 - min_opacity),
    })
}

pub fn install_smooth_navigation<D: Dom + 'static>(page: &Page<D>) {
    let links = page.dom.query_all(NAV_LINK_SELECTOR);
    if links.is_empty() {
        page.skipped("smooth_navigation", NAV_LINK_SELECTOR);
        return;
    }

    for link in links {
        let handler_page = page.clone();
        let handler_link = link.clone();
        page.dom.listen(
            ListenTarget::Element(link),
            EventKind::Click,
            Box::new(move |event: &DomEvent<D::Element>| {
                event.prevent_default();
                navigate(&handler_page, &handler_link);
            }),
        );
    }
}

fn navigate<D: Dom + 'static>(page: &Page<D>, link: &D::Element) {
    let dom = &page.dom;
    let Some(fragment) = dom
        .attribute(link, "href")
        .and_then(|href| href.strip_prefix('#').map(ToString::to_string))
        .filter(|fragment| !fragment.is_empty())
    else {
        return;
    };
    let Some(target) = dom.element_by_id(&fragment) else {
        page.skipped("smooth_navigation", &format!("#{fragment}"));
        return;
    };

    let top = (dom.offset_top(&target) - page.config.nav_scroll_offset_px).max(0.0);
    dom.scroll_to(top, !dom.prefers_reduced_motion());

    dom.set_style(link, "transform", PULSE_TRANSFORM);
    let pulse_dom = Rc::clone(dom);
    let pulse_link = link.clone();
    page.scheduler.set_timeout(
        page.config.nav_pulse_ms,
        Box::new(move || pulse_dom.set_style(&pulse_link, "transform", "")),
    );
}

pub fn install_scroll_effects<D: Dom + 'static>(page: &Page<D>) {
    let header = page.find("header_parallax", HEADER_SELECTOR);
    let handler_page = page.clone();
    page.dom.listen(
        ListenTarget::Window,
        EventKind::Scroll,
        Box::new(move |_: &DomEvent<D::Element>| {
            if let Some(header) = header.as_ref() {
                apply_header_parallax(&handler_page, header);
            }
            reveal_text(&handler_page);
        }),
    );
}

fn apply_header_parallax<D: Dom>(page: &Page<D>, header: &D::Element) {
    let dom = &page.dom;
    let Some(effect) = header_effect(
        dom.scroll_offset(),
        dom.viewport().height,
        page.config.header_parallax_factor,
        page.config.header_min_opacity,
    ) else {
        return;
    };

    dom.set_style(header, "transform", &format!("translateY({}px)", effect.translate_y));
    dom.set_style(header, "opacity", &effect.opacity.to_string());
}

/// Shows every section paragraph or heading whose top edge is close to entering the viewport.
pub fn reveal_text<D: Dom>(page: &Page<D>) {
    let dom = &page.dom;
    let limit = dom.viewport().height - page.config.text_reveal_lead_px;
    for element in dom.query_all(TEXT_SELECTOR) {
        if dom.bounding_rect(&element).top < limit {
            dom.set_style(&element, "opacity", "1");
            dom.set_style(&element, "transform", "translateY(0)");
        }
    }
}

/// Trailing scroll hook for effects that only need to run once scrolling settles.
pub fn install_settled_scroll<D: Dom + 'static>(page: &Page<D>) {
    let config = Rc::clone(&page.config);
    let settled = debounce(
        Rc::clone(&page.scheduler),
        page.config.scroll_debounce_ms,
        move |offset: f64| {
            log_event(&config, LogLevel::Debug, "scroll_settled", json!({ "offset": offset }));
        },
    );

    let dom = Rc::clone(&page.dom);
    page.dom.listen(
        ListenTarget::Window,
        EventKind::Scroll,
        Box::new(move |_: &DomEvent<D::Element>| settled.call(dom.scroll_offset())),
    );
}
