use std::rc::Rc;

use crate::{
    dom::{Dom, DomEvent, EventKind, ListenTarget, Viewport},
    page::Page,
    reveal::VISIBLE_CLASS,
};

const CARD_SELECTOR: &str = ".project, .job, .volunteer, .leadership";
const INTERACTIVE_SELECTOR: &str = "nav a, .links a, .project, .job, .volunteer, .leadership";
const HOVER_TRANSITION: &str = "all 0.3s cubic-bezier(0.16, 1, 0.3, 1)";
const CARD_DRIFT_SPEED: f64 = 0.5;

/// Pointer-driven drift for the card at `index`; neighbouring cards move in opposite directions.
pub fn card_drift(index: usize, client_x: f64, client_y: f64, viewport: Viewport) -> (f64, f64) {
    let speed = if index % 2 == 0 {
        CARD_DRIFT_SPEED
    } else {
        -CARD_DRIFT_SPEED
    };
    let x = (client_x / viewport.width.max(1.0) - 0.5) * speed;
    let y = (client_y / viewport.height.max(1.0) - 0.5) * speed;
    (x, y)
}

pub fn install_card_drift<D: Dom + 'static>(page: &Page<D>) {
    if page.dom.query(CARD_SELECTOR).is_none() {
        page.skipped("card_drift", CARD_SELECTOR);
        return;
    }

    let dom = Rc::clone(&page.dom);
    page.dom.listen(
        ListenTarget::Document,
        EventKind::MouseMove,
        Box::new(move |event: &DomEvent<D::Element>| {
            let viewport = dom.viewport();
            for (index, card) in dom.query_all(CARD_SELECTOR).iter().enumerate() {
                if !dom.has_class(card, VISIBLE_CLASS) {
                    continue;
                }
                let (x, y) = card_drift(index, event.client_x, event.client_y, viewport);
                dom.set_style(card, "transform", &format!("translateX({x}px) translateY({y}px)"));
            }
        }),
    );
}

pub fn install_hover_easing<D: Dom + 'static>(page: &Page<D>) {
    for element in page.dom.query_all(INTERACTIVE_SELECTOR) {
        let enter_dom = Rc::clone(&page.dom);
        let enter_element = element.clone();
        page.dom.listen(
            ListenTarget::Element(element.clone()),
            EventKind::MouseEnter,
            Box::new(move |_: &DomEvent<D::Element>| {
                enter_dom.set_style(&enter_element, "transition", HOVER_TRANSITION);
            }),
        );

        let leave_dom = Rc::clone(&page.dom);
        let leave_element = element.clone();
        page.dom.listen(
            ListenTarget::Element(element),
            EventKind::MouseLeave,
            Box::new(move |_: &DomEvent<D::Element>| {
                leave_dom.set_style(&leave_element, "transform", "");
                leave_dom.set_style(&leave_element, "transition", HOVER_TRANSITION);
            }),
        );
    }
}
