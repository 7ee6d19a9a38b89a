use std::rc::Rc;

use crate::{
    dom::{Dom, DomEvent, EventKind, ListenTarget},
    page::Page,
};

const TRIGGER_SELECTOR: &str = ".project-short";
const PANEL_SELECTOR: &str = ".project-details";
const DOWNLOAD_SELECTOR: &str = ".project-download";
const OPEN_CLASS: &str = "open";

/// Flips the details panel next to `trigger`. Returns the new open state, or `None` when the
/// trigger has no panel.
pub fn toggle_details<D: Dom>(dom: &D, trigger: &D::Element) -> Option<bool> {
    let parent = dom.parent(trigger)?;
    let panel = dom.query_within(&parent, PANEL_SELECTOR)?;

    let open = dom.toggle_class(&panel, OPEN_CLASS);
    dom.set_attribute(&panel, "aria-hidden", &(!open).to_string());
    dom.set_attribute(trigger, "aria-expanded", &open.to_string());
    Some(open)
}

pub fn install_accordion<D: Dom + 'static>(page: &Page<D>) {
    let triggers = page.dom.query_all(TRIGGER_SELECTOR);
    if triggers.is_empty() {
        page.skipped("project_accordion", TRIGGER_SELECTOR);
        return;
    }

    for trigger in triggers {
        let click_dom = Rc::clone(&page.dom);
        let click_trigger = trigger.clone();
        page.dom.listen(
            ListenTarget::Element(trigger.clone()),
            EventKind::Click,
            Box::new(move |_: &DomEvent<D::Element>| {
                toggle_details(&*click_dom, &click_trigger);
            }),
        );

        let key_dom = Rc::clone(&page.dom);
        let key_trigger = trigger.clone();
        page.dom.listen(
            ListenTarget::Element(trigger),
            EventKind::KeyDown,
            Box::new(move |event: &DomEvent<D::Element>| {
                if event.key_is("Enter") || event.key_is(" ") {
                    event.prevent_default();
                    toggle_details(&*key_dom, &key_trigger);
                }
            }),
        );
    }
}

pub fn install_project_downloads<D: Dom>(page: &Page<D>) {
    for link in page.dom.query_all(DOWNLOAD_SELECTOR) {
        if let Some(file) = page
            .dom
            .attribute(&link, "data-file")
            .filter(|file| !file.trim().is_empty())
        {
            page.dom.set_attribute(&link, "href", &file);
        }
    }
}
