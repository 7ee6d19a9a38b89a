use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde_json::json;

use crate::{
    dom::{Dom, DomEvent, EventKind, ListenTarget},
    page::Page,
    telemetry::{log_event, LogLevel},
};

const MODAL_ID: &str = "video-modal";
const IFRAME_ID: &str = "video-iframe";
const OPEN_TRIGGER_SELECTOR: &str = ".open-video-btn";
const CLOSE_CONTROL_SELECTOR: &str = ".video-modal-close";
const SOURCE_ATTRIBUTE: &str = "data-video-src";
const CLOSE_ATTRIBUTE: &str = "data-close";
const OPEN_CLASS: &str = "open";

/// Single video modal. The iframe only receives a source while the modal is open.
pub struct VideoLightbox<D: Dom> {
    page: Page<D>,
    modal: D::Element,
    iframe: D::Element,
    open: Cell<bool>,
    source: RefCell<Option<String>>,
}

impl<D: Dom + 'static> VideoLightbox<D> {
    pub fn install(page: &Page<D>) -> Option<Rc<Self>> {
        let modal = page.find_by_id("video_lightbox", MODAL_ID)?;
        let iframe = page.find_by_id("video_lightbox", IFRAME_ID)?;
        let lightbox = Rc::new(Self {
            page: page.clone(),
            modal: modal.clone(),
            iframe,
            open: Cell::new(false),
            source: RefCell::new(None),
        });

        for trigger in page.dom.query_all(OPEN_TRIGGER_SELECTOR) {
            let opener = Rc::clone(&lightbox);
            let source_trigger = trigger.clone();
            page.dom.listen(
                ListenTarget::Element(trigger),
                EventKind::Click,
                Box::new(move |_: &DomEvent<D::Element>| {
                    let source = opener.page.dom.attribute(&source_trigger, SOURCE_ATTRIBUTE);
                    if let Some(url) = source.filter(|url| !url.is_empty()) {
                        opener.open(&url);
                    }
                }),
            );
        }

        let closer = Rc::clone(&lightbox);
        page.dom.listen(
            ListenTarget::Element(modal),
            EventKind::Click,
            Box::new(move |event: &DomEvent<D::Element>| {
                let flagged = event
                    .target
                    .as_ref()
                    .is_some_and(|target| closer.page.dom.has_attribute(target, CLOSE_ATTRIBUTE));
                if flagged {
                    closer.close();
                }
            }),
        );

        let escaper = Rc::clone(&lightbox);
        page.dom.listen(
            ListenTarget::Document,
            EventKind::KeyDown,
            Box::new(move |event: &DomEvent<D::Element>| {
                if event.key_is("Escape") && escaper.is_open() {
                    escaper.close();
                }
            }),
        );

        Some(lightbox)
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    pub fn open(&self, url: &str) {
        let dom = &self.page.dom;
        dom.set_attribute(&self.iframe, "src", url);
        dom.add_class(&self.modal, OPEN_CLASS);
        dom.set_attribute(&self.modal, "aria-hidden", "false");
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "hidden");
        }
        if let Some(close_control) = dom.query_within(&self.modal, CLOSE_CONTROL_SELECTOR) {
            dom.focus(&close_control);
        }

        self.open.set(true);
        *self.source.borrow_mut() = Some(url.to_string());
        log_event(&self.page.config, LogLevel::Debug, "video_opened", json!({ "src": url }));
    }

    pub fn close(&self) {
        let dom = &self.page.dom;
        dom.remove_class(&self.modal, OPEN_CLASS);
        dom.set_attribute(&self.modal, "aria-hidden", "true");
        dom.set_attribute(&self.iframe, "src", "");
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "");
        }

        self.open.set(false);
        self.source.borrow_mut().take();
        log_event(&self.page.config, LogLevel::Debug, "video_closed", json!({}));
    }
}
