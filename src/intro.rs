use std::rc::Rc;

use crate::{dom::Dom, page::Page};

const FOOTER_SELECTOR: &str = "footer p";
const TITLE_SELECTOR: &str = "header h1";
const SUBTITLE_SELECTOR: &str = "header p";
const LOADED_CLASS: &str = "loaded";

pub fn footer_notice(year: i32, owner: &str) -> String {
    format!("© {year} {owner}")
}

pub fn install_intro<D: Dom + 'static>(page: &Page<D>) {
    if let Some(footer) = page.find("footer_year", FOOTER_SELECTOR) {
        let year = page.dom.local_time().year;
        page.dom.set_text(&footer, &footer_notice(year, &page.config.footer_owner));
    }

    for (selector, delay) in [
        (TITLE_SELECTOR, page.config.header_title_delay_ms),
        (SUBTITLE_SELECTOR, page.config.header_subtitle_delay_ms),
    ] {
        let Some(element) = page.find("header_intro", selector) else {
            continue;
        };
        let dom = Rc::clone(&page.dom);
        page.scheduler
            .set_timeout(delay, Box::new(move || dom.add_class(&element, LOADED_CLASS)));
    }
}

pub fn mark_body_loaded<D: Dom>(page: &Page<D>) {
    if let Some(body) = page.dom.body() {
        page.dom.add_class(&body, LOADED_CLASS);
    }
}
