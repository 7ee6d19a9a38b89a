use std::{cell::Cell, rc::Rc};

use crate::{
    dom::{Dom, LocalTime},
    page::Page,
};

const CLOCK_SELECTOR: &str = ".clock";
const GREETING_SELECTOR: &str = ".greeting";
const FLASH_CLASS: &str = "flash";

pub fn format_clock(time: LocalTime) -> String {
    format!("{:02}:{:02}:{:02}", time.hours, time.minutes, time.seconds)
}

pub struct Clock<D: Dom> {
    dom: Rc<D>,
    element: Option<D::Element>,
}

impl<D: Dom + 'static> Clock<D> {
    /// Writes the time immediately, then once per configured period for the page's lifetime.
    pub fn install(page: &Page<D>) -> Rc<Self> {
        let clock = Rc::new(Self {
            dom: Rc::clone(&page.dom),
            element: page.find("clock", CLOCK_SELECTOR),
        });
        clock.tick();

        if clock.element.is_some() {
            let ticking = Rc::clone(&clock);
            page.scheduler
                .set_interval(page.config.clock_period_ms, Box::new(move || ticking.tick()));
        }
        clock
    }

    pub fn tick(&self) {
        let Some(element) = self.element.as_ref() else {
            return;
        };
        self.dom.set_text(element, &format_clock(self.dom.local_time()));
    }
}

/// Circular cursor over the configured greetings; the first advance lands on the second word.
pub struct GreetingRotator<D: Dom> {
    page: Page<D>,
    element: Option<D::Element>,
    index: Cell<usize>,
}

impl<D: Dom + 'static> GreetingRotator<D> {
    pub fn install(page: &Page<D>) -> Rc<Self> {
        let rotator = Rc::new(Self {
            page: page.clone(),
            element: page.find("greeting_rotator", GREETING_SELECTOR),
            index: Cell::new(0),
        });

        if rotator.element.is_some() && !page.config.greetings.is_empty() {
            let rotating = Rc::clone(&rotator);
            page.scheduler.set_interval(
                page.config.greeting_period_ms,
                Box::new(move || rotating.rotate()),
            );
        }
        rotator
    }

    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub fn advance(&self) -> Option<&str> {
        let greetings = &self.page.config.greetings;
        if greetings.is_empty() {
            return None;
        }
        let next = (self.index.get() + 1) % greetings.len();
        self.index.set(next);
        greetings.get(next).map(String::as_str)
    }

    pub fn rotate(&self) {
        let Some(element) = self.element.as_ref() else {
            return;
        };
        let Some(word) = self.advance() else {
            return;
        };

        let dom = &self.page.dom;
        dom.set_text(element, word);
        dom.add_class(element, FLASH_CLASS);

        let flash_dom = Rc::clone(dom);
        let flash_element = element.clone();
        self.page.scheduler.set_timeout(
            self.page.config.greeting_flash_ms,
            Box::new(move || flash_dom.remove_class(&flash_element, FLASH_CLASS)),
        );
    }
}
