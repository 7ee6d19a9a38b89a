use std::{cell::RefCell, rc::Rc};

use serde_json::json;

use crate::{
    dom::{Dom, IntersectionEntry, IntersectionHandler, ObserverId, ObserverOptions},
    page::Page,
    telemetry::{log_event, LogLevel},
};

pub const ANIMATABLE_SELECTOR: &str =
    ".fade-in, .slide-in, .project, .job, .volunteer, .leadership, .links";
pub const GROUP_CLASSES: [&str; 4] = ["project", "job", "volunteer", "leadership"];
pub const VISIBLE_CLASS: &str = "visible";
const STAGGER_SELECTOR: &str = ".slide-in";

/// Marks elements `visible` as they scroll into view and cascades the reveal across the
/// `.slide-in` siblings of grouped entries.
pub struct VisibilityAnimator<D: Dom> {
    page: Page<D>,
    staggered_groups: RefCell<Vec<D::Element>>,
}

impl<D: Dom + 'static> VisibilityAnimator<D> {
    pub fn install(page: &Page<D>) -> Rc<Self> {
        let animator = Rc::new(Self {
            page: page.clone(),
            staggered_groups: RefCell::new(Vec::new()),
        });

        let targets = page.dom.query_all(ANIMATABLE_SELECTOR);
        if targets.is_empty() {
            log_event(
                &page.config,
                LogLevel::Debug,
                "feature_skipped",
                json!({ "feature": "visibility_animator", "reason": "no animatable elements" }),
            );
            return animator;
        }

        let options = ObserverOptions {
            threshold: page.config.reveal_threshold,
            bottom_margin_px: page.config.reveal_bottom_margin_px,
        };
        let handler: IntersectionHandler<D::Element> = {
            let animator = Rc::clone(&animator);
            Box::new(move |entries: &[IntersectionEntry<D::Element>], _: ObserverId| {
                for entry in entries.iter().filter(|entry| entry.intersecting) {
                    animator.reveal(&entry.target);
                }
            })
        };

        match page.dom.observe_intersections(&targets, options, handler) {
            Ok(_) => log_event(
                &page.config,
                LogLevel::Debug,
                "visibility_observer_ready",
                json!({ "targets": targets.len() }),
            ),
            Err(err) => log_event(
                &page.config,
                LogLevel::Warn,
                "visibility_observer_failed",
                json!({ "error": err.to_string() }),
            ),
        }

        animator
    }

    pub fn reveal(&self, element: &D::Element) {
        let dom = &self.page.dom;
        dom.add_class(element, VISIBLE_CLASS);

        if !GROUP_CLASSES.iter().any(|class| dom.has_class(element, class)) {
            return;
        }
        let Some(parent) = dom.parent(element) else {
            return;
        };
        if self.staggered_groups.borrow().contains(&parent) {
            return;
        }
        self.staggered_groups.borrow_mut().push(parent.clone());

        let step = self.page.config.stagger_step_ms;
        for (index, item) in dom.query_all_within(&parent, STAGGER_SELECTOR).into_iter().enumerate() {
            let item_dom = Rc::clone(dom);
            let delay = step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            self.page.scheduler.set_timeout(
                delay,
                Box::new(move || item_dom.add_class(&item, VISIBLE_CLASS)),
            );
        }
    }
}
