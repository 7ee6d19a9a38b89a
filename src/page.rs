use std::rc::Rc;

use serde_json::json;

use crate::{
    config::InteractionConfig,
    dom::Dom,
    schedule::Scheduler,
    telemetry::{log_event, LogLevel},
};

/// Everything a feature needs while installing its subscriptions.
pub struct Page<D: Dom> {
    pub dom: Rc<D>,
    pub scheduler: Rc<dyn Scheduler>,
    pub config: Rc<InteractionConfig>,
}

impl<D: Dom> Clone for Page<D> {
    fn clone(&self) -> Self {
        Self {
            dom: Rc::clone(&self.dom),
            scheduler: Rc::clone(&self.scheduler),
            config: Rc::clone(&self.config),
        }
    }
}

impl<D: Dom> Page<D> {
    pub fn new(dom: Rc<D>, scheduler: Rc<dyn Scheduler>, config: InteractionConfig) -> Self {
        Self {
            dom,
            scheduler,
            config: Rc::new(config),
        }
    }

    /// Looks up a single element, logging at debug level when the markup lacks it.
    pub fn find(&self, feature: &str, selector: &str) -> Option<D::Element> {
        let found = self.dom.query(selector);
        if found.is_none() {
            self.skipped(feature, selector);
        }
        found
    }

    pub fn find_by_id(&self, feature: &str, id: &str) -> Option<D::Element> {
        let found = self.dom.element_by_id(id);
        if found.is_none() {
            self.skipped(feature, &format!("#{id}"));
        }
        found
    }

    pub fn skipped(&self, feature: &str, missing: &str) {
        log_event(
            &self.config,
            LogLevel::Debug,
            "feature_skipped",
            json!({ "feature": feature, "missing": missing }),
        );
    }
}
