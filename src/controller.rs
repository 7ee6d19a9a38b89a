use std::rc::Rc;

use serde_json::json;

use crate::{
    accordion, adapt,
    config::InteractionConfig,
    dom::Dom,
    intro,
    lightbox::VideoLightbox,
    page::Page,
    pointer,
    reveal::VisibilityAnimator,
    schedule::Scheduler,
    scroll, skills,
    telemetry::{log_event, LogLevel},
    widgets::{Clock, GreetingRotator},
};

/// Handles to the stateful features, kept so callers can inspect or drive them.
pub struct PageController<D: Dom> {
    pub page: Page<D>,
    pub animator: Rc<VisibilityAnimator<D>>,
    pub clock: Rc<Clock<D>>,
    pub greeting: Rc<GreetingRotator<D>>,
    pub lightbox: Option<Rc<VideoLightbox<D>>>,
    pub touch: bool,
    pub reduced_motion: bool,
}

impl<D: Dom + 'static> PageController<D> {
    pub fn setup(dom: Rc<D>, scheduler: Rc<dyn Scheduler>, config: InteractionConfig) -> Self {
        let page = Page::new(dom, scheduler, config);

        let touch = adapt::apply_touch_marker(&page);
        intro::install_intro(&page);

        let animator = VisibilityAnimator::install(&page);
        scroll::install_smooth_navigation(&page);
        scroll::install_scroll_effects(&page);
        pointer::install_card_drift(&page);
        pointer::install_hover_easing(&page);

        let reduced_motion = adapt::apply_reduced_motion(&page);
        adapt::install_input_mode(&page);

        let clock = Clock::install(&page);
        let greeting = GreetingRotator::install(&page);

        accordion::install_accordion(&page);
        accordion::install_project_downloads(&page);
        skills::install_skills_grid(&page);
        skills::install_skills_icon(&page);
        let lightbox = VideoLightbox::install(&page);

        scroll::install_settled_scroll(&page);
        intro::mark_body_loaded(&page);

        log_event(
            &page.config,
            LogLevel::Info,
            "interactions_ready",
            json!({
                "touch": touch,
                "reducedMotion": reduced_motion,
                "lightbox": lightbox.is_some(),
            }),
        );

        Self {
            page,
            animator,
            clock,
            greeting,
            lightbox,
            touch,
            reduced_motion,
        }
    }
}
