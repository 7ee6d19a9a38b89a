use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use gloo_timers::callback::{Interval, Timeout};
use js_sys::{Array, Reflect};
use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, CssStyleDeclaration, Document, Element, Event, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent, NodeList,
    ScrollBehavior, ScrollToOptions, Window,
};

use crate::{
    config::{InteractionConfig, CONFIG_ATTRIBUTE},
    controller::PageController,
    dom::{
        Dom, DomEvent, EventHandler, EventKind, IntersectionEntry, IntersectionHandler,
        ListenTarget, LocalTime, ObserverId, ObserverOptions, Rect, Viewport,
    },
    error::DomError,
    schedule::{Scheduler, TimerId},
    telemetry::{log_event, LogLevel},
};

pub struct WebDom {
    window: Window,
    document: Document,
    observers: RefCell<HashMap<u64, IntersectionObserver>>,
    next_observer: Cell<u64>,
}

impl WebDom {
    pub fn new() -> Result<Self, DomError> {
        let window = window().ok_or(DomError::MissingWindow)?;
        let document = window.document().ok_or(DomError::MissingDocument)?;

        Ok(Self {
            window,
            document,
            observers: RefCell::new(HashMap::new()),
            next_observer: Cell::new(0),
        })
    }
}

fn collect_elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn style_of(element: &Element) -> Option<CssStyleDeclaration> {
    Reflect::get(element, &JsValue::from_str("style"))
        .ok()?
        .dyn_into::<CssStyleDeclaration>()
        .ok()
}

fn viewport_size(win: &Window) -> (f64, f64) {
    let fallback = Viewport::default();
    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(fallback.width);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(fallback.height);

    (width, height)
}

fn to_dom_event(kind: EventKind, event: &Event) -> DomEvent<Element> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    let mut dom_event = DomEvent::new(kind, target);

    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        dom_event = dom_event.with_key(keyboard.key());
    }
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        dom_event = dom_event.with_pointer(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
    }

    dom_event
}

impl Dom for WebDom {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(collect_elements)
            .unwrap_or_default()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn query_all_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        scope
            .query_selector_all(selector)
            .map(collect_elements)
            .unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn toggle_class(&self, element: &Element, class: &str) -> bool {
        element
            .class_list()
            .toggle(class)
            .unwrap_or_else(|_| element.class_list().contains(class))
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        let _ = element.set_attribute(name, value);
    }

    fn has_attribute(&self, element: &Element, name: &str) -> bool {
        element.has_attribute(name)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(style) = style_of(element) else {
            return;
        };
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn focus(&self, element: &Element) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn offset_top(&self, element: &Element) -> f64 {
        element
            .dyn_ref::<HtmlElement>()
            .map(|element| f64::from(element.offset_top()))
            .unwrap_or_else(|| self.bounding_rect(element).top + self.scroll_offset())
    }

    fn scroll_to(&self, top: f64, smooth: bool) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = viewport_size(&self.window);
        Viewport { width, height }
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .map(|mq| mq.matches())
            .unwrap_or(false)
    }

    fn touch_capable(&self) -> Result<bool, DomError> {
        let has_touch_start = Reflect::has(&self.window, &JsValue::from_str("ontouchstart"))?;
        Ok(has_touch_start || self.window.navigator().max_touch_points() > 0)
    }

    fn local_time(&self) -> LocalTime {
        let now = js_sys::Date::new_0();
        LocalTime {
            year: i32::try_from(now.get_full_year()).unwrap_or_default(),
            hours: now.get_hours(),
            minutes: now.get_minutes(),
            seconds: now.get_seconds(),
        }
    }

    fn listen(&self, target: ListenTarget<Element>, kind: EventKind, mut handler: EventHandler<Element>) {
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let dom_event = to_dom_event(kind, &event);
            handler(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
        });

        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let result = match &target {
            ListenTarget::Window => self.window.add_event_listener_with_callback(kind.as_str(), function),
            ListenTarget::Document => self
                .document
                .add_event_listener_with_callback(kind.as_str(), function),
            ListenTarget::Element(element) => {
                element.add_event_listener_with_callback(kind.as_str(), function)
            }
        };
        if let Err(err) = result {
            let message = DomError::from(err).to_string();
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "failed to listen for {}: {message}",
                kind.as_str()
            )));
        }
        callback.forget();
    }

    fn observe_intersections(
        &self,
        targets: &[Element],
        options: ObserverOptions,
        mut handler: IntersectionHandler<Element>,
    ) -> Result<ObserverId, DomError> {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);

        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let entries: Vec<IntersectionEntry<Element>> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        target: entry.target(),
                        intersecting: entry.is_intersecting(),
                    })
                    .collect();
                handler(&entries, id);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin());
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        callback.forget();

        for target in targets {
            observer.observe(target);
        }
        self.observers.borrow_mut().insert(id.0, observer);
        Ok(id)
    }

    fn disconnect(&self, observer: ObserverId) {
        if let Some(observer) = self.observers.borrow_mut().remove(&observer.0) {
            observer.disconnect();
        }
    }
}

/// Browser timers. Fired timeouts are dropped on the next scheduling call, never from inside
/// their own callback.
#[derive(Default)]
pub struct TimerScheduler {
    next_id: Cell<u64>,
    timeouts: RefCell<HashMap<u64, Timeout>>,
    fired: Rc<RefCell<Vec<u64>>>,
}

impl TimerScheduler {
    fn sweep(&self) {
        let fired: Vec<u64> = self.fired.borrow_mut().drain(..).collect();
        let mut timeouts = self.timeouts.borrow_mut();
        for id in fired {
            timeouts.remove(&id);
        }
    }
}

impl Scheduler for TimerScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId {
        self.sweep();
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let fired = Rc::clone(&self.fired);
        let timeout = Timeout::new(delay_ms, move || {
            task();
            fired.borrow_mut().push(id);
        });
        self.timeouts.borrow_mut().insert(id, timeout);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.sweep();
        // dropping a pending Timeout clears it
        drop(self.timeouts.borrow_mut().remove(&id.0));
    }

    fn set_interval(&self, period_ms: u32, mut task: Box<dyn FnMut()>) {
        Interval::new(period_ms, move || task()).forget();
    }
}

pub fn start() -> Result<(), DomError> {
    let dom = WebDom::new()?;
    if dom.document.ready_state() != "loading" {
        set_up(dom);
        return Ok(());
    }

    let document = dom.document.clone();
    let mut pending = Some(dom);
    let callback = Closure::<dyn FnMut()>::new(move || {
        if let Some(dom) = pending.take() {
            set_up(dom);
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn set_up(dom: WebDom) {
    let raw_config = dom
        .body()
        .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));
    let config = InteractionConfig::from_attribute(raw_config.as_deref());
    PageController::setup(Rc::new(dom), Rc::new(TimerScheduler::default()), config);
}

pub fn run() {
    if let Err(err) = start() {
        log_event(
            &InteractionConfig::default(),
            LogLevel::Warn,
            "interactions_disabled",
            json!({ "error": err.to_string() }),
        );
    }
}
