//! The element provider the page features are written against.
//!
//! Features never touch `web-sys` directly. They receive a [`Dom`] implementation, which in the
//! browser is the `web-sys` adapter in `frontend` and in tests is an in-memory tree.

use std::cell::Cell;

use crate::error::DomError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    MouseDown,
    MouseMove,
    MouseEnter,
    MouseLeave,
    Scroll,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Scroll => "scroll",
        }
    }

    pub fn bubbles(self) -> bool {
        !matches!(self, Self::MouseEnter | Self::MouseLeave | Self::Scroll)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListenTarget<E> {
    Window,
    Document,
    Element(E),
}

#[derive(Debug)]
pub struct DomEvent<E> {
    pub kind: EventKind,
    pub target: Option<E>,
    pub key: Option<String>,
    pub client_x: f64,
    pub client_y: f64,
    default_prevented: Cell<bool>,
}

impl<E> DomEvent<E> {
    pub fn new(kind: EventKind, target: Option<E>) -> Self {
        Self {
            kind,
            target,
            key: None,
            client_x: 0.0,
            client_y: 0.0,
            default_prevented: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_pointer(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }

    pub fn key_is(&self, expected: &str) -> bool {
        self.key.as_deref() == Some(expected)
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub bottom_margin_px: f64,
}

impl ObserverOptions {
    pub fn root_margin(&self) -> String {
        if self.bottom_margin_px == 0.0 {
            return "0px".to_string();
        }
        format!("0px 0px {}px 0px", -self.bottom_margin_px)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub intersecting: bool,
}

pub type EventHandler<E> = Box<dyn FnMut(&DomEvent<E>)>;
pub type IntersectionHandler<E> = Box<dyn FnMut(&[IntersectionEntry<E>], ObserverId)>;

pub trait Dom {
    type Element: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn query_all_within(&self, scope: &Self::Element, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;
    fn root(&self) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    /// Returns whether the class is present after toggling.
    fn toggle_class(&self, element: &Self::Element, class: &str) -> bool;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool;

    /// An empty value clears the inline property.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
    fn set_text(&self, element: &Self::Element, text: &str);
    fn focus(&self, element: &Self::Element);

    fn bounding_rect(&self, element: &Self::Element) -> Rect;
    fn offset_top(&self, element: &Self::Element) -> f64;
    fn scroll_to(&self, top: f64, smooth: bool);
    fn scroll_offset(&self) -> f64;
    fn viewport(&self) -> Viewport;

    fn prefers_reduced_motion(&self) -> bool;
    fn touch_capable(&self) -> Result<bool, DomError>;
    fn local_time(&self) -> LocalTime;

    fn listen(
        &self,
        target: ListenTarget<Self::Element>,
        kind: EventKind,
        handler: EventHandler<Self::Element>,
    );
    fn observe_intersections(
        &self,
        targets: &[Self::Element],
        options: ObserverOptions,
        handler: IntersectionHandler<Self::Element>,
    ) -> Result<ObserverId, DomError>;
    fn disconnect(&self, observer: ObserverId);
}
