//! In-memory stand-ins for the browser used by unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use crate::{
    dom::{
        Dom, DomEvent, EventHandler, EventKind, IntersectionEntry, IntersectionHandler,
        ListenTarget, LocalTime, ObserverId, ObserverOptions, Rect, Viewport,
    },
    error::DomError,
    schedule::{Scheduler, TimerId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    rect: Rect,
    offset_top: f64,
}

struct Listener {
    target: ListenTarget<NodeId>,
    kind: EventKind,
    handler: Rc<RefCell<EventHandler<NodeId>>>,
}

struct FakeObserver {
    id: ObserverId,
    targets: Vec<NodeId>,
    options: ObserverOptions,
    handler: Rc<RefCell<IntersectionHandler<NodeId>>>,
    connected: bool,
}

pub struct FakeDom {
    nodes: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<Listener>>,
    observers: RefCell<Vec<FakeObserver>>,
    scroll: Cell<f64>,
    scroll_requests: RefCell<Vec<(f64, bool)>>,
    viewport: Cell<Viewport>,
    reduced_motion: Cell<bool>,
    touch: RefCell<Result<bool, DomError>>,
    focused: Cell<Option<NodeId>>,
    time: Cell<LocalTime>,
}

pub const HTML: NodeId = NodeId(0);
pub const BODY: NodeId = NodeId(1);

impl Default for FakeDom {
    fn default() -> Self {
        let dom = Self {
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            scroll: Cell::new(0.0),
            scroll_requests: RefCell::new(Vec::new()),
            viewport: Cell::new(Viewport::default()),
            reduced_motion: Cell::new(false),
            touch: RefCell::new(Ok(false)),
            focused: Cell::new(None),
            time: Cell::new(LocalTime {
                year: 2024,
                hours: 9,
                minutes: 5,
                seconds: 0,
            }),
        };
        dom.nodes.borrow_mut().push(Node {
            tag: "html".to_string(),
            ..Node::default()
        });
        dom.append(HTML, "body", "");
        dom
    }
}

impl FakeDom {
    /// Appends `<tag class="classes">` as the last child of `parent`.
    pub fn append(&self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(Node {
            tag: tag.to_string(),
            parent: Some(parent),
            classes: classes.split_whitespace().map(ToString::to_string).collect(),
            ..Node::default()
        });
        nodes[parent.0].children.push(id);
        id
    }

    pub fn attr(&self, node: NodeId, name: &str, value: &str) -> NodeId {
        self.nodes.borrow_mut()[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
        node
    }

    pub fn place(&self, node: NodeId, rect: Rect, offset_top: f64) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].rect = rect;
        nodes[node.0].offset_top = offset_top;
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].styles.get(property).cloned()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].text.clone()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    pub fn scroll_requests(&self) -> Vec<(f64, bool)> {
        self.scroll_requests.borrow().clone()
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set(Viewport { width, height });
    }

    pub fn set_reduced_motion(&self, value: bool) {
        self.reduced_motion.set(value);
    }

    pub fn set_touch(&self, probe: Result<bool, DomError>) {
        *self.touch.borrow_mut() = probe;
    }

    pub fn set_time(&self, time: LocalTime) {
        self.time.set(time);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn observer_options(&self, node: NodeId) -> Vec<ObserverOptions> {
        self.observers
            .borrow()
            .iter()
            .filter(|observer| observer.targets.contains(&node))
            .map(|observer| observer.options)
            .collect()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|observer| observer.connected && observer.targets.contains(&node))
    }

    /// Delivers an intersection change for `node` to every connected observer watching it.
    pub fn intersect(&self, node: NodeId, intersecting: bool) {
        let observers: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter(|observer| observer.connected && observer.targets.contains(&node))
            .map(|observer| (observer.id, Rc::clone(&observer.handler)))
            .collect();

        let entries = [IntersectionEntry {
            target: node,
            intersecting,
        }];
        for (id, handler) in observers {
            (&mut *handler.borrow_mut())(&entries, id);
        }
    }

    /// Dispatches `event` at its target, bubbling to ancestors, the document and the window
    /// when the event kind bubbles. Returns whether a handler prevented the default action.
    pub fn dispatch(&self, event: DomEvent<NodeId>) -> bool {
        let mut path = Vec::new();
        if let Some(target) = event.target {
            path.push(ListenTarget::Element(target));
            if event.kind.bubbles() {
                let mut current = self.parent(&target);
                while let Some(node) = current {
                    path.push(ListenTarget::Element(node));
                    current = self.parent(&node);
                }
                path.push(ListenTarget::Document);
                path.push(ListenTarget::Window);
            }
        } else if event.kind == EventKind::Scroll {
            path.push(ListenTarget::Window);
        } else {
            path.push(ListenTarget::Document);
            path.push(ListenTarget::Window);
        }

        for target in path {
            let handlers: Vec<_> = self
                .listeners
                .borrow()
                .iter()
                .filter(|listener| listener.kind == event.kind && listener.target == target)
                .map(|listener| Rc::clone(&listener.handler))
                .collect();
            for handler in handlers {
                (&mut *handler.borrow_mut())(&event);
            }
        }

        event.default_prevented()
    }

    pub fn click(&self, node: NodeId) -> bool {
        self.dispatch(DomEvent::new(EventKind::Click, Some(node)))
    }

    pub fn key_down(&self, node: NodeId, key: &str) -> bool {
        self.dispatch(DomEvent::new(EventKind::KeyDown, Some(node)).with_key(key))
    }

    pub fn mouse_down(&self, node: NodeId) -> bool {
        self.dispatch(DomEvent::new(EventKind::MouseDown, Some(node)))
    }

    pub fn mouse_move(&self, node: NodeId, client_x: f64, client_y: f64) -> bool {
        self.dispatch(DomEvent::new(EventKind::MouseMove, Some(node)).with_pointer(client_x, client_y))
    }

    pub fn hover(&self, node: NodeId, kind: EventKind) -> bool {
        self.dispatch(DomEvent::new(kind, Some(node)))
    }

    pub fn scroll_window(&self, offset: f64) {
        self.scroll.set(offset);
        self.dispatch(DomEvent::new(EventKind::Scroll, None));
    }

    fn ancestors_or_self(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = self.nodes.borrow()[node.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes.borrow()[parent.0].parent;
        }
        chain
    }

    fn document_order(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut order = Vec::with_capacity(nodes.len());
        let mut stack = vec![HTML];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(nodes[node.0].children.iter().rev().copied());
        }
        order
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|complex| !complex.is_empty())
            .any(|complex| self.matches_complex(node, complex))
    }

    fn matches_complex(&self, node: NodeId, complex: &str) -> bool {
        let compounds: Vec<Compound> = complex.split_whitespace().map(Compound::parse).collect();
        let Some((last, rest)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }

        let chain = self.ancestors_or_self(node);
        let mut ancestors = chain.into_iter().skip(1);
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|ancestor| self.matches_compound(ancestor, compound)))
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let node = &nodes[node.0];
        if let Some(tag) = &compound.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if node.attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !compound.classes.iter().all(|class| node.classes.contains(class)) {
            return false;
        }
        compound.attributes.iter().all(|test| {
            let value = node.attributes.get(&test.name);
            match (&test.prefix, value) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(prefix), Some(value)) => value.starts_with(prefix.as_str()),
            }
        })
    }

    fn is_descendant(&self, node: NodeId, scope: NodeId) -> bool {
        node != scope && self.ancestors_or_self(node).contains(&scope)
    }
}

struct AttributeTest {
    name: String,
    prefix: Option<String>,
}

#[derive(Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

impl Compound {
    /// Parses `tag#id.class[attr]` and `[attr^="prefix"]`; enough for the page's selectors.
    fn parse(source: &str) -> Self {
        let mut compound = Self::default();
        let mut rest = source;

        let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(rest[..tag_end].to_string());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            match marker {
                '[' => {
                    let close = rest.find(']').unwrap_or(rest.len() - 1);
                    let body = &rest[1..close];
                    let test = match body.split_once("^=") {
                        Some((name, value)) => AttributeTest {
                            name: name.trim().to_string(),
                            prefix: Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        },
                        None => AttributeTest {
                            name: body.trim().to_string(),
                            prefix: None,
                        },
                    };
                    compound.attributes.push(test);
                    rest = &rest[close + 1..];
                }
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if marker == '.' {
                        compound.classes.push(name);
                    } else {
                        compound.id = Some(name);
                    }
                    rest = &body[end..];
                }
                _ => break,
            }
        }

        compound
    }
}

impl Dom for FakeDom {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.query_all_within(scope, selector).into_iter().next()
    }

    fn query_all_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|node| self.is_descendant(*node, *scope) && self.matches(*node, selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order().into_iter().find(|node| {
            self.nodes.borrow()[node.0].attributes.get("id").map(String::as_str) == Some(id)
        })
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[element.0].parent
    }

    fn root(&self) -> Option<NodeId> {
        Some(HTML)
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[element.0].classes.iter().any(|value| value == class)
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        if !self.has_class(element, class) {
            self.nodes.borrow_mut()[element.0].classes.push(class.to_string());
        }
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        self.nodes.borrow_mut()[element.0].classes.retain(|value| value != class);
    }

    fn toggle_class(&self, element: &NodeId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[element.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.attr(*element, name, value);
    }

    fn has_attribute(&self, element: &NodeId, name: &str) -> bool {
        self.nodes.borrow()[element.0].attributes.contains_key(name)
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let styles = &mut nodes[element.0].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.nodes.borrow_mut()[element.0].text = text.to_string();
    }

    fn focus(&self, element: &NodeId) {
        self.focused.set(Some(*element));
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        self.nodes.borrow()[element.0].rect
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].offset_top
    }

    fn scroll_to(&self, top: f64, smooth: bool) {
        self.scroll_requests.borrow_mut().push((top, smooth));
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll.get()
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.get()
    }

    fn touch_capable(&self) -> Result<bool, DomError> {
        self.touch.borrow().clone()
    }

    fn local_time(&self) -> LocalTime {
        self.time.get()
    }

    fn listen(&self, target: ListenTarget<NodeId>, kind: EventKind, handler: EventHandler<NodeId>) {
        self.listeners.borrow_mut().push(Listener {
            target,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn observe_intersections(
        &self,
        targets: &[NodeId],
        options: ObserverOptions,
        handler: IntersectionHandler<NodeId>,
    ) -> Result<ObserverId, DomError> {
        let mut observers = self.observers.borrow_mut();
        let id = ObserverId(observers.len() as u64);
        observers.push(FakeObserver {
            id,
            targets: targets.to_vec(),
            options,
            handler: Rc::new(RefCell::new(handler)),
            connected: true,
        });
        Ok(id)
    }

    fn disconnect(&self, observer: ObserverId) {
        if let Some(observer) = self
            .observers
            .borrow_mut()
            .iter_mut()
            .find(|candidate| candidate.id == observer)
        {
            observer.connected = false;
        }
    }
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Every { period: u64, run: Box<dyn FnMut()> },
}

struct Task {
    id: TimerId,
    due: u64,
    seq: u64,
    job: Job,
}

/// Virtual-time scheduler; nothing runs until [`ManualScheduler::advance`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<u64>,
    next_seq: Cell<u64>,
    tasks: RefCell<Vec<Task>>,
}

impl ManualScheduler {
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    fn bump(&self) -> u64 {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        seq
    }

    fn push(&self, delay_ms: u64, job: Job) -> TimerId {
        let seq = self.bump();
        let id = TimerId(seq);
        self.tasks.borrow_mut().push(Task {
            id,
            due: self.now.get() + delay_ms,
            seq,
            job,
        });
        id
    }

    /// Moves virtual time forward, running due tasks in order of due time then scheduling order.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = self
                .tasks
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, task)| task.due <= target)
                .min_by_key(|(_, task)| (task.due, task.seq))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };

            let task = self.tasks.borrow_mut().remove(index);
            self.now.set(task.due);
            match task.job {
                Job::Once(run) => run(),
                Job::Every { period, mut run } => {
                    run();
                    let seq = self.bump();
                    self.tasks.borrow_mut().push(Task {
                        id: task.id,
                        due: task.due + period,
                        seq,
                        job: Job::Every { period, run },
                    });
                }
            }
        }
        self.now.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId {
        self.push(u64::from(delay_ms), Job::Once(task))
    }

    fn clear_timeout(&self, id: TimerId) {
        self.tasks.borrow_mut().retain(|task| task.id != id);
    }

    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) {
        let period = u64::from(period_ms.max(1));
        self.push(
            period,
            Job::Every {
                period,
                run: task,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_cover_descendants_lists_and_attribute_prefixes() {
        let dom = FakeDom::default();
        let nav = dom.append(BODY, "nav", "");
        let local = dom.append(nav, "a", "");
        dom.attr(local, "href", "#about");
        let external = dom.append(nav, "a", "");
        dom.attr(external, "href", "https://example.com");
        let section = dom.append(BODY, "section", "");
        let heading = dom.append(section, "h3", "");
        let paragraph = dom.append(section, "p", "lead");

        assert_eq!(dom.query_all("nav a[href^=\"#\"]"), vec![local]);
        assert_eq!(dom.query_all("section p, section h3"), vec![heading, paragraph]);
        assert_eq!(dom.query("p.lead"), Some(paragraph));
        assert_eq!(dom.query_all_within(&section, "*"), vec![heading, paragraph]);
    }

    #[test]
    fn cleared_timeouts_never_run() {
        let scheduler = ManualScheduler::default();
        let ran = Rc::new(Cell::new(false));
        let id = {
            let ran = Rc::clone(&ran);
            scheduler.set_timeout(10, Box::new(move || ran.set(true)))
        };

        scheduler.clear_timeout(id);
        scheduler.advance(50);

        assert!(!ran.get());
        assert_eq!(scheduler.pending(), 0);
    }
}
