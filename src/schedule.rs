use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Deferred and recurring callbacks on the page's event loop.
pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
    /// Runs `task` every `period_ms` for the page's lifetime.
    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>);
}

/// Trailing-edge debounce: each call cancels the pending invocation and schedules a new one
/// `wait_ms` later with the latest arguments.
pub struct Debounced<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u32,
    pending: Rc<Cell<Option<TimerId>>>,
    func: Rc<RefCell<dyn FnMut(A)>>,
}

pub fn debounce<A, F>(scheduler: Rc<dyn Scheduler>, wait_ms: u32, func: F) -> Debounced<A>
where
    A: 'static,
    F: FnMut(A) + 'static,
{
    Debounced {
        scheduler,
        wait_ms,
        pending: Rc::new(Cell::new(None)),
        func: Rc::new(RefCell::new(func)),
    }
}

impl<A: 'static> Debounced<A> {
    pub fn call(&self, args: A) {
        if let Some(previous) = self.pending.take() {
            self.scheduler.clear_timeout(previous);
        }

        let pending = Rc::clone(&self.pending);
        let func = Rc::clone(&self.func);
        let id = self.scheduler.set_timeout(
            self.wait_ms,
            Box::new(move || {
                pending.set(None);
                (&mut *func.borrow_mut())(args);
            }),
        );
        self.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
