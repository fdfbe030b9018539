//! Mutation observers scoped to one console.

use blockforge_block::Facing;

/// What a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// An inventory slot (0-35) changed occupancy.
    Inventory(usize),
    /// A console slot (0-8) got a new block model.
    Helper(usize),
    /// A neighbor of a console slot got a new block model.
    Neighbor(usize, Facing),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Callback receiving the requester identity and what changed.
///
/// Observers get no access to the console, so they cannot re-enter it.
pub type Observer = Box<dyn FnMut(&str, Mutation)>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Observer)>,
}

impl Observers {
    pub(crate) fn register(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Fire every observer in registration order.
    pub(crate) fn notify(&mut self, requester: &str, mutation: Mutation) {
        for (_, observer) in &mut self.entries {
            observer(requester, mutation);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        for tag in ["first", "second"] {
            let log = log.clone();
            observers.register(Box::new(move |who: &str, m: Mutation| {
                log.borrow_mut().push(format!("{tag}:{who}:{m:?}"));
            }));
        }
        observers.notify("planner", Mutation::Helper(3));
        assert_eq!(
            *log.borrow(),
            vec!["first:planner:Helper(3)", "second:planner:Helper(3)"]
        );
    }

    #[test]
    fn unregister_removes_only_that_observer() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();
        let c = count.clone();
        let a = observers.register(Box::new(move |_: &str, _: Mutation| *c.borrow_mut() += 1));
        let c = count.clone();
        observers.register(Box::new(move |_: &str, _: Mutation| *c.borrow_mut() += 10));

        assert!(observers.unregister(a));
        assert!(!observers.unregister(a));
        assert_eq!(observers.len(), 1);

        observers.notify("x", Mutation::Inventory(0));
        assert_eq!(*count.borrow(), 10);
    }
}
