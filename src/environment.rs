use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

#[derive(Default)]
struct Scope {
    store: HashMap<String, Object>,
    outer: Option<Environment>,
}

/// A shared handle to one scope frame.
///
/// Cloning the handle does not copy the bindings: closures and active calls
/// that hold the same frame all see each other's writes.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn enclosed(outer: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        let scope = self.0.borrow();
        match scope.store.get(name) {
            Some(obj) => Some(obj.clone()),
            None => scope.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn set(&self, name: &str, val: Object) {
        self.0.borrow_mut().store.insert(name.to_owned(), val);
    }

    /// Rebinds `name` in the frame that defines it. Returns false when no
    /// frame in the chain does.
    pub fn update(&self, name: &str, val: Object) -> bool {
        let mut scope = self.0.borrow_mut();
        if let Some(slot) = scope.store.get_mut(name) {
            *slot = val;
            return true;
        }

        match &scope.outer {
            Some(outer) => outer.update(name, val),
            None => false,
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<&String> = scope.store.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("outer", &scope.outer)
            .finish()
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
