#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A map of values indexed by identifiers, with an optional parent scope.
///
/// Cloning a `Scope` produces another handle onto the same store, so a
/// scope can be the parent of several children and be captured by host
/// functions at the same time.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

#[derive(Debug, Default)]
struct ScopeInner {
    parent: Option<Scope>,
    values: RefCell<HashMap<String, Value>>,
    locked: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: &Scope) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                parent: Some(parent.clone()),
                values: RefCell::new(HashMap::new()),
                locked: Cell::new(false),
            }),
        }
    }

    /// Stores `v` under `name`.
    ///
    /// If any ancestor scope already binds `name`, the value is stored in
    /// that ancestor instead, walking the parent chain outward. Otherwise a
    /// new binding is created in this scope, unless this scope is locked,
    /// in which case the call is a silent no-op.
    pub fn set(&self, name: impl Into<String>, v: impl Into<Value>) {
        let name = name.into();
        let v = v.into();

        let mut parent = self.inner.parent.clone();
        while let Some(s) = parent {
            if s.has_value_self(&name) {
                s.inner.values.borrow_mut().insert(name, v);
                return;
            }
            parent = s.inner.parent.clone();
        }

        if self.inner.locked.get() {
            return;
        }

        self.inner.values.borrow_mut().insert(name, v);
    }

    /// The value bound to `name` in this scope or the nearest ancestor.
    pub fn value(&self, name: &str) -> Option<Value> {
        let mut scope = Some(self.clone());
        while let Some(s) = scope {
            if let Some(v) = s.inner.values.borrow().get(name) {
                return Some(v.clone());
            }
            scope = s.inner.parent.clone();
        }
        None
    }

    pub fn has_value(&self, name: &str) -> bool {
        let mut scope = Some(self.clone());
        while let Some(s) = scope {
            if s.has_value_self(name) {
                return true;
            }
            scope = s.inner.parent.clone();
        }
        false
    }

    /// Prevents new bindings in this scope. Parent scopes are unaffected,
    /// and `set` calls that resolve to an unlocked ancestor still succeed.
    pub fn lock(&self) {
        self.inner.locked.set(true);
    }

    /// Removes this scope's own bindings, leaving parents untouched.
    pub fn clear_self(&self) {
        self.inner.values.borrow_mut().clear();
    }

    fn has_value_self(&self, name: &str) -> bool {
        self.inner.values.borrow().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_value(s: &Scope, name: &str) -> i64 {
        assert!(s.has_value(name));
        s.value(name).and_then(|v| v.as_int()).expect("int value")
    }

    #[test]
    fn set_and_get() {
        let s = Scope::new();
        s.set("x", 5);
        assert_eq!(int_value(&s, "x"), 5);
    }

    #[test]
    fn lookup_walks_parents() {
        let a = Scope::new();
        a.set("x", 3);

        let b = Scope::with_parent(&a);
        let c = Scope::with_parent(&b);
        c.set("y", 42);

        assert_eq!(int_value(&a, "x"), 3);
        assert_eq!(int_value(&b, "x"), 3);
        assert_eq!(int_value(&c, "x"), 3);
    }

    #[test]
    fn set_updates_nearest_ancestor_binding() {
        let a = Scope::new();
        a.set("x", 3);

        let b = Scope::with_parent(&a);
        let c = Scope::with_parent(&b);

        c.set("x", 33);

        assert_eq!(int_value(&a, "x"), 33);
        assert_eq!(int_value(&b, "x"), 33);
        assert_eq!(int_value(&c, "x"), 33);
    }

    #[test]
    fn set_through_ancestor_does_not_grow_any_scope() {
        let a = Scope::new();
        a.set("x", 1);
        let b = Scope::with_parent(&a);

        b.set("x", 2);

        assert_eq!(a.inner.values.borrow().len(), 1);
        assert_eq!(b.inner.values.borrow().len(), 0);
        assert_eq!(int_value(&a, "x"), 2);
    }

    #[test]
    fn lock_drops_new_bindings_silently() {
        let s = Scope::new();
        s.set("x", 5);

        s.lock();
        s.set("x", 42);
        s.set("y", 1);

        assert_eq!(int_value(&s, "x"), 5);
        assert!(!s.has_value("y"));
    }

    #[test]
    fn lock_does_not_block_unlocked_ancestors() {
        let a = Scope::new();
        a.set("x", 1);

        let b = Scope::with_parent(&a);
        b.lock();

        b.set("x", 2);
        assert_eq!(int_value(&a, "x"), 2);

        b.set("y", 3);
        assert!(!b.has_value("y"));
    }

    #[test]
    fn clear_self_keeps_parent_bindings() {
        let a = Scope::new();
        a.set("x", 1);

        let b = Scope::with_parent(&a);
        b.set("y", 2);

        b.clear_self();

        assert!(!b.has_value("y"));
        assert_eq!(int_value(&b, "x"), 1);
    }
}
