// Purpose: Persistent association list for interpreter environments, with
// structural sharing between extended environments.

use std::{cell::RefCell, error::Error, fmt, rc::Rc};

// =====================
// Struct Definitions
// =====================

/// Error for `lookup`/`update` on a key with no binding.
///
/// A missing key is an expected, recoverable outcome here, unlike the
/// deque's empty-container accessors which simply return `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNotFound {
    name: String,
}

/// One binding in the chain. The value sits in a `RefCell` so that `update`
/// can replace it in place even though the node is shared between
/// environments.
struct Binding<K, V> {
    key: K,
    value: RefCell<V>,
    next: Option<Rc<Binding<K, V>>>,
}

/// A persistent environment: a singly-linked chain of reference-counted
/// bindings, newest first.
///
/// `extend` never mutates; it returns a new environment whose chain shares
/// the whole previous chain. Cloning an environment copies one handle, not
/// the bindings. `update` rebinds the nearest existing key in place, and the
/// change is visible through every environment sharing that node, which is
/// how interpreter closures observe `set!`-style assignment.
pub struct Env<K, V> {
    head: Option<Rc<Binding<K, V>>>,
}

/// Internal walk over the binding chain, newest to oldest. Shadowed
/// bindings are yielded too, after the binding that shadows them.
struct Bindings<'a, K, V> {
    current: Option<&'a Binding<K, V>>,
}

// =====================
// Inherent impl blocks
// =====================

impl BindingNotFound {
    fn new(key: &impl fmt::Display) -> Self {
        Self {
            name: key.to_string(),
        }
    }

    /// The rendered name of the key that was not bound.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<K, V> Env<K, V> {
    /// The empty environment.
    pub fn new() -> Self {
        Self { head: None }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of bindings in the chain, shadowed ones included. O(n).
    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    /// Returns a new environment with `key` bound to `value`, sharing the
    /// entire existing chain as its tail. O(1); `self` is untouched.
    pub fn extend(&self, key: K, value: V) -> Self {
        Self {
            head: Some(Rc::new(Binding {
                key,
                value: RefCell::new(value),
                next: self.head.clone(),
            })),
        }
    }

    fn bindings(&self) -> Bindings<'_, K, V> {
        Bindings {
            current: self.head.as_deref(),
        }
    }

    /// Walks the chain newest-to-oldest for the nearest binding of `key`.
    fn find(&self, key: &K) -> Option<&Binding<K, V>>
    where
        K: PartialEq,
    {
        self.bindings().find(|binding| binding.key == *key)
    }
}

impl<K: PartialEq + fmt::Display, V> Env<K, V> {
    /// Looks up the value bound to `key`, scanning newest-to-oldest.
    pub fn lookup(&self, key: &K) -> Result<V, BindingNotFound>
    where
        V: Clone,
    {
        match self.find(key) {
            Some(binding) => Ok(binding.value.borrow().clone()),
            None => Err(BindingNotFound::new(key)),
        }
    }

    /// Replaces the value of the nearest existing binding of `key` in place.
    ///
    /// The mutation is visible through every environment that shares the
    /// binding's node; no new environment is created.
    pub fn update(&self, key: &K, value: V) -> Result<(), BindingNotFound> {
        match self.find(key) {
            Some(binding) => {
                *binding.value.borrow_mut() = value;
                Ok(())
            }
            None => Err(BindingNotFound::new(key)),
        }
    }

    /// Whether `key` is bound anywhere in the chain.
    pub fn is_bound(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Iterates `(key, value)` pairs newest to oldest, shadowed bindings
    /// included.
    pub fn iter(&self) -> impl Iterator<Item = (&K, V)>
    where
        V: Clone,
    {
        self.bindings()
            .map(|binding| (&binding.key, binding.value.borrow().clone()))
    }
}

// =====================
// Trait Implementations
// =====================

impl fmt::Display for BindingNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding not found: {}", self.name)
    }
}

impl Error for BindingNotFound {}

// Manual impl so K and V need not be Clone; only the handle is copied.
impl<K, V> Clone for Env<K, V> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<K, V> Default for Env<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> Iterator for Bindings<'a, K, V> {
    type Item = &'a Binding<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let binding = self.current?;
        self.current = binding.next.as_deref();
        Some(binding)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Env<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for binding in self.bindings() {
            map.entry(&binding.key, &*binding.value.borrow());
        }
        map.finish()
    }
}

// =====================
// Tests
// =====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_env() {
        let env: Env<&str, i32> = Env::new();
        assert!(env.is_empty());
        assert_eq!(env.len(), 0);
        assert_eq!(
            env.lookup(&"x"),
            Err(BindingNotFound {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_extend_and_lookup() {
        let env = Env::new().extend("x", 10).extend("y", 20);
        assert_eq!(env.lookup(&"x"), Ok(10));
        assert_eq!(env.lookup(&"y"), Ok(20));
        assert!(env.lookup(&"z").is_err());
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_newest_binding_shadows() {
        let env = Env::new().extend("x", 1).extend("x", 2);
        assert_eq!(env.lookup(&"x"), Ok(2));
        // Both bindings are still on the chain.
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_extend_leaves_original_untouched() {
        let base = Env::new().extend("x", 1);
        let extended = base.extend("y", 2);

        assert!(base.lookup(&"y").is_err());
        assert_eq!(extended.lookup(&"x"), Ok(1));
        assert_eq!(extended.lookup(&"y"), Ok(2));
    }

    #[test]
    fn test_update_in_place() {
        let env = Env::new().extend("x", 1);
        env.update(&"x", 5).unwrap();
        assert_eq!(env.lookup(&"x"), Ok(5));
    }

    #[test]
    fn test_update_nearest_binding_only() {
        let env = Env::new().extend("x", 1).extend("x", 2);
        env.update(&"x", 9).unwrap();
        assert_eq!(env.lookup(&"x"), Ok(9));

        // The shadowed binding keeps its old value.
        let values: Vec<_> = env.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![9, 1]);
    }

    #[test]
    fn test_update_missing_key() {
        let env = Env::new().extend("x", 1);
        let err = env.update(&"y", 2).unwrap_err();
        assert_eq!(err.name(), "y");
        assert_eq!(err.to_string(), "binding not found: y");
    }

    #[test]
    fn test_update_visible_through_shared_tail() {
        // Two environments extended from the same base share its node, so
        // an update through one is seen by the other.
        let base = Env::new().extend("x", 1);
        let left = base.extend("l", 10);
        let right = base.extend("r", 20);

        left.update(&"x", 99).unwrap();
        assert_eq!(base.lookup(&"x"), Ok(99));
        assert_eq!(right.lookup(&"x"), Ok(99));
    }

    #[test]
    fn test_clone_shares_chain() {
        let env = Env::new().extend("x", 1);
        let copy = env.clone();

        copy.update(&"x", 2).unwrap();
        assert_eq!(env.lookup(&"x"), Ok(2));

        // But extending the copy never leaks into the original.
        let extended = copy.extend("y", 3);
        assert!(env.lookup(&"y").is_err());
        assert_eq!(extended.lookup(&"y"), Ok(3));
    }

    #[test]
    fn test_is_bound() {
        let env = Env::new().extend("x", 1);
        assert!(env.is_bound(&"x"));
        assert!(!env.is_bound(&"y"));
    }

    #[test]
    fn test_iter_newest_to_oldest() {
        let env = Env::new().extend("a", 1).extend("b", 2).extend("c", 3);
        let pairs: Vec<_> = env.iter().map(|(k, v)| (*k, v)).collect();
        assert_eq!(pairs, vec![("c", 3), ("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_debug() {
        let env = Env::new().extend("x", 1);
        assert_eq!(format!("{env:?}"), r#"{"x": 1}"#);
    }
}
