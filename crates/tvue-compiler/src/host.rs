#![forbid(unsafe_code)]

//! Contract between the compiler and the component hosting a template.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tvue_reactive::ReactiveObject;
use tvue_view::ViewNode;

/// A handler for action directives. Receives the component's data root.
pub type Method = Rc<dyn Fn(&ReactiveObject)>;

/// What the compiler needs from its host.
pub trait Component {
    /// The observed data root. Mutated in place by bindings.
    fn data(&self) -> &ReactiveObject;

    /// The live view tree to compile.
    fn root(&self) -> &ViewNode;

    /// Handlers for action directives.
    fn methods(&self) -> &Methods;
}

/// Named handlers for action directives.
#[derive(Clone, Default)]
pub struct Methods {
    map: AHashMap<String, Method>,
}

impl Methods {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, method: impl Fn(&ReactiveObject) + 'static) -> Self {
        self.insert(name, method);
        self
    }

    /// Register `method` under `name`, replacing any previous handler.
    pub fn insert(&mut self, name: impl Into<String>, method: impl Fn(&ReactiveObject) + 'static) {
        self.map.insert(name.into(), Rc::new(method));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.map.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn registry_lookup() {
        let methods = Methods::new().with("save", |_| {}).with("reset", |_| {});
        assert_eq!(methods.len(), 2);
        assert!(methods.contains("save"));
        assert!(methods.get("missing").is_none());
        assert_eq!(methods.names(), vec!["reset", "save"]);
    }

    #[test]
    fn method_receives_data_root() {
        let data = tvue_reactive::observe(json!({ "count": 1 })).unwrap();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let methods = Methods::new().with("read", move |data: &ReactiveObject| {
            let n = data.get("count").unwrap().to_json().as_i64().unwrap();
            s.set(n);
        });

        (methods.get("read").unwrap())(&data);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn insert_replaces() {
        let mut methods = Methods::new();
        methods.insert("a", |_| {});
        methods.insert("a", |_| {});
        assert_eq!(methods.len(), 1);
        assert!(format!("{methods:?}").contains("\"a\""));
    }
}
