#![forbid(unsafe_code)]

//! Recursive observation of plain data objects.
//!
//! [`observe`] turns a JSON object into a [`ReactiveObject`]. Each property
//! becomes an [`ObservedValue`]: a private slot plus a [`Dep`]. Reading through
//! [`ObservedValue::read`] subscribes the context's active subscriber; writing
//! through [`ObservedValue::set`] stores the value and notifies.
//!
//! Object values are observed recursively, both when the root is first
//! observed and whenever a new object is written into a property. Arrays and
//! scalars are stored as plain JSON.
//!
//! The property set of an object is fixed when it is observed. Reads and
//! writes of unknown properties fail with
//! [`BindingError::UnobservedProperty`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::context::EvalContext;
use crate::dep::Dep;
use crate::error::{BindingError, Result};

/// Observe `root` in place. Non-object values (including `null`) have nothing
/// to observe and yield `None`.
#[must_use]
pub fn observe(root: Value) -> Option<ReactiveObject> {
    match root {
        Value::Object(map) => Some(ReactiveObject::from_map(map)),
        other => {
            tracing::trace!(kind = json_kind(&other), "observe skipped non-object root");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// The value held by an observed property.
#[derive(Clone)]
pub enum Data {
    /// A scalar, array or `null`.
    Value(Value),
    /// A nested observed object.
    Object(ReactiveObject),
}

impl Data {
    /// Convert plain JSON, observing it if it is an object.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(ReactiveObject::from_map(map)),
            other => Self::Value(other),
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Self::Object(object) => Some(object),
            Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Object(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Plain JSON copy of this value. Does not subscribe anything.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Object(object) => object.to_json(),
        }
    }

    /// Write-equality: plain values compare by value, objects by identity.
    /// An integer and a float holding the same number are equal.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(Value::Number(a)), Self::Value(Value::Number(b))) => {
                a == b || ((a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64())
            }
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Renders the value the way it appears in a view: strings raw, everything
/// else as compact JSON.
impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(Value::String(s)) => f.write_str(s),
            Self::Value(value) => write!(f, "{value}"),
            Self::Object(object) => write!(f, "{}", object.to_json()),
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

impl From<ReactiveObject> for Data {
    fn from(object: ReactiveObject) -> Self {
        Self::Object(object)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Self::Value(Value::from(b))
    }
}

impl From<i64> for Data {
    fn from(n: i64) -> Self {
        Self::Value(Value::from(n))
    }
}

impl From<f64> for Data {
    fn from(n: f64) -> Self {
        Self::Value(Value::from(n))
    }
}

// ---------------------------------------------------------------------------
// ObservedValue
// ---------------------------------------------------------------------------

/// One observed property: the only path to its value.
pub struct ObservedValue {
    slot: RefCell<Data>,
    dep: Dep,
}

impl ObservedValue {
    fn new(initial: Data) -> Self {
        Self {
            slot: RefCell::new(initial),
            dep: Dep::new(),
        }
    }

    /// Tracked read: subscribes the context's active subscriber, if any.
    #[must_use]
    pub fn read(&self, cx: &EvalContext) -> Data {
        self.dep.depend(cx);
        self.slot.borrow().clone()
    }

    /// Untracked read.
    #[must_use]
    pub fn get(&self) -> Data {
        self.slot.borrow().clone()
    }

    /// Store `value` and notify subscribers. Writing a value equal to the
    /// current one is a no-op. Returns whether the value changed.
    pub fn set(&self, value: impl Into<Data>) -> bool {
        let value = value.into();
        if self.slot.borrow().same(&value) {
            return false;
        }
        let previous = self.slot.replace(value);
        drop(previous);
        self.dep.notify();
        true
    }

    #[must_use]
    pub fn dep(&self) -> &Dep {
        &self.dep
    }
}

impl fmt::Debug for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedValue")
            .field("value", &*self.slot.borrow())
            .field("dep", &self.dep)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ReactiveObject
// ---------------------------------------------------------------------------

struct ObjectInner {
    fields: AHashMap<String, ObservedValue>,
}

/// Shared handle to an observed object. Clones share the same properties.
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

/// Non-owning handle to a [`ReactiveObject`].
#[derive(Clone, Debug)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

impl WeakObject {
    #[must_use]
    pub fn upgrade(&self) -> Option<ReactiveObject> {
        self.inner.upgrade().map(|inner| ReactiveObject { inner })
    }
}

impl ReactiveObject {
    /// Observe every property of `map`, recursing into object values.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key, ObservedValue::new(Data::from_json(value))))
            .collect();
        Self {
            inner: Rc::new(ObjectInner { fields }),
        }
    }

    /// The accessor for `key`.
    pub fn field(&self, key: &str) -> Result<&ObservedValue> {
        self.inner
            .fields
            .get(key)
            .ok_or_else(|| BindingError::unobserved(key))
    }

    /// Tracked read of a direct property.
    pub fn read(&self, key: &str, cx: &EvalContext) -> Result<Data> {
        Ok(self.field(key)?.read(cx))
    }

    /// Untracked read of a direct property.
    pub fn get(&self, key: &str) -> Result<Data> {
        Ok(self.field(key)?.get())
    }

    /// Write a direct property. Returns whether the value changed.
    pub fn set(&self, key: &str, value: impl Into<Data>) -> Result<bool> {
        Ok(self.field(key)?.set(value))
    }

    /// Tracked read of a dot-separated path. Every segment is read through its
    /// accessor, so the active subscriber depends on the whole chain.
    pub fn read_path(&self, path: &str, cx: &EvalContext) -> Result<Data> {
        let (parent, last) = self.resolve_parent(path, cx)?;
        parent.read(last, cx).map_err(|_| BindingError::unobserved(path))
    }

    /// Untracked read of a dot-separated path.
    pub fn get_path(&self, path: &str) -> Result<Data> {
        self.read_path(path, &EvalContext::untracked())
    }

    /// Write the last segment of a dot-separated path.
    pub fn set_path(&self, path: &str, value: impl Into<Data>) -> Result<bool> {
        let (parent, last) = self.resolve_parent(path, &EvalContext::untracked())?;
        parent
            .set(last, value)
            .map_err(|_| BindingError::unobserved(path))
    }

    fn resolve_parent<'p>(&self, path: &'p str, cx: &EvalContext) -> Result<(Self, &'p str)> {
        let mut segments = path.split('.');
        let mut last = segments.next().unwrap_or_default();
        let mut current = self.clone();
        for next in segments {
            if last.is_empty() {
                return Err(BindingError::unobserved(path));
            }
            let data = current
                .read(last, cx)
                .map_err(|_| BindingError::unobserved(path))?;
            current = match data {
                Data::Object(object) => object,
                Data::Value(_) => {
                    return Err(BindingError::NotAnObject {
                        path: path.to_owned(),
                        segment: last.to_owned(),
                    });
                }
            };
            last = next;
        }
        if last.is_empty() {
            return Err(BindingError::unobserved(path));
        }
        Ok((current, last))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.fields.contains_key(key)
    }

    /// Property names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.inner.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Whether both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Plain JSON snapshot of the current state. Does not subscribe anything.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .inner
            .fields
            .iter()
            .map(|(key, field)| (key.clone(), field.get().to_json()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("keys", &self.keys())
            .finish()
    }
}
