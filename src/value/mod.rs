mod deep_equal;
mod display;

pub use deep_equal::deep_equal;

use crate::errors::{ErrorKind, ErrorValue};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<Object>>;

const DEFAULT_CLASS: &str = "Object";

/// A dynamically typed value handed to an assertion.
///
/// Arrays, objects and functions are shared references, so two values can be
/// the same object and structures can refer back to themselves.
#[derive(Clone, Default)]
pub enum Value {
    Null,
    #[default]
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<Function>),
    Date(DateTime<Utc>),
    Pattern(Regex),
    Error(ErrorValue),
}

/// Body of an object value: a class name, an optional prototype and the own
/// properties.
#[derive(Default)]
pub struct Object {
    pub class: String,
    pub prototype: Option<ObjectRef>,
    pub properties: BTreeMap<String, Value>,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("has_prototype", &self.prototype.is_some())
            .field("keys", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A function-like value. It is never called; only its source text takes
/// part in comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub source: String,
}

/// The semantic category used to decide whether two values are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Undefined,
    Boolean,
    Number,
    NaN,
    String,
    Array,
    Object,
    Function,
    Date,
    RegExp,
    Error(ErrorKind),
    Unrecognized,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
            TypeTag::Boolean => "Boolean",
            TypeTag::Number => "Number",
            TypeTag::NaN => "NaN",
            TypeTag::String => "String",
            TypeTag::Array => "Array",
            TypeTag::Object => "Object",
            TypeTag::Function => "Function",
            TypeTag::Date => "Date",
            TypeTag::RegExp => "RegExp",
            TypeTag::Error(kind) => kind.as_str(),
            TypeTag::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::instance(DEFAULT_CLASS, entries)
    }

    /// An object created by a user-defined class.
    pub fn instance<K: Into<String>>(
        class: impl Into<String>,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Object(Rc::new(RefCell::new(Object {
            class: class.into(),
            prototype: None,
            properties: collect_properties(entries),
        })))
    }

    /// An object whose prototype is `prototype`. It shares the prototype's
    /// class. Returns `None` when `prototype` is not an object.
    pub fn inherit<K: Into<String>>(
        prototype: &Value,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Option<Self> {
        let Value::Object(proto) = prototype else {
            return None;
        };
        let class = proto.borrow().class.clone();
        Some(Value::Object(Rc::new(RefCell::new(Object {
            class,
            prototype: Some(Rc::clone(proto)),
            properties: collect_properties(entries),
        }))))
    }

    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Self {
        Value::Function(Rc::new(Function {
            name: name.into(),
            source: source.into(),
        }))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Sets an own property on an object. Returns `false` for non-objects.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Value::Object(obj) => {
                obj.borrow_mut().properties.insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Appends to an array. Returns `false` for non-arrays.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::Array(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Own property of an object, or element of an array when `key` is an
    /// index.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.borrow().properties.get(key).cloned(),
            Value::Array(items) => {
                let index: usize = key.parse().ok()?;
                items.borrow().get(index).cloned()
            }
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Undefined => TypeTag::Undefined,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(n) if n.is_nan() => TypeTag::NaN,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(obj) => {
                if obj.borrow().class == DEFAULT_CLASS {
                    TypeTag::Object
                } else {
                    TypeTag::Unrecognized
                }
            }
            Value::Function(_) => TypeTag::Function,
            Value::Date(_) => TypeTag::Date,
            Value::Pattern(_) => TypeTag::RegExp,
            Value::Error(e) => TypeTag::Error(e.kind),
        }
    }

    /// Coarse runtime type, as a `typeof` operator would report it.
    pub fn typeof_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::Date(_)
            | Value::Pattern(_)
            | Value::Error(_) => "object",
        }
    }

    /// Name of the constructor that produced a composite value.
    pub(crate) fn constructor_name(&self) -> String {
        match self {
            Value::Array(_) => "Array".to_string(),
            Value::Object(obj) => obj.borrow().class.clone(),
            Value::Error(e) => e.kind.as_str().to_string(),
            other => other.type_tag().to_string(),
        }
    }

    /// Address of the shared allocation behind reference values.
    pub(crate) fn identity(&self) -> Option<*const ()> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items) as *const ()),
            Value::Object(obj) => Some(Rc::as_ptr(obj) as *const ()),
            Value::Function(func) => Some(Rc::as_ptr(func) as *const ()),
            _ => None,
        }
    }

    /// Own enumerable properties of a composite value.
    pub(crate) fn own_entries(&self) -> BTreeMap<String, Value> {
        match self {
            Value::Array(items) => items
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            Value::Object(obj) => obj.borrow().properties.clone(),
            Value::Error(e) => {
                BTreeMap::from([("message".to_string(), Value::String(e.message.clone()))])
            }
            _ => BTreeMap::new(),
        }
    }

    /// Canonical string form of function-, date- and pattern-like values.
    pub(crate) fn canonical_string(&self) -> Option<String> {
        match self {
            Value::Function(func) => Some(func.source.clone()),
            Value::Date(date) => Some(date.to_rfc3339()),
            Value::Pattern(re) => Some(format!("/{}/", re.as_str())),
            _ => None,
        }
    }
}

fn collect_properties<K: Into<String>>(
    entries: impl IntoIterator<Item = (K, Value)>,
) -> BTreeMap<String, Value> {
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as f64)
            }
        })*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Undefined)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Pattern(re)
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Error(e)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(Value::from(1).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(Value::object(Vec::<(String, Value)>::new()).is_truthy());

        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(-0.0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Undefined.is_truthy());
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(Value::Null.type_tag(), TypeTag::Null);
        assert_eq!(Value::Undefined.type_tag(), TypeTag::Undefined);
        assert_eq!(Value::from(f64::NAN).type_tag(), TypeTag::NaN);
        assert_eq!(Value::from(3).type_tag(), TypeTag::Number);
        assert_eq!(Value::from(json!([1])).type_tag(), TypeTag::Array);
        assert_eq!(Value::from(json!({"a": 1})).type_tag(), TypeTag::Object);
        assert_eq!(
            Value::from(Regex::new("a+").unwrap()).type_tag(),
            TypeTag::RegExp
        );
        assert_eq!(
            Value::from(ErrorValue::range("x")).type_tag(),
            TypeTag::Error(ErrorKind::RangeError)
        );
        assert_eq!(
            Value::instance("Point", [("x", Value::from(1))]).type_tag(),
            TypeTag::Unrecognized
        );
    }

    #[test]
    fn test_typeof_name() {
        assert_eq!(Value::Null.typeof_name(), "object");
        assert_eq!(Value::function("f", "function f() {}").typeof_name(), "function");
        assert_eq!(Value::from(Utc::now()).typeof_name(), "object");
        assert_eq!(Value::from("s").typeof_name(), "string");
    }

    #[test]
    fn test_inherit_shares_class() {
        let proto = Value::instance("Animal", [("legs", Value::from(4))]);
        let child = Value::inherit(&proto, [("name", Value::from("rex"))]).unwrap();
        assert_eq!(child.constructor_name(), "Animal");
        assert!(Value::inherit(&Value::from(1), Vec::<(String, Value)>::new()).is_none());
    }

    #[test]
    fn test_set_get_push() {
        let obj = Value::object([("a", Value::from(1))]);
        assert!(obj.set("b", Value::from(2)));
        assert_eq!(obj.get("b"), Some(Value::from(2)));

        let arr = Value::array(vec![]);
        assert!(arr.push(Value::from("x")));
        assert_eq!(arr.get("0"), Some(Value::from("x")));
        assert_eq!(arr.get("1"), None);

        assert!(obj.set("c", Value::string(String::from("text"))));
        assert_eq!(obj.get("c"), Some(Value::from("text")));

        assert!(!Value::from(1).set("a", Value::Null));
        assert!(!Value::from(1).push(Value::Null));
    }

    #[test]
    fn test_from_option() {
        assert!(Value::from(None::<i32>).is_undefined());
        assert_eq!(Value::from(Some(5)), Value::from(5));
    }
}
