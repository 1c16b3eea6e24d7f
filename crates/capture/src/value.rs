//! Argument values handed to console functions.
//!
//! Values form a closed set: primitives, structured (object-like, possibly
//! cyclic) nodes, and host values that cannot be serialized at all. String
//! conversion and JSON serialization follow page-script semantics so the
//! relayed text matches what the page itself would print.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Number};

use crate::error::SerializeError;

/// 2^63: integral numbers below this magnitude fit an `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A single console argument.
#[derive(Debug, Clone)]
pub enum Value {
    Primitive(Primitive),
    Structured(Structured),
    /// Object-like host value whose serialization always fails. Carries its
    /// canonical string form.
    Unserializable(String),
}

/// Non-object values.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// Symbol with its description.
    Symbol(String),
    /// Function with its source text.
    Function(String),
}

/// An error object as seen by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.message.is_empty()) {
            (_, true) => f.write_str(&self.name),
            (true, false) => f.write_str(&self.message),
            (false, false) => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

/// Contents of a structured value.
pub enum Node {
    /// Plain object; keys keep insertion order.
    Object(Vec<(String, Value)>),
    Array(Vec<Value>),
    Error(ErrorValue),
}

/// Shared handle to a structured node. Clones alias the same node, so
/// self-referencing structures can be built with [`Structured::set`] and
/// [`Structured::push`].
#[derive(Clone)]
pub struct Structured(Rc<RefCell<Node>>);

type NodeId = *const RefCell<Node>;

impl Structured {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::from_node(Node::Object(entries))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::from_node(Node::Array(items.into_iter().collect()))
    }

    pub fn error(error: ErrorValue) -> Self {
        Self::from_node(Node::Error(error))
    }

    fn from_node(node: Node) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    /// Borrows the node contents.
    pub fn node(&self) -> Ref<'_, Node> {
        self.0.borrow()
    }

    /// Sets an object member, replacing an existing key in place.
    ///
    /// Ignored for arrays and errors.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        if let Node::Object(entries) = &mut *self.0.borrow_mut() {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Appends an array element. Ignored for objects and errors.
    pub fn push(&self, value: Value) {
        if let Node::Array(items) = &mut *self.0.borrow_mut() {
            items.push(value);
        }
    }

    /// Returns the error payload if this node is an error object.
    pub fn as_error(&self) -> Option<ErrorValue> {
        match &*self.node() {
            Node::Error(e) => Some(e.clone()),
            _ => None,
        }
    }

    fn id(&self) -> NodeId {
        Rc::as_ptr(&self.0)
    }
}

impl fmt::Debug for Structured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0.try_borrow().as_deref() {
            Ok(Node::Object(entries)) => format!("Object({} keys)", entries.len()),
            Ok(Node::Array(items)) => format!("Array({})", items.len()),
            Ok(Node::Error(e)) => format!("Error({e})"),
            Err(_) => "<borrowed>".to_string(),
        };
        write!(f, "Structured({kind} @ {:p})", self.id())
    }
}

impl Value {
    pub fn undefined() -> Self {
        Value::Primitive(Primitive::Undefined)
    }

    pub fn null() -> Self {
        Value::Primitive(Primitive::Null)
    }

    pub fn bigint(n: i128) -> Self {
        Value::Primitive(Primitive::BigInt(n))
    }

    pub fn symbol(description: impl Into<String>) -> Self {
        Value::Primitive(Primitive::Symbol(description.into()))
    }

    pub fn function(source: impl Into<String>) -> Self {
        Value::Primitive(Primitive::Function(source.into()))
    }

    pub fn unserializable(description: impl Into<String>) -> Self {
        Value::Unserializable(description.into())
    }

    /// Whether the page would treat this value as an object (`null` included).
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Structured(_) | Value::Unserializable(_) | Value::Primitive(Primitive::Null)
        )
    }

    /// Page-script truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Primitive(p) => match p {
                Primitive::Undefined | Primitive::Null => false,
                Primitive::Bool(b) => *b,
                Primitive::Number(n) => *n != 0.0 && !n.is_nan(),
                Primitive::BigInt(n) => *n != 0,
                Primitive::String(s) => !s.is_empty(),
                Primitive::Symbol(_) | Primitive::Function(_) => true,
            },
            Value::Structured(_) | Value::Unserializable(_) => true,
        }
    }

    /// Canonical string conversion. Total: cycles render as empty strings.
    pub fn to_display_string(&self) -> String {
        let mut path = Vec::new();
        display(self, &mut path)
    }

    /// Serializes to a JSON tree.
    ///
    /// Members that have no JSON form (`undefined`, functions, symbols) yield
    /// `null` at the top level.
    pub fn to_json(&self) -> Result<serde_json::Value, SerializeError> {
        let mut path = Vec::new();
        Ok(to_json(self, &mut path)?.unwrap_or(serde_json::Value::Null))
    }

    /// Serializes to two-space indented JSON text.
    pub fn to_pretty_json(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Undefined => f.write_str("undefined"),
            Primitive::Null => f.write_str("null"),
            Primitive::Bool(b) => write!(f, "{b}"),
            Primitive::Number(n) => f.write_str(&format_number(*n)),
            Primitive::BigInt(n) => write!(f, "{n}"),
            Primitive::String(s) => f.write_str(s),
            Primitive::Symbol(d) => write!(f, "Symbol({d})"),
            Primitive::Function(src) => f.write_str(src),
        }
    }
}

fn display(value: &Value, path: &mut Vec<NodeId>) -> String {
    match value {
        Value::Primitive(p) => p.to_string(),
        Value::Unserializable(desc) => desc.clone(),
        Value::Structured(s) => {
            let id = s.id();
            let node = s.node();
            match &*node {
                Node::Object(_) => "[object Object]".to_string(),
                Node::Error(e) => e.to_string(),
                Node::Array(items) => {
                    if path.contains(&id) {
                        return String::new();
                    }
                    path.push(id);
                    let joined = items
                        .iter()
                        .map(|item| match item {
                            Value::Primitive(Primitive::Undefined | Primitive::Null) => String::new(),
                            other => display(other, path),
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    path.pop();
                    joined
                }
            }
        }
    }
}

/// Number to string the way a page script prints it.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n == 0.0 {
        return "0".into();
    }

    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    n.to_string()
}

fn json_number(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    // Integral values print without a fractional part, as page scripts do.
    if n.fract() == 0.0 && n.abs() < I64_BOUND {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// `Ok(None)` means the value has no JSON form and is skipped by its parent.
fn to_json(
    value: &Value,
    path: &mut Vec<NodeId>,
) -> Result<Option<serde_json::Value>, SerializeError> {
    use serde_json::Value as Json;

    let json = match value {
        Value::Primitive(p) => match p {
            Primitive::Undefined | Primitive::Symbol(_) | Primitive::Function(_) => {
                return Ok(None);
            }
            Primitive::Null => Json::Null,
            Primitive::Bool(b) => Json::Bool(*b),
            Primitive::Number(n) => json_number(*n),
            Primitive::BigInt(_) => return Err(SerializeError::Unsupported("BigInt".into())),
            Primitive::String(s) => Json::String(s.clone()),
        },
        Value::Unserializable(desc) => return Err(SerializeError::Unsupported(desc.clone())),
        Value::Structured(s) => {
            let id = s.id();
            if path.contains(&id) {
                return Err(SerializeError::Cycle);
            }
            path.push(id);
            let result = node_to_json(&s.node(), path);
            path.pop();
            result?
        }
    };
    Ok(Some(json))
}

fn node_to_json(node: &Node, path: &mut Vec<NodeId>) -> Result<serde_json::Value, SerializeError> {
    use serde_json::Value as Json;

    match node {
        Node::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                if let Some(json) = to_json(value, path)? {
                    map.insert(key.clone(), json);
                }
            }
            Ok(Json::Object(map))
        }
        Node::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json(item, path)?.unwrap_or(Json::Null));
            }
            Ok(Json::Array(out))
        }
        // Error properties are not enumerable.
        Node::Error(_) => Ok(Json::Object(Map::new())),
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Primitive(p)
    }
}

impl From<Structured> for Value {
    fn from(s: Structured) -> Self {
        Value::Structured(s)
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Structured(Structured::error(e))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Primitive(Primitive::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Primitive(Primitive::String(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Primitive(Primitive::Bool(b))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Primitive(Primitive::Number(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Primitive(Primitive::Number(f64::from(n)))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::null(),
            Json::Bool(b) => b.into(),
            Json::Number(n) => n.as_f64().unwrap_or(f64::NAN).into(),
            Json::String(s) => s.into(),
            Json::Array(items) => Structured::array(items.into_iter().map(Value::from)).into(),
            Json::Object(map) => {
                Structured::object(map.into_iter().map(|(k, v)| (k, Value::from(v)))).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_page_scripts() {
        assert_eq!(Value::from(3).to_display_string(), "3");
        assert_eq!(Value::from(1.5).to_display_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_display_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_display_string(), "NaN");
        assert_eq!(Value::from(f64::INFINITY).to_display_string(), "Infinity");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_display_string(), "-Infinity");
        assert_eq!(Value::from(1e21).to_display_string(), "1e+21");
        assert_eq!(Value::from(1e20).to_display_string(), "100000000000000000000");
        assert_eq!(Value::from(1.5e-7).to_display_string(), "1.5e-7");
        assert_eq!(Value::from(0.000001).to_display_string(), "0.000001");
    }

    #[test]
    fn primitives_display() {
        assert_eq!(Value::undefined().to_display_string(), "undefined");
        assert_eq!(Value::null().to_display_string(), "null");
        assert_eq!(Value::from(true).to_display_string(), "true");
        assert_eq!(Value::bigint(12345678901234567890).to_display_string(), "12345678901234567890");
        assert_eq!(Value::symbol("tag").to_display_string(), "Symbol(tag)");
        assert_eq!(Value::function("() => 1").to_display_string(), "() => 1");
    }

    #[test]
    fn structured_display() {
        let obj = Value::from(Structured::object([("a", Value::from(1))]));
        assert_eq!(obj.to_display_string(), "[object Object]");

        let arr = Value::from(Structured::array([
            Value::from(1),
            Value::null(),
            Value::from("x"),
            Value::undefined(),
        ]));
        assert_eq!(arr.to_display_string(), "1,,x,");

        let err = Value::from(ErrorValue::new("RangeError", "too big"));
        assert_eq!(err.to_display_string(), "RangeError: too big");
        let bare = Value::from(ErrorValue::new("Error", ""));
        assert_eq!(bare.to_display_string(), "Error");
    }

    #[test]
    fn cyclic_array_display_terminates() {
        let arr = Structured::array([Value::from(1)]);
        arr.push(Value::from(arr.clone()));
        assert_eq!(Value::from(arr).to_display_string(), "1,");
    }

    #[test]
    fn truthiness() {
        for falsy in [
            Value::undefined(),
            Value::null(),
            Value::from(false),
            Value::from(0),
            Value::from(f64::NAN),
            Value::from(""),
            Value::bigint(0),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?}");
        }
        for truthy in [
            Value::from("0"),
            Value::from(-1),
            Value::from(Structured::object(Vec::<(String, Value)>::new())),
            Value::unserializable("[object Window]"),
        ] {
            assert!(truthy.is_truthy(), "{truthy:?}");
        }
    }

    #[test]
    fn json_skips_members_without_json_form() {
        let obj = Structured::object([
            ("keep", Value::from(1)),
            ("gone", Value::undefined()),
            ("fn", Value::function("f() {}")),
            ("list", Value::from(Structured::array([Value::undefined(), Value::from(2.5)]))),
            ("inf", Value::from(f64::INFINITY)),
        ]);
        let json = Value::from(obj).to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({"keep": 1, "list": [null, 2.5], "inf": null})
        );
    }

    #[test]
    fn json_detects_cycles() {
        let obj = Structured::object([("name", Value::from("root"))]);
        obj.set("self", Value::from(obj.clone()));
        let err = Value::from(obj).to_json().unwrap_err();
        assert!(matches!(err, SerializeError::Cycle));
    }

    #[test]
    fn json_allows_shared_siblings() {
        let shared = Structured::object([("v", Value::from(1))]);
        let parent = Structured::object([
            ("a", Value::from(shared.clone())),
            ("b", Value::from(shared)),
        ]);
        let json = Value::from(parent).to_json().unwrap();
        assert_eq!(json, serde_json::json!({"a": {"v": 1}, "b": {"v": 1}}));
    }

    #[test]
    fn json_rejects_bigint_and_unserializable() {
        let nested = Structured::object([("n", Value::bigint(1))]);
        assert!(matches!(
            Value::from(nested).to_json(),
            Err(SerializeError::Unsupported(_))
        ));
        assert!(Value::unserializable("[object Window]").to_json().is_err());
    }

    #[test]
    fn large_integral_numbers_have_no_fraction() {
        let obj = Structured::object([
            ("safe", Value::from(9_007_199_254_740_991.0)),
            ("unsafe", Value::from(9_007_199_254_740_992.0)),
            ("negative", Value::from(-1e18)),
        ]);
        assert_eq!(
            Value::from(obj).to_pretty_json().unwrap(),
            "{\n  \"safe\": 9007199254740991,\n  \"unsafe\": 9007199254740992,\n  \"negative\": -1000000000000000000\n}"
        );
    }

    #[test]
    fn error_serializes_as_empty_object() {
        let err = Value::from(ErrorValue::new("Error", "boom").with_stack("at x"));
        assert_eq!(err.to_pretty_json().unwrap(), "{}");
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let value = Value::from(serde_json::json!({"b": 1, "a": [true]}));
        assert_eq!(
            value.to_pretty_json().unwrap(),
            "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}"
        );
    }

    #[test]
    fn set_replaces_existing_key_in_place() {
        let obj = Structured::object([("a", Value::from(1)), ("b", Value::from(2))]);
        obj.set("a", Value::from(3));
        let json = Value::from(obj).to_json().unwrap();
        assert_eq!(serde_json::to_string(&json).unwrap(), r#"{"a":3,"b":2}"#);
    }
}
