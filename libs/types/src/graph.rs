//! # Message Graph
//!
//! ## Purpose
//!
//! Dynamic, versionable value graph that messages are made of. Primitive and
//! sequence values are owned trees; [`Object`] nodes are shared, so the same
//! record can be reachable from several places in one message (including from
//! itself).
//!
//! ## Identity
//!
//! An object's identity is its allocation. Cloning an [`Object`] clones the
//! handle, not the record. Codecs key their identity tables on
//! [`Object::id`], which is stable for as long as any handle is alive.
//!
//! ## Equality
//!
//! `Value` equality is structural and terminates on cyclic graphs: a pair of
//! objects already under comparison is assumed equal. Sharing topology is not
//! compared; use [`Object::ptr_eq`] for that.

use crate::references::{ActorPath, ActorRef, ClientRef, Reference, StreamPath, StreamRef};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A node of the message graph
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    Object(Object),
    Reference(Reference),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Seq(_) => "sequence",
            Value::Object(_) => "object",
            Value::Reference(_) => "reference",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Structural, cycle-safe equality
    pub fn structurally_eq(&self, other: &Value) -> bool {
        let mut in_progress = HashSet::new();
        structural_eq(self, other, &mut in_progress)
    }
}

fn structural_eq(a: &Value, b: &Value, in_progress: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::UInt(x), Value::UInt(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits() || x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Seq(xs), Value::Seq(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| structural_eq(x, y, in_progress))
        }
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) || !in_progress.insert((x.id(), y.id())) {
                return true;
            }
            // Snapshots release the locks before recursing into shared nodes
            let left = x.snapshot();
            let right = y.snapshot();
            left.type_name == right.type_name
                && left.fields.len() == right.fields.len()
                && left
                    .fields
                    .iter()
                    .zip(&right.fields)
                    .all(|((ln, lv), (rn, rv))| ln == rn && structural_eq(lv, rv, in_progress))
        }
        (Value::Reference(x), Value::Reference(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::UInt(u64::from(u))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Reference(reference)
    }
}

macro_rules! value_from_reference {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl From<$kind> for Value {
                fn from(reference: $kind) -> Self {
                    Value::Reference(reference.into())
                }
            }
        )+
    };
}

value_from_reference!(ActorPath, StreamPath, ActorRef, StreamRef, ClientRef);

/// Named, ordered field set of a composite record
#[derive(Debug, Clone, Default)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn from_fields(type_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        let mut record = Self::new(type_name);
        for (name, value) in fields {
            record.set(name, value);
        }
        record
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Replace the whole field set, used when materialising decoded objects
    pub fn replace_fields(&mut self, fields: Vec<(String, Value)>) {
        self.fields = fields;
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Shared, mutable record node
#[derive(Clone)]
pub struct Object {
    inner: Arc<RwLock<Record>>,
}

impl Object {
    pub fn new(record: Record) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    /// Object with a type name and no fields yet
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self::new(Record::new(type_name))
    }

    /// Allocation identity
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Record> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Record> {
        self.inner.write()
    }

    pub fn type_name(&self) -> String {
        self.inner.read().type_name.clone()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.write().set(name, value);
    }

    /// Clone of the record; shared children stay shared
    pub fn snapshot(&self) -> Record {
        self.inner.read().clone()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never recurse: graphs may be cyclic
        let mut debug = f.debug_struct("Object");
        debug.field("id", &format_args!("{:#x}", self.id()));
        match self.inner.try_read() {
            Some(record) => debug
                .field("type_name", &record.type_name)
                .field("fields", &record.field_names())
                .finish(),
            None => debug.finish_non_exhaustive(),
        }
    }
}

impl From<Record> for Object {
    fn from(record: Record) -> Self {
        Object::new(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64) -> Object {
        Object::new(Record::new("Order").with_field("id", id).with_field("note", "rush"))
    }

    #[test]
    fn test_record_set_replaces_in_place() {
        let mut record = Record::new("Order").with_field("a", 1i64).with_field("b", 2i64);
        record.set("a", 10i64);
        assert_eq!(record.field_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(record.get("a"), Some(&Value::Int(10)));
        assert_eq!(record.remove("b"), Some(Value::Int(2)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_structural_equality_of_distinct_objects() {
        assert_eq!(Value::from(order(1)), Value::from(order(1)));
        assert_ne!(Value::from(order(1)), Value::from(order(2)));
    }

    #[test]
    fn test_structural_equality_terminates_on_cycles() {
        let a = Object::empty("Node");
        a.set("next", a.clone());
        let b = Object::empty("Node");
        b.set("next", b.clone());
        assert_eq!(Value::from(a), Value::from(b));
    }

    #[test]
    fn test_object_identity() {
        let a = order(1);
        let alias = a.clone();
        assert!(a.ptr_eq(&alias));
        assert_eq!(a.id(), alias.id());
        assert!(!a.ptr_eq(&order(1)));
    }

    #[test]
    fn test_debug_does_not_recurse() {
        let a = Object::empty("Node");
        a.set("next", a.clone());
        let rendered = format!("{:?}", Value::from(a));
        assert!(rendered.contains("Node"));
    }

    #[test]
    fn test_float_equality_is_bitwise_for_nan() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_reference_conversion() {
        let path = ActorPath::new("Inventory", "1").unwrap();
        let value = Value::from(path.clone());
        assert_eq!(value.as_reference(), Some(&Reference::ActorPath(path)));
    }
}
