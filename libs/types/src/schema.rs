//! Record Schemas
//!
//! The decoder-side view of a record type: which fields it knows about, in
//! which order, and what value a field takes when the wire does not carry it.
//! Defaults should be plain values; object defaults are cloned per decode.

use crate::graph::Value;

/// A field known to a record schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    name: String,
    default: Value,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// Schema of a composite record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    type_name: String,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field defaulting to null
    pub fn field(self, name: impl Into<String>) -> Self {
        self.field_with_default(name, Value::Null)
    }

    /// Add a field with an explicit default; re-declaring a field replaces it
    pub fn field_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let field = FieldSchema::new(name, default);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_field_order_and_defaults() {
        let schema = RecordSchema::new("Order")
            .field("a")
            .field_with_default("b", 7i64)
            .field_with_default("a", "x");

        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schema.fields()[0].default_value(), &Value::from("x"));
        assert_eq!(schema.position("b"), Some(1));
        assert!(!schema.contains("c"));
    }
}
