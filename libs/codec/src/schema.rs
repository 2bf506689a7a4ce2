//! Record schemas known to this process
//!
//! The wire decoder conforms decoded records to the registered schema of
//! their type: fields the schema does not name are dropped, fields it names
//! but the payload lacks take their declared default.

use crate::error::{CodecError, CodecResult};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;
use types::RecordSchema;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema of one record type; duplicates are a setup error
    pub fn register(&mut self, schema: RecordSchema) -> CodecResult<()> {
        match self.schemas.entry(schema.type_name().to_string()) {
            Entry::Occupied(slot) => Err(CodecError::DuplicateSchema {
                type_name: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                debug!(
                    type_name = %schema.type_name(),
                    fields = schema.fields().len(),
                    "Registered record schema"
                );
                slot.insert(schema);
                Ok(())
            }
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&RecordSchema> {
        self.schemas.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_schema_rejected() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(RecordSchema::new("Order").field("id"))
            .unwrap();
        let err = registry
            .register(RecordSchema::new("Order").field("qty"))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::DuplicateSchema {
                type_name: "Order".into()
            }
        );
        assert_eq!(registry.get("Order").unwrap().field_names().count(), 1);
    }
}
