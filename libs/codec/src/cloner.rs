//! In-memory deep copy with copy-profile semantics
//!
//! Produces the same graph a copy-profile encode followed by a decode would:
//! every object is a fresh instance and sharing and cycles are preserved. No
//! bytes are materialised.
//!
//! A rebinding cloner passes every reference through its registered surrogate
//! and the caller's [`Resolver`], so a missing surrogate or runtime service
//! fails the copy exactly as a round trip would. A plain cloner copies
//! references as they are.

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::resolution::Resolver;
use crate::surrogate::SurrogateRegistry;
use std::collections::HashMap;
use types::{Object, Reference, Value};

#[derive(Debug)]
pub struct GraphCloner<'a> {
    limits: CodecLimits,
    rebind: Option<(&'a SurrogateRegistry, Resolver<'a>)>,
    /// Source identity → copy
    copies: HashMap<usize, Object>,
    /// Keeps source objects alive for the duration of the clone
    sources: Vec<Object>,
    depth: usize,
}

impl GraphCloner<'static> {
    pub fn new(limits: CodecLimits) -> Self {
        Self {
            limits,
            rebind: None,
            copies: HashMap::new(),
            sources: Vec::new(),
            depth: 0,
        }
    }

    /// Deep-copy `value` with a fresh identity table, references copied as-is
    pub fn clone_graph(limits: CodecLimits, value: &Value) -> CodecResult<Value> {
        Self::new(limits).clone_value(value)
    }
}

impl<'a> GraphCloner<'a> {
    /// Cloner that rebinds references through `surrogates` and `resolver`
    pub fn rebinding(
        limits: CodecLimits,
        surrogates: &'a SurrogateRegistry,
        resolver: Resolver<'a>,
    ) -> Self {
        Self {
            limits,
            rebind: Some((surrogates, resolver)),
            copies: HashMap::new(),
            sources: Vec::new(),
            depth: 0,
        }
    }

    pub fn clone_value(&mut self, value: &Value) -> CodecResult<Value> {
        match value {
            Value::Seq(items) => {
                self.enter()?;
                let copied = items
                    .iter()
                    .map(|item| self.clone_value(item))
                    .collect::<CodecResult<Vec<_>>>()?;
                self.leave();
                Ok(Value::Seq(copied))
            }
            Value::Object(object) => self.clone_object(object).map(Value::Object),
            Value::Reference(reference) => self.clone_reference(reference).map(Value::Reference),
            other => Ok(other.clone()),
        }
    }

    fn clone_reference(&self, reference: &Reference) -> CodecResult<Reference> {
        let Some((surrogates, resolver)) = &self.rebind else {
            return Ok(reference.clone());
        };
        let kind = reference.kind();
        let handlers = surrogates.lookup(kind).ok_or_else(|| {
            CodecError::unsupported(kind.type_name(), "no surrogate registered for this reference kind")
        })?;
        handlers.decode(handlers.encode(reference)?, resolver)
    }

    fn clone_object(&mut self, source: &Object) -> CodecResult<Object> {
        if let Some(copy) = self.copies.get(&source.id()) {
            return Ok(copy.clone());
        }

        let record = source.read();
        let copy = Object::empty(record.type_name());
        self.copies.insert(source.id(), copy.clone());
        self.sources.push(source.clone());

        self.enter()?;
        let mut fields = Vec::with_capacity(record.len());
        for (name, value) in record.fields() {
            fields.push((name.clone(), self.clone_value(value)?));
        }
        drop(record);
        self.leave();

        copy.write().replace_fields(fields);
        Ok(copy)
    }

    fn enter(&mut self) -> CodecResult<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.limits.max_depth,
                operation: "cloning",
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}
