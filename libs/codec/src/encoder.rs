//! Graph encoder for both profiles
//!
//! Objects are numbered in first-visit order. An object enters the identity
//! table before its fields are written, so a cycle back to it becomes a
//! back-reference instead of unbounded recursion. The table lives only for
//! one `encode` call.

use crate::buffers::PayloadWriter;
use crate::constants::{Profile, ValueTag, PAYLOAD_MAGIC, PAYLOAD_VERSION};
use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::surrogate::SurrogateRegistry;
use std::collections::HashMap;
use types::{Object, Record, Reference, Value};

pub(crate) struct Encoder<'a> {
    profile: Profile,
    limits: CodecLimits,
    surrogates: &'a SurrogateRegistry,
    writer: PayloadWriter,
    /// Object identity → emitted index
    objects: HashMap<usize, u32>,
    /// Keeps visited objects alive so their identities cannot be reused mid-call
    visited: Vec<Object>,
    /// Copy profile: (type name, field names) → layout index
    layouts: HashMap<(String, Vec<String>), u32>,
    depth: usize,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(
        profile: Profile,
        limits: CodecLimits,
        surrogates: &'a SurrogateRegistry,
    ) -> Self {
        Self {
            profile,
            limits,
            surrogates,
            writer: PayloadWriter::new(&limits),
            objects: HashMap::new(),
            visited: Vec::new(),
            layouts: HashMap::new(),
            depth: 0,
        }
    }

    pub(crate) fn encode(mut self, root: &Value) -> CodecResult<Vec<u8>> {
        self.writer.put_u32(PAYLOAD_MAGIC);
        self.writer.put_u8(PAYLOAD_VERSION);
        self.writer.put_u8(self.profile.into());
        self.encode_value(root)?;
        Ok(self.writer.into_inner())
    }

    fn tag(&mut self, tag: ValueTag) {
        self.writer.put_u8(tag.into());
    }

    fn enter(&mut self) -> CodecResult<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.limits.max_depth,
                operation: "encoding",
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn encode_value(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.tag(ValueTag::Null),
            Value::Bool(false) => self.tag(ValueTag::False),
            Value::Bool(true) => self.tag(ValueTag::True),
            Value::Int(v) => {
                self.tag(ValueTag::Int);
                self.writer.put_i64(*v);
            }
            Value::UInt(v) => {
                self.tag(ValueTag::UInt);
                self.writer.put_u64(*v);
            }
            Value::Float(v) => {
                self.tag(ValueTag::Float);
                self.writer.put_f64(*v);
            }
            Value::Str(s) => {
                self.tag(ValueTag::Str);
                self.writer.put_str(s)?;
            }
            Value::Bytes(b) => {
                self.tag(ValueTag::Bytes);
                self.writer.put_bytes(b)?;
            }
            Value::Seq(items) => {
                self.enter()?;
                self.tag(ValueTag::Seq);
                self.writer.put_len(items.len(), "sequence")?;
                for item in items {
                    self.encode_value(item)?;
                }
                self.leave();
            }
            Value::Object(object) => self.encode_object(object)?,
            Value::Reference(reference) => self.encode_reference(reference)?,
        }
        Ok(())
    }

    fn encode_object(&mut self, object: &Object) -> CodecResult<()> {
        if let Some(&index) = self.objects.get(&object.id()) {
            self.tag(ValueTag::BackRef);
            self.writer.put_u32(index);
            return Ok(());
        }

        let index = u32::try_from(self.visited.len())
            .map_err(|_| CodecError::length_exceeded(self.visited.len(), u32::MAX as usize, "object table"))?;
        self.objects.insert(object.id(), index);
        self.visited.push(object.clone());

        self.enter()?;
        self.tag(ValueTag::Record);
        let record = object.read();
        match self.profile {
            Profile::Wire => self.write_tagged_fields(&record)?,
            Profile::Copy => self.write_positional_fields(&record)?,
        }
        drop(record);
        self.leave();
        Ok(())
    }

    /// `type, count, (name, u32 length, value)*`
    fn write_tagged_fields(&mut self, record: &Record) -> CodecResult<()> {
        self.writer.put_str(record.type_name())?;
        self.writer.put_count(record.len(), "record fields")?;
        for (name, value) in record.fields() {
            self.writer.put_str(name)?;
            let slot = self.writer.reserve_u32();
            self.encode_value(value)?;
            self.writer.patch_len(slot, "record field")?;
        }
        Ok(())
    }

    /// `layout index, [type, count, names*] if new, values*`
    fn write_positional_fields(&mut self, record: &Record) -> CodecResult<()> {
        let key = (record.type_name().to_string(), record.field_names());
        match self.layouts.get(&key) {
            Some(&index) => self.writer.put_u32(index),
            None => {
                let index = self.layouts.len() as u32;
                self.writer.put_u32(index);
                self.writer.put_str(&key.0)?;
                self.writer.put_count(key.1.len(), "record fields")?;
                for name in &key.1 {
                    self.writer.put_str(name)?;
                }
                self.layouts.insert(key, index);
            }
        }
        for (_, value) in record.fields() {
            self.encode_value(value)?;
        }
        Ok(())
    }

    fn encode_reference(&mut self, reference: &Reference) -> CodecResult<()> {
        let kind = reference.kind();
        let handlers = self.surrogates.lookup(kind).ok_or_else(|| {
            CodecError::unsupported(kind.type_name(), "no surrogate registered for this reference kind")
        })?;
        let proxy = handlers.encode(reference)?;
        self.tag(ValueTag::Surrogate);
        self.writer.put_u8(handlers.proxy_tag());
        self.writer.put_str(proxy.canonical())
    }
}
