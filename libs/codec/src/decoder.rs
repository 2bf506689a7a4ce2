//! Graph decoder for both profiles
//!
//! The inverse of the encoder: a freshly allocated object is registered
//! under its index before its fields are decoded, so back-references inside
//! those fields resolve to the node being built.

use crate::buffers::PayloadReader;
use crate::cloner::GraphCloner;
use crate::constants::{Profile, ValueTag, PAYLOAD_MAGIC, PAYLOAD_VERSION};
use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::resolution::Resolver;
use crate::schema::SchemaRegistry;
use crate::surrogate::{Proxy, SurrogateRegistry};
use std::sync::Arc;
use tracing::{debug, trace};
use types::{Object, Value};

/// Field layout announced by a copy-profile payload
#[derive(Debug)]
struct Layout {
    type_name: String,
    fields: Vec<String>,
}

pub(crate) struct Decoder<'a, 'r> {
    profile: Profile,
    limits: CodecLimits,
    surrogates: &'a SurrogateRegistry,
    schemas: &'a SchemaRegistry,
    resolver: Resolver<'r>,
    reader: PayloadReader<'a>,
    objects: Vec<Object>,
    layouts: Vec<Arc<Layout>>,
    depth: usize,
}

impl<'a, 'r> Decoder<'a, 'r> {
    pub(crate) fn new(
        profile: Profile,
        limits: CodecLimits,
        surrogates: &'a SurrogateRegistry,
        schemas: &'a SchemaRegistry,
        resolver: Resolver<'r>,
        data: &'a [u8],
    ) -> Self {
        Self {
            profile,
            limits,
            surrogates,
            schemas,
            resolver,
            reader: PayloadReader::new(data, &limits),
            objects: Vec::new(),
            layouts: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn decode(mut self) -> CodecResult<Value> {
        self.read_header()?;
        let root = self.decode_value()?;
        if self.reader.remaining() > 0 {
            return Err(self.reader.error(format!(
                "{} trailing bytes after root value",
                self.reader.remaining()
            )));
        }
        Ok(root)
    }

    fn read_header(&mut self) -> CodecResult<()> {
        let magic = self.reader.read_u32("payload magic")?;
        if magic != PAYLOAD_MAGIC {
            return Err(CodecError::decode(
                0,
                format!("invalid payload magic {magic:#010x}, expected {PAYLOAD_MAGIC:#010x}"),
                self.reader.buffer_size(),
            ));
        }
        let at = self.reader.offset();
        let version = self.reader.read_u8("payload version")?;
        if version != PAYLOAD_VERSION {
            return Err(CodecError::decode(
                at,
                format!("unsupported payload version {version}"),
                self.reader.buffer_size(),
            ));
        }
        let at = self.reader.offset();
        let raw = self.reader.read_u8("payload profile")?;
        let profile = Profile::try_from(raw).map_err(|_| {
            CodecError::decode(at, format!("unknown profile {raw}"), self.reader.buffer_size())
        })?;
        if profile != self.profile {
            return Err(CodecError::decode(
                at,
                format!(
                    "payload encoded with {} profile, decoder expects {}",
                    profile.name(),
                    self.profile.name()
                ),
                self.reader.buffer_size(),
            ));
        }
        Ok(())
    }

    fn enter(&mut self) -> CodecResult<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.limits.max_depth,
                operation: "decoding",
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn decode_value(&mut self) -> CodecResult<Value> {
        let at = self.reader.offset();
        let raw = self.reader.read_u8("value tag")?;
        let tag = ValueTag::try_from(raw)
            .map_err(|_| CodecError::unknown_tag(at, raw, self.reader.buffer_size()))?;

        let value = match tag {
            ValueTag::Null => Value::Null,
            ValueTag::False => Value::Bool(false),
            ValueTag::True => Value::Bool(true),
            ValueTag::Int => Value::Int(self.reader.read_i64("int")?),
            ValueTag::UInt => Value::UInt(self.reader.read_u64("uint")?),
            ValueTag::Float => Value::Float(self.reader.read_f64("float")?),
            ValueTag::Str => Value::Str(self.reader.read_str("string")?.to_string()),
            ValueTag::Bytes => Value::Bytes(self.reader.read_bytes("byte array")?.to_vec()),
            ValueTag::Seq => {
                let count = self.reader.read_len("sequence")?;
                self.enter()?;
                // Every element takes at least one byte
                let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
                for _ in 0..count {
                    items.push(self.decode_value()?);
                }
                self.leave();
                Value::Seq(items)
            }
            ValueTag::Record => {
                self.enter()?;
                let object = match self.profile {
                    Profile::Wire => self.read_tagged_record()?,
                    Profile::Copy => self.read_positional_record()?,
                };
                self.leave();
                Value::Object(object)
            }
            ValueTag::BackRef => {
                let index = self.reader.read_u32("back-reference")? as usize;
                let object = self.objects.get(index).ok_or_else(|| {
                    CodecError::decode(
                        at,
                        format!(
                            "back-reference to object {index}, only {} decoded",
                            self.objects.len()
                        ),
                        self.reader.buffer_size(),
                    )
                })?;
                Value::Object(object.clone())
            }
            ValueTag::Surrogate => self.read_surrogate(at)?,
        };
        Ok(value)
    }

    /// Allocate and register the object before any of its fields decode
    fn register_object(&mut self, type_name: &str) -> Object {
        let object = Object::empty(type_name);
        self.objects.push(object.clone());
        object
    }

    fn read_tagged_record(&mut self) -> CodecResult<Object> {
        let type_name = self.reader.read_str("record type name")?;
        let count = self.reader.read_u16("record field count")?;
        let object = self.register_object(type_name);

        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = self.reader.read_str("field name")?.to_string();
            let declared = self.reader.read_u32("field length")? as usize;
            if declared > self.reader.remaining() {
                return Err(CodecError::truncated(
                    self.reader.offset(),
                    declared,
                    self.reader.buffer_size(),
                    "record field",
                ));
            }
            let start = self.reader.offset();
            let value = self.decode_value()?;
            let consumed = self.reader.offset() - start;
            if consumed != declared {
                return Err(CodecError::decode(
                    start,
                    format!("field '{name}' declared {declared} bytes but its value used {consumed}"),
                    self.reader.buffer_size(),
                ));
            }
            fields.push((name, value));
        }

        let fields = self.conform(type_name, fields)?;
        object.write().replace_fields(fields);
        Ok(object)
    }

    /// Reshape decoded fields to the registered schema of `type_name`, if any
    fn conform(
        &self,
        type_name: &str,
        mut decoded: Vec<(String, Value)>,
    ) -> CodecResult<Vec<(String, Value)>> {
        let Some(schema) = self.schemas.get(type_name) else {
            return Ok(decoded);
        };

        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            match decoded.iter().position(|(name, _)| name == field.name()) {
                Some(index) => fields.push(decoded.swap_remove(index)),
                None => {
                    debug!(type_name, field = field.name(), "Field missing from payload, using default");
                    // Each decode owns its defaults; object defaults must not be shared
                    let default = GraphCloner::clone_graph(self.limits, field.default_value())?;
                    fields.push((field.name().to_string(), default));
                }
            }
        }
        for (name, _) in &decoded {
            trace!(type_name, field = %name, "Dropping field unknown to local schema");
        }
        Ok(fields)
    }

    fn read_positional_record(&mut self) -> CodecResult<Object> {
        let at = self.reader.offset();
        let index = self.reader.read_u32("layout index")? as usize;
        let layout = match index {
            i if i < self.layouts.len() => self.layouts[i].clone(),
            i if i == self.layouts.len() => {
                let type_name = self.reader.read_str("record type name")?.to_string();
                let count = self.reader.read_u16("record field count")?;
                let mut fields = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    fields.push(self.reader.read_str("field name")?.to_string());
                }
                let layout = Arc::new(Layout { type_name, fields });
                self.layouts.push(layout.clone());
                layout
            }
            i => {
                return Err(CodecError::decode(
                    at,
                    format!("layout index {i} beyond table of {}", self.layouts.len()),
                    self.reader.buffer_size(),
                ))
            }
        };

        let object = self.register_object(&layout.type_name);
        let mut fields = Vec::with_capacity(layout.fields.len());
        for name in &layout.fields {
            fields.push((name.clone(), self.decode_value()?));
        }
        object.write().replace_fields(fields);
        Ok(object)
    }

    fn read_surrogate(&mut self, at: usize) -> CodecResult<Value> {
        let tag_at = self.reader.offset();
        let proxy_tag = self.reader.read_u8("proxy tag")?;
        let canonical = self.reader.read_str("proxy canonical form")?;
        let buffer_size = self.reader.buffer_size();
        let handlers = self.surrogates.lookup_tag(proxy_tag).ok_or_else(|| {
            CodecError::decode(tag_at, format!("unknown proxy tag {proxy_tag:#04x}"), buffer_size)
        })?;
        let reference = handlers
            .decode(Proxy::new(canonical), &self.resolver)
            .map_err(|e| e.at_offset(at, buffer_size))?;
        Ok(Value::Reference(reference))
    }
}
