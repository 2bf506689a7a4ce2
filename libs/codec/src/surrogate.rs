//! # Surrogate Registry
//!
//! ## Purpose
//!
//! Maps each reference kind to a pair of functions that swap a runtime-bound
//! reference for a serializable [`Proxy`] and back. The codec consults the
//! registry whenever it meets a [`Value::Reference`](types::Value).
//!
//! ## Registration Rules
//!
//! - One surrogate per [`ReferenceKind`]: a second registration is a
//!   `DuplicateSurrogate` setup error
//! - Every surrogate claims a one-byte proxy tag written before the proxy;
//!   two kinds claiming the same tag is an `AmbiguousSurrogate` setup error
//!   since the decoder could not tell them apart
//!
//! Encode functions are pure and never see the resolution context. Decode
//! functions receive a [`Resolver`] and pull runtime services from it only
//! when their kind needs them.

use crate::error::{CodecError, CodecResult};
use crate::resolution::Resolver;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use types::{Reference, ReferenceKind};

/// Serializable stand-in for a reference: exactly its canonical string form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    canonical: String,
}

impl Proxy {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn into_canonical(self) -> String {
        self.canonical
    }
}

pub type EncodeFn = Arc<dyn Fn(&Reference) -> CodecResult<Proxy> + Send + Sync>;
pub type DecodeFn = Arc<dyn Fn(Proxy, &Resolver<'_>) -> CodecResult<Reference> + Send + Sync>;

/// Encode/decode pair registered for one reference kind
#[derive(Clone)]
pub struct SurrogateHandlers {
    kind: ReferenceKind,
    proxy_tag: u8,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl SurrogateHandlers {
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn proxy_tag(&self) -> u8 {
        self.proxy_tag
    }

    pub fn encode(&self, reference: &Reference) -> CodecResult<Proxy> {
        (self.encode)(reference)
    }

    pub fn decode(&self, proxy: Proxy, resolver: &Resolver<'_>) -> CodecResult<Reference> {
        (self.decode)(proxy, resolver)
    }
}

impl fmt::Debug for SurrogateHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrogateHandlers")
            .field("kind", &self.kind)
            .field("proxy_tag", &self.proxy_tag)
            .finish_non_exhaustive()
    }
}

/// Reference kind → surrogate mapping
#[derive(Debug, Clone, Default)]
pub struct SurrogateRegistry {
    by_kind: HashMap<ReferenceKind, SurrogateHandlers>,
    by_tag: HashMap<u8, ReferenceKind>,
}

impl SurrogateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the surrogates for every built-in reference kind
    pub fn with_builtin() -> CodecResult<Self> {
        let mut registry = Self::new();
        crate::builtin::register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Register the surrogate for `kind`
    ///
    /// Fails with `DuplicateSurrogate` if `kind` already has one and with
    /// `AmbiguousSurrogate` if `proxy_tag` is claimed by another kind. A
    /// failed registration leaves the registry unchanged.
    pub fn register<E, D>(
        &mut self,
        kind: ReferenceKind,
        proxy_tag: u8,
        encode: E,
        decode: D,
    ) -> CodecResult<()>
    where
        E: Fn(&Reference) -> CodecResult<Proxy> + Send + Sync + 'static,
        D: Fn(Proxy, &Resolver<'_>) -> CodecResult<Reference> + Send + Sync + 'static,
    {
        if self.by_kind.contains_key(&kind) {
            return Err(CodecError::DuplicateSurrogate { kind });
        }
        match self.by_tag.entry(proxy_tag) {
            Entry::Occupied(existing) => Err(CodecError::AmbiguousSurrogate {
                kind,
                existing: *existing.get(),
                tag: proxy_tag,
            }),
            Entry::Vacant(slot) => {
                slot.insert(kind);
                self.by_kind.insert(
                    kind,
                    SurrogateHandlers {
                        kind,
                        proxy_tag,
                        encode: Arc::new(encode),
                        decode: Arc::new(decode),
                    },
                );
                debug!(%kind, proxy_tag, "Registered surrogate");
                Ok(())
            }
        }
    }

    pub fn lookup(&self, kind: ReferenceKind) -> Option<&SurrogateHandlers> {
        self.by_kind.get(&kind)
    }

    /// Surrogate that owns a proxy tag read off the wire
    pub fn lookup_tag(&self, proxy_tag: u8) -> Option<&SurrogateHandlers> {
        self.by_tag
            .get(&proxy_tag)
            .and_then(|kind| self.by_kind.get(kind))
    }

    pub fn contains(&self, kind: ReferenceKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Registered kinds in tag order
    pub fn kinds(&self) -> Vec<ReferenceKind> {
        let mut tags: Vec<_> = self.by_tag.iter().collect();
        tags.sort_by_key(|(tag, _)| **tag);
        tags.into_iter().map(|(_, kind)| *kind).collect()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
