//! Built-in surrogates for the five reference kinds
//!
//! | Kind       | Tag  | Decode needs            |
//! |------------|------|-------------------------|
//! | ActorPath  | 0x01 | nothing                 |
//! | StreamPath | 0x02 | nothing                 |
//! | ActorRef   | 0x03 | actor-handle factory    |
//! | StreamRef  | 0x04 | stream registry         |
//! | ClientRef  | 0x05 | actor-handle factory    |

use crate::error::{CodecError, CodecResult};
use crate::resolution::Resolver;
use crate::surrogate::{Proxy, SurrogateRegistry};
use types::{
    ActorPath, ActorRef, ClientRef, Reference, ReferenceError, ReferenceKind, StreamPath, StreamRef,
};

pub const ACTOR_PATH_TAG: u8 = 0x01;
pub const STREAM_PATH_TAG: u8 = 0x02;
pub const ACTOR_REF_TAG: u8 = 0x03;
pub const STREAM_REF_TAG: u8 = 0x04;
pub const CLIENT_REF_TAG: u8 = 0x05;

/// Proxy tag of a built-in kind
pub fn builtin_tag(kind: ReferenceKind) -> u8 {
    match kind {
        ReferenceKind::ActorPath => ACTOR_PATH_TAG,
        ReferenceKind::StreamPath => STREAM_PATH_TAG,
        ReferenceKind::ActorRef => ACTOR_REF_TAG,
        ReferenceKind::StreamRef => STREAM_REF_TAG,
        ReferenceKind::ClientRef => CLIENT_REF_TAG,
    }
}

/// Encoder shared by every built-in kind, guarded against a mismatched variant
fn canonical_of(kind: ReferenceKind) -> impl Fn(&Reference) -> CodecResult<Proxy> + Send + Sync {
    move |reference| {
        if reference.kind() != kind {
            return Err(CodecError::unsupported(
                reference.kind().type_name(),
                format!("surrogate for {kind} cannot encode it"),
            ));
        }
        Ok(Proxy::new(reference.canonical()))
    }
}

fn decode_actor_path(proxy: Proxy, _resolver: &Resolver<'_>) -> CodecResult<Reference> {
    Ok(ActorPath::deserialize(proxy.canonical())?.into())
}

fn decode_stream_path(proxy: Proxy, _resolver: &Resolver<'_>) -> CodecResult<Reference> {
    Ok(StreamPath::deserialize(proxy.canonical())?.into())
}

fn decode_actor_ref(proxy: Proxy, resolver: &Resolver<'_>) -> CodecResult<Reference> {
    // Validate the address before touching the runtime
    ActorPath::deserialize(proxy.canonical())?;
    let factory = resolver.actor_factory()?;
    Ok(ActorRef::deserialize(proxy.canonical(), factory.as_ref())?.into())
}

fn decode_stream_ref(proxy: Proxy, resolver: &Resolver<'_>) -> CodecResult<Reference> {
    StreamPath::deserialize(proxy.canonical())?;
    let registry = resolver.stream_registry()?;
    Ok(StreamRef::deserialize(proxy.canonical(), registry.as_ref())?.into())
}

fn decode_client_ref(proxy: Proxy, resolver: &Resolver<'_>) -> CodecResult<Reference> {
    if proxy.canonical().is_empty() {
        return Err(ReferenceError::malformed_path(ClientRef::KIND, "").into());
    }
    let factory = resolver.actor_factory()?;
    Ok(ClientRef::deserialize(proxy.canonical(), factory.as_ref())?.into())
}

/// Register the surrogates for all built-in reference kinds
pub fn register_builtin(registry: &mut SurrogateRegistry) -> CodecResult<()> {
    registry.register(
        ReferenceKind::ActorPath,
        ACTOR_PATH_TAG,
        canonical_of(ReferenceKind::ActorPath),
        decode_actor_path,
    )?;
    registry.register(
        ReferenceKind::StreamPath,
        STREAM_PATH_TAG,
        canonical_of(ReferenceKind::StreamPath),
        decode_stream_path,
    )?;
    registry.register(
        ReferenceKind::ActorRef,
        ACTOR_REF_TAG,
        canonical_of(ReferenceKind::ActorRef),
        decode_actor_ref,
    )?;
    registry.register(
        ReferenceKind::StreamRef,
        STREAM_REF_TAG,
        canonical_of(ReferenceKind::StreamRef),
        decode_stream_ref,
    )?;
    registry.register(
        ReferenceKind::ClientRef,
        CLIENT_REF_TAG,
        canonical_of(ReferenceKind::ClientRef),
        decode_client_ref,
    )?;
    Ok(())
}
