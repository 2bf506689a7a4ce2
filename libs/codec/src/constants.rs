//! Payload layout constants and value tags

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Payload magic, "MSG1"
pub const PAYLOAD_MAGIC: u32 = 0x4D53_4731;

pub const PAYLOAD_VERSION: u8 = 1;

/// magic (4) + version (1) + profile (1)
pub const PAYLOAD_HEADER_SIZE: usize = 6;

/// Tag preceding every encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ValueTag {
    Null = 0x00,
    False = 0x01,
    True = 0x02,
    Int = 0x03,
    UInt = 0x04,
    Float = 0x05,
    Str = 0x06,
    Bytes = 0x07,
    Seq = 0x08,
    /// First occurrence of an object
    Record = 0x09,
    /// Later occurrence of an object, by index
    BackRef = 0x0A,
    /// Reference kind replaced by its proxy
    Surrogate = 0x0B,
}

/// Encoding profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Profile {
    /// Version tolerant: record fields tagged by name
    Wire = 1,
    /// Same-process copies: records laid out positionally against a per-call layout table
    Copy = 2,
}

impl Profile {
    pub fn name(self) -> &'static str {
        match self {
            Profile::Wire => "wire",
            Profile::Copy => "copy",
        }
    }
}
