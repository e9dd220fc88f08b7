//! Errors produced while reading or writing class files.

use thiserror::Error;

/// Error type for class file decoding, encoding, and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    /// Input ended before a complete structure could be read.
    #[error("class file truncated at offset {offset}: needed {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    /// The first four bytes are not `0xCAFEBABE`.
    #[error("bad class file magic 0x{0:08X}")]
    BadMagic(u32),

    /// Unknown constant pool tag.
    #[error("unknown constant pool tag {tag} at index {index}")]
    BadConstantTag { tag: u8, index: u16 },

    /// A constant pool index is zero, out of range, or points into the
    /// second half of a wide constant.
    #[error("invalid constant pool index {0}")]
    BadConstantIndex(u16),

    /// A constant pool entry exists but has the wrong kind.
    #[error("constant pool index {index} is not a {expected} constant")]
    UnexpectedConstant { index: u16, expected: &'static str },

    /// An opcode that the JVM does not define.
    #[error("invalid opcode 0x{opcode:02X} at bytecode offset {offset}")]
    BadOpcode { opcode: u8, offset: usize },

    /// Malformed modified UTF-8 in a `CONSTANT_Utf8` entry.
    #[error("invalid modified UTF-8 at byte {0}")]
    BadUtf8(usize),

    /// Rebuilt constant pool would not fit the class file limits.
    #[error("constant pool overflow: {0}")]
    PoolOverflow(&'static str),

    /// An attribute body disagrees with its declared length or layout.
    #[error("malformed `{name}` attribute: {reason}")]
    BadAttribute { name: String, reason: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
