//! JVM class file model for Diamond.
//!
//! Parses class files into a structure whose constant pool references can
//! be rewritten, writes them back, and provides the debug-info normalizer
//! used to compare a processor's output against hand-written expected
//! source.
//!
//! # Layout
//!
//! - [`ClassFile`]: top-level structure, [`ClassFile::parse`] / [`ClassFile::to_bytes`]
//! - [`ConstantPool`] / [`PoolBuilder`]: reading and rebuilding the pool
//! - [`normalize`]: strip debug attributes and canonicalize the pool
//! - `testing` (feature `testing`): build small class files without a Java compiler

mod access;
mod annotation;
mod attribute;
mod bytes;
mod class;
mod code;
mod constant;
mod error;
mod mutf8;
pub mod names;
mod normalize;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use access::AccessFlags;
pub use annotation::{Annotation, ElementValue, ResolvedAnnotation, ResolvedValue, TypeAnnotation};
pub use attribute::{
    Attribute, AttributeBody, BootstrapMethod, Code, ExceptionHandler, InnerClass,
    RecordComponent, DEBUG_ATTRIBUTES,
};
pub use class::{ClassFile, Member, MAGIC};
pub use constant::{Constant, ConstantPool, PoolBuilder};
pub use error::{ClassFileError, Result};
pub use normalize::{normalize, strip_debug_info};
