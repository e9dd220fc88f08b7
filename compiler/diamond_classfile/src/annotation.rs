//! Annotation structures as stored in class files, plus a resolved view
//! with constant pool references replaced by values.

use crate::bytes::{ByteReader, ByteWriter};
use crate::constant::{Constant, ConstantPool};
use crate::error::{ClassFileError, Result};

/// One `annotation` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Utf8 index of the annotation type descriptor.
    pub type_index: u16,
    /// `(element name Utf8 index, value)` pairs in declaration order.
    pub elements: Vec<(u16, ElementValue)>,
}

/// One `element_value` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// Tags `B C D F I J S Z s`: a constant pool index of the matching kind.
    Const { tag: u8, index: u16 },
    /// Tag `e`: enum type descriptor and constant name (both Utf8).
    Enum { type_name: u16, const_name: u16 },
    /// Tag `c`: return descriptor (Utf8).
    Class(u16),
    /// Tag `@`.
    Annotation(Annotation),
    /// Tag `[`.
    Array(Vec<ElementValue>),
}

impl Annotation {
    pub(crate) fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let type_index = r.u16()?;
        let elements = r.list(|r| Ok((r.u16()?, ElementValue::parse(r)?)))?;
        Ok(Annotation {
            type_index,
            elements,
        })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.u16(self.type_index);
        w.len_u16(self.elements.len(), "annotation element count")?;
        for (name, value) in &self.elements {
            w.u16(*name);
            value.write(w)?;
        }
        Ok(())
    }

    /// Replace every constant pool index using `map`.
    pub(crate) fn remap(&mut self, map: &mut impl FnMut(u16) -> Result<u16>) -> Result<()> {
        self.type_index = map(self.type_index)?;
        for (name, value) in &mut self.elements {
            *name = map(*name)?;
            value.remap(map)?;
        }
        Ok(())
    }

    /// Resolve against the pool the indices belong to.
    pub fn resolve(&self, pool: &ConstantPool) -> Result<ResolvedAnnotation> {
        let descriptor = pool.utf8(self.type_index)?;
        let elements = self
            .elements
            .iter()
            .map(|(name, value)| Ok((pool.utf8(*name)?, value.resolve(pool)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResolvedAnnotation {
            descriptor,
            elements,
        })
    }
}

impl ElementValue {
    pub(crate) fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let tag = r.u8()?;
        let value = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                index: r.u16()?,
            },
            b'e' => ElementValue::Enum {
                type_name: r.u16()?,
                const_name: r.u16()?,
            },
            b'c' => ElementValue::Class(r.u16()?),
            b'@' => ElementValue::Annotation(Annotation::parse(r)?),
            b'[' => ElementValue::Array(r.list(ElementValue::parse)?),
            _ => {
                return Err(ClassFileError::BadAttribute {
                    name: "annotation".to_string(),
                    reason: format!("unknown element_value tag {tag:#04x}"),
                })
            }
        };
        Ok(value)
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        match self {
            ElementValue::Const { tag, index } => {
                w.u8(*tag);
                w.u16(*index);
            }
            ElementValue::Enum {
                type_name,
                const_name,
            } => {
                w.u8(b'e');
                w.u16(*type_name);
                w.u16(*const_name);
            }
            ElementValue::Class(index) => {
                w.u8(b'c');
                w.u16(*index);
            }
            ElementValue::Annotation(a) => {
                w.u8(b'@');
                a.write(w)?;
            }
            ElementValue::Array(values) => {
                w.u8(b'[');
                w.len_u16(values.len(), "annotation array length")?;
                for v in values {
                    v.write(w)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn remap(&mut self, map: &mut impl FnMut(u16) -> Result<u16>) -> Result<()> {
        match self {
            ElementValue::Const { index, .. } | ElementValue::Class(index) => {
                *index = map(*index)?;
            }
            ElementValue::Enum {
                type_name,
                const_name,
            } => {
                *type_name = map(*type_name)?;
                *const_name = map(*const_name)?;
            }
            ElementValue::Annotation(a) => a.remap(map)?,
            ElementValue::Array(values) => {
                for v in values {
                    v.remap(map)?;
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, pool: &ConstantPool) -> Result<ResolvedValue> {
        let value = match self {
            ElementValue::Const { tag: b's', index } => ResolvedValue::String(pool.utf8(*index)?),
            ElementValue::Const { tag, index } => match (tag, pool.get(*index)?) {
                (b'Z', Constant::Integer(v)) => ResolvedValue::Bool(*v != 0),
                (b'C', Constant::Integer(v)) => ResolvedValue::Char(
                    u32::try_from(*v)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER),
                ),
                (b'B' | b'S' | b'I', Constant::Integer(v)) => ResolvedValue::Int(i64::from(*v)),
                (b'J', Constant::Long(v)) => ResolvedValue::Int(*v),
                (b'F', Constant::Float(bits)) => {
                    ResolvedValue::Float(f64::from(f32::from_bits(*bits)))
                }
                (b'D', Constant::Double(bits)) => ResolvedValue::Float(f64::from_bits(*bits)),
                _ => {
                    return Err(ClassFileError::UnexpectedConstant {
                        index: *index,
                        expected: "annotation constant",
                    })
                }
            },
            ElementValue::Enum {
                type_name,
                const_name,
            } => ResolvedValue::Enum {
                descriptor: pool.utf8(*type_name)?,
                constant: pool.utf8(*const_name)?,
            },
            ElementValue::Class(index) => ResolvedValue::Class(pool.utf8(*index)?),
            ElementValue::Annotation(a) => ResolvedValue::Annotation(a.resolve(pool)?),
            ElementValue::Array(values) => ResolvedValue::Array(
                values
                    .iter()
                    .map(|v| v.resolve(pool))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(value)
    }
}

/// `type_annotation` structure (JVMS 4.7.20).
///
/// The target and path are kept as raw bytes: they hold offsets and
/// indices into local tables, never constant pool references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub target_type: u8,
    pub target_info: Vec<u8>,
    pub type_path: Vec<u8>,
    pub annotation: Annotation,
}

impl TypeAnnotation {
    pub(crate) fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let target_type = r.u8()?;
        let info_len = match target_type {
            0x13..=0x15 => 0,
            0x00 | 0x01 | 0x16 => 1,
            0x10..=0x12 | 0x17 | 0x42..=0x46 => 2,
            0x47..=0x4B => 3,
            // localvar_target: u16 table_length, then 6 bytes per entry
            0x40 | 0x41 => {
                let table_len = r.clone().u16()?;
                2 + usize::from(table_len) * 6
            }
            _ => {
                return Err(ClassFileError::BadAttribute {
                    name: "type annotation".to_string(),
                    reason: format!("unknown target_type {target_type:#04x}"),
                })
            }
        };
        let target_info = r.take(info_len)?.to_vec();
        let path_len = r.u8()?;
        let type_path = {
            let mut p = vec![path_len];
            p.extend_from_slice(r.take(usize::from(path_len) * 2)?);
            p
        };
        let annotation = Annotation::parse(r)?;
        Ok(TypeAnnotation {
            target_type,
            target_info,
            type_path,
            annotation,
        })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.u8(self.target_type);
        w.bytes(&self.target_info);
        w.bytes(&self.type_path);
        self.annotation.write(w)
    }
}

/// An annotation with its constant pool references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    /// Type descriptor, e.g. `Lcom/example/Marker;`.
    pub descriptor: String,
    pub elements: Vec<(String, ResolvedValue)>,
}

impl ResolvedAnnotation {
    /// Value of the element called `name`, if it was given explicitly.
    pub fn element(&self, name: &str) -> Option<&ResolvedValue> {
        self.elements
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }
}

/// Resolved `element_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    String(String),
    Enum { descriptor: String, constant: String },
    /// Class literal, as a descriptor (`Lcom/example/Marker;`, `[I`, `V`).
    Class(String),
    Annotation(ResolvedAnnotation),
    Array(Vec<ResolvedValue>),
}

impl ResolvedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::String(s) => Some(s),
            _ => None,
        }
    }
}
