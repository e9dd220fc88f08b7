//! Constant pool entries and the pool itself.

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{ClassFileError, Result};
use crate::mutf8;
use rustc_hash::FxHashMap;

/// A single constant pool entry.
///
/// Index-valued fields refer to other entries of the same pool.
/// Floating-point constants are kept as raw bits so entries can be
/// hashed and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Raw modified UTF-8 bytes.
    Utf8(Vec<u8>),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType(u16),
    Dynamic { bootstrap: u16, name_and_type: u16 },
    InvokeDynamic { bootstrap: u16, name_and_type: u16 },
    Module(u16),
    Package(u16),
}

impl Constant {
    pub const TAG_UTF8: u8 = 1;
    pub const TAG_INTEGER: u8 = 3;
    pub const TAG_FLOAT: u8 = 4;
    pub const TAG_LONG: u8 = 5;
    pub const TAG_DOUBLE: u8 = 6;
    pub const TAG_CLASS: u8 = 7;
    pub const TAG_STRING: u8 = 8;
    pub const TAG_FIELDREF: u8 = 9;
    pub const TAG_METHODREF: u8 = 10;
    pub const TAG_INTERFACE_METHODREF: u8 = 11;
    pub const TAG_NAME_AND_TYPE: u8 = 12;
    pub const TAG_METHOD_HANDLE: u8 = 15;
    pub const TAG_METHOD_TYPE: u8 = 16;
    pub const TAG_DYNAMIC: u8 = 17;
    pub const TAG_INVOKE_DYNAMIC: u8 = 18;
    pub const TAG_MODULE: u8 = 19;
    pub const TAG_PACKAGE: u8 = 20;

    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => Self::TAG_UTF8,
            Constant::Integer(_) => Self::TAG_INTEGER,
            Constant::Float(_) => Self::TAG_FLOAT,
            Constant::Long(_) => Self::TAG_LONG,
            Constant::Double(_) => Self::TAG_DOUBLE,
            Constant::Class(_) => Self::TAG_CLASS,
            Constant::String(_) => Self::TAG_STRING,
            Constant::FieldRef { .. } => Self::TAG_FIELDREF,
            Constant::MethodRef { .. } => Self::TAG_METHODREF,
            Constant::InterfaceMethodRef { .. } => Self::TAG_INTERFACE_METHODREF,
            Constant::NameAndType { .. } => Self::TAG_NAME_AND_TYPE,
            Constant::MethodHandle { .. } => Self::TAG_METHOD_HANDLE,
            Constant::MethodType(_) => Self::TAG_METHOD_TYPE,
            Constant::Dynamic { .. } => Self::TAG_DYNAMIC,
            Constant::InvokeDynamic { .. } => Self::TAG_INVOKE_DYNAMIC,
            Constant::Module(_) => Self::TAG_MODULE,
            Constant::Package(_) => Self::TAG_PACKAGE,
        }
    }

    /// `Long` and `Double` occupy two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }

    fn parse(r: &mut ByteReader<'_>, index: u16) -> Result<Constant> {
        let tag = r.u8()?;
        let c = match tag {
            Self::TAG_UTF8 => {
                let len = r.u16()?;
                Constant::Utf8(r.take(usize::from(len))?.to_vec())
            }
            Self::TAG_INTEGER => Constant::Integer(r.i32()?),
            Self::TAG_FLOAT => Constant::Float(r.u32()?),
            Self::TAG_LONG => Constant::Long(r.i64()?),
            Self::TAG_DOUBLE => Constant::Double(r.u64()?),
            Self::TAG_CLASS => Constant::Class(r.u16()?),
            Self::TAG_STRING => Constant::String(r.u16()?),
            Self::TAG_FIELDREF => Constant::FieldRef {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            Self::TAG_METHODREF => Constant::MethodRef {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            Self::TAG_INTERFACE_METHODREF => Constant::InterfaceMethodRef {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            Self::TAG_NAME_AND_TYPE => Constant::NameAndType {
                name: r.u16()?,
                descriptor: r.u16()?,
            },
            Self::TAG_METHOD_HANDLE => Constant::MethodHandle {
                kind: r.u8()?,
                reference: r.u16()?,
            },
            Self::TAG_METHOD_TYPE => Constant::MethodType(r.u16()?),
            Self::TAG_DYNAMIC => Constant::Dynamic {
                bootstrap: r.u16()?,
                name_and_type: r.u16()?,
            },
            Self::TAG_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                bootstrap: r.u16()?,
                name_and_type: r.u16()?,
            },
            Self::TAG_MODULE => Constant::Module(r.u16()?),
            Self::TAG_PACKAGE => Constant::Package(r.u16()?),
            _ => return Err(ClassFileError::BadConstantTag { tag, index }),
        };
        Ok(c)
    }

    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.u8(self.tag());
        match self {
            Constant::Utf8(bytes) => {
                w.len_u16(bytes.len(), "utf8 constant longer than 65535 bytes")?;
                w.bytes(bytes);
            }
            Constant::Integer(v) => w.bytes(&v.to_be_bytes()),
            Constant::Float(bits) => w.u32(*bits),
            Constant::Long(v) => w.bytes(&v.to_be_bytes()),
            Constant::Double(bits) => w.u64(*bits),
            Constant::Class(i)
            | Constant::String(i)
            | Constant::MethodType(i)
            | Constant::Module(i)
            | Constant::Package(i) => w.u16(*i),
            Constant::FieldRef {
                class,
                name_and_type,
            }
            | Constant::MethodRef {
                class,
                name_and_type,
            }
            | Constant::InterfaceMethodRef {
                class,
                name_and_type,
            } => {
                w.u16(*class);
                w.u16(*name_and_type);
            }
            Constant::NameAndType { name, descriptor } => {
                w.u16(*name);
                w.u16(*descriptor);
            }
            Constant::MethodHandle { kind, reference } => {
                w.u8(*kind);
                w.u16(*reference);
            }
            Constant::Dynamic {
                bootstrap,
                name_and_type,
            }
            | Constant::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => {
                w.u16(*bootstrap);
                w.u16(*name_and_type);
            }
        }
        Ok(())
    }
}

/// The constant pool of one class file.
///
/// Slot 0 and the slot after every wide constant are `None`, so indices
/// from the class file can be used directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool {
            entries: vec![None],
        }
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool::default()
    }

    pub(crate) fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(None);
        let mut index: u32 = 1;
        while index < u32::from(count) {
            let c = Constant::parse(r, u16::try_from(index).unwrap_or(u16::MAX))?;
            let wide = c.is_wide();
            entries.push(Some(c));
            index += 1;
            if wide {
                entries.push(None);
                index += 1;
            }
        }
        Ok(ConstantPool { entries })
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.len_u16(self.entries.len(), "more than 65535 constant pool slots")?;
        for c in self.entries.iter().flatten() {
            c.write(w)?;
        }
        Ok(())
    }

    /// Number of slots, including slot 0 (the `constant_pool_count` field).
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over `(index, constant)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().and_then(|c| Some((u16::try_from(i).ok()?, c))))
    }

    pub fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(usize::from(index))
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::BadConstantIndex(index))
    }

    /// Raw bytes of a `CONSTANT_Utf8` entry.
    pub fn utf8_bytes(&self, index: u16) -> Result<&[u8]> {
        match self.get(index)? {
            Constant::Utf8(bytes) => Ok(bytes),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Decoded `CONSTANT_Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<String> {
        mutf8::decode(self.utf8_bytes(index)?)
    }

    /// Internal name (`java/lang/Object`) of a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }

    /// `(name, descriptor)` of a `CONSTANT_NameAndType` entry.
    pub fn name_and_type(&self, index: u16) -> Result<(String, String)> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "NameAndType",
            }),
        }
    }
}

/// Builds a constant pool, handing out one index per distinct constant.
#[derive(Debug)]
pub struct PoolBuilder {
    entries: Vec<Option<Constant>>,
    index: FxHashMap<Constant, u16>,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        PoolBuilder::new()
    }
}

impl PoolBuilder {
    pub fn new() -> Self {
        PoolBuilder {
            entries: vec![None],
            index: FxHashMap::default(),
        }
    }

    /// Index of `c`, appending it if it is not in the pool yet.
    pub fn intern(&mut self, c: Constant) -> Result<u16> {
        if let Some(&i) = self.index.get(&c) {
            return Ok(i);
        }
        let slots = if c.is_wide() { 2 } else { 1 };
        if self.entries.len() + slots > usize::from(u16::MAX) {
            return Err(ClassFileError::PoolOverflow("more than 65535 constant pool slots"));
        }
        let i = u16::try_from(self.entries.len())
            .map_err(|_| ClassFileError::PoolOverflow("constant pool index"))?;
        let wide = c.is_wide();
        self.index.insert(c.clone(), i);
        self.entries.push(Some(c));
        if wide {
            self.entries.push(None);
        }
        Ok(i)
    }

    pub fn utf8(&mut self, s: &str) -> Result<u16> {
        self.intern(Constant::Utf8(mutf8::encode(s)))
    }

    /// `CONSTANT_Class` for an internal name such as `java/lang/Object`.
    pub fn class(&mut self, internal_name: &str) -> Result<u16> {
        let name = self.utf8(internal_name)?;
        self.intern(Constant::Class(name))
    }

    pub fn string(&mut self, s: &str) -> Result<u16> {
        let value = self.utf8(s)?;
        self.intern(Constant::String(value))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.intern(Constant::NameAndType { name, descriptor })
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.intern(Constant::FieldRef {
            class,
            name_and_type,
        })
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.intern(Constant::MethodRef {
            class,
            name_and_type,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn finish(self) -> ConstantPool {
        ConstantPool {
            entries: self.entries,
        }
    }
}
