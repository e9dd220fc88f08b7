//! The top-level class file structure.

use crate::access::AccessFlags;
use crate::annotation::ResolvedAnnotation;
use crate::attribute::{Attribute, AttributeBody};
use crate::bytes::{ByteReader, ByteWriter};
use crate::constant::ConstantPool;
use crate::error::{ClassFileError, Result};
use crate::names::internal_to_binary;

pub const MAGIC: u32 = 0xCAFE_BABE;

/// A field or a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub access_flags: AccessFlags,
    pub name: u16,
    pub descriptor: u16,
    pub attributes: Vec<Attribute>,
}

impl Member {
    fn parse(r: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Self> {
        Ok(Member {
            access_flags: AccessFlags::from_bits_retain(r.u16()?),
            name: r.u16()?,
            descriptor: r.u16()?,
            attributes: Attribute::parse_list(r, pool)?,
        })
    }

    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.u16(self.access_flags.bits());
        w.u16(self.name);
        w.u16(self.descriptor);
        Attribute::write_list(&self.attributes, w)
    }
}

/// A parsed class file. Indices refer to [`ClassFile::constant_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    /// 0 only for `java.lang.Object` and `module-info`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let magic = r.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor_version = r.u16()?;
        let major_version = r.u16()?;
        let constant_pool = ConstantPool::parse(&mut r)?;
        let access_flags = AccessFlags::from_bits_retain(r.u16()?);
        let this_class = r.u16()?;
        let super_class = r.u16()?;
        let interfaces = r.list(ByteReader::u16)?;
        let fields = r.list(|r| Member::parse(r, &constant_pool))?;
        let methods = r.list(|r| Member::parse(r, &constant_pool))?;
        let attributes = Attribute::parse_list(&mut r, &constant_pool)?;
        if !r.is_empty() {
            return Err(ClassFileError::BadAttribute {
                name: "ClassFile".to_string(),
                reason: format!("{} trailing byte(s)", r.remaining()),
            });
        }
        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new();
        w.u32(MAGIC);
        w.u16(self.minor_version);
        w.u16(self.major_version);
        self.constant_pool.write(&mut w)?;
        w.u16(self.access_flags.bits());
        w.u16(self.this_class);
        w.u16(self.super_class);
        w.len_u16(self.interfaces.len(), "interface count")?;
        for i in &self.interfaces {
            w.u16(*i);
        }
        w.len_u16(self.fields.len(), "field count")?;
        for f in &self.fields {
            f.write(&mut w)?;
        }
        w.len_u16(self.methods.len(), "method count")?;
        for m in &self.methods {
            m.write(&mut w)?;
        }
        Attribute::write_list(&self.attributes, &mut w)?;
        Ok(w.into_inner())
    }

    /// Binary name of this class (`com.example.Foo`).
    pub fn name(&self) -> Result<String> {
        Ok(internal_to_binary(
            &self.constant_pool.class_name(self.this_class)?,
        ))
    }

    /// Binary name of the direct superclass, if any.
    pub fn super_name(&self) -> Result<Option<String>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        let internal = self.constant_pool.class_name(self.super_class)?;
        Ok(Some(internal_to_binary(&internal)))
    }

    /// Binary names of the directly declared superinterfaces.
    pub fn interface_names(&self) -> Result<Vec<String>> {
        self.interfaces
            .iter()
            .map(|&i| Ok(internal_to_binary(&self.constant_pool.class_name(i)?)))
            .collect()
    }

    /// Annotations from `RuntimeVisibleAnnotations` on the class itself.
    pub fn runtime_visible_annotations(&self) -> Result<Vec<ResolvedAnnotation>> {
        let mut out = Vec::new();
        for attr in &self.attributes {
            if let AttributeBody::Annotations(annotations) = &attr.body {
                if attr.name(&self.constant_pool)? == "RuntimeVisibleAnnotations" {
                    for a in annotations {
                        out.push(a.resolve(&self.constant_pool)?);
                    }
                }
            }
        }
        Ok(out)
    }

    /// `(name, descriptor)` of every field, in declaration order.
    pub fn field_signatures(&self) -> Result<Vec<(String, String)>> {
        self.member_signatures(&self.fields)
    }

    /// `(name, descriptor)` of every method, in declaration order.
    pub fn method_signatures(&self) -> Result<Vec<(String, String)>> {
        self.member_signatures(&self.methods)
    }

    fn member_signatures(&self, members: &[Member]) -> Result<Vec<(String, String)>> {
        members
            .iter()
            .map(|m| {
                Ok((
                    self.constant_pool.utf8(m.name)?,
                    self.constant_pool.utf8(m.descriptor)?,
                ))
            })
            .collect()
    }
}
