//! Attributes of classes, members, code, and record components.
//!
//! Attributes whose bodies hold constant pool indices are parsed into
//! structures so the indices can be rewritten when the pool is rebuilt.
//! Everything else (including all debug tables) is kept as raw bytes.

use crate::annotation::{Annotation, ElementValue, TypeAnnotation};
use crate::bytes::{ByteReader, ByteWriter};
use crate::constant::ConstantPool;
use crate::error::{ClassFileError, Result};

/// Names of attributes that only carry source positions, local variable
/// names, or verifier frames.
pub const DEBUG_ATTRIBUTES: &[&str] = &[
    "SourceFile",
    "SourceDebugExtension",
    "LineNumberTable",
    "LocalVariableTable",
    "LocalVariableTypeTable",
    "MethodParameters",
    "StackMapTable",
];

/// One attribute: the Utf8 index of its name plus its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: u16,
    pub body: AttributeBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `Class` index, or 0 for a catch-all handler.
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionHandler>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class: u16,
    /// 0 when the class is not a member.
    pub outer_class: u16,
    /// 0 for anonymous classes.
    pub inner_name: u16,
    pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub method_handle: u16,
    pub arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordComponent {
    pub name: u16,
    pub descriptor: u16,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeBody {
    Code(Code),
    ConstantValue(u16),
    Exceptions(Vec<u16>),
    Signature(u16),
    SourceFile(u16),
    InnerClasses(Vec<InnerClass>),
    /// Class index plus an optional (0) `NameAndType` index.
    EnclosingMethod { class: u16, method: u16 },
    NestHost(u16),
    NestMembers(Vec<u16>),
    PermittedSubclasses(Vec<u16>),
    BootstrapMethods(Vec<BootstrapMethod>),
    Record(Vec<RecordComponent>),
    AnnotationDefault(ElementValue),
    /// `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`.
    Annotations(Vec<Annotation>),
    /// `Runtime{Visible,Invisible}ParameterAnnotations`.
    ParameterAnnotations(Vec<Vec<Annotation>>),
    /// `Runtime{Visible,Invisible}TypeAnnotations`.
    TypeAnnotations(Vec<TypeAnnotation>),
    /// Marker attributes such as `Deprecated` and `Synthetic`.
    Empty,
    Raw(Vec<u8>),
}

impl Attribute {
    pub(crate) fn parse_list(r: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Vec<Self>> {
        r.list(|r| Attribute::parse(r, pool))
    }

    fn parse(r: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Self> {
        let name = r.u16()?;
        let len = r.u32()?;
        let len = usize::try_from(len).map_err(|_| ClassFileError::Truncated {
            offset: r.position(),
            needed: usize::MAX,
        })?;
        let data = r.take(len)?;
        let attr_name = pool.utf8(name)?;
        let mut body_reader = ByteReader::new(data);
        let body = AttributeBody::parse(&attr_name, &mut body_reader, pool).map_err(|e| {
            match e {
                ClassFileError::Truncated { .. } => ClassFileError::BadAttribute {
                    name: attr_name.clone(),
                    reason: "body shorter than its contents".to_string(),
                },
                other => other,
            }
        })?;
        if !body_reader.is_empty() {
            return Err(ClassFileError::BadAttribute {
                name: attr_name,
                reason: format!(
                    "{} trailing byte(s)",
                    data.len() - body_reader.position()
                ),
            });
        }
        Ok(Attribute { name, body })
    }

    pub(crate) fn write_list(attrs: &[Attribute], w: &mut ByteWriter) -> Result<()> {
        w.len_u16(attrs.len(), "attribute count")?;
        for a in attrs {
            a.write(w)?;
        }
        Ok(())
    }

    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        let mut body = ByteWriter::new();
        self.body.write(&mut body)?;
        let len = u32::try_from(body.len())
            .map_err(|_| ClassFileError::PoolOverflow("attribute longer than 4 GiB"))?;
        w.u16(self.name);
        w.u32(len);
        w.bytes(&body.into_inner());
        Ok(())
    }

    /// Decoded attribute name.
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<std::borrow::Cow<'p, str>> {
        let bytes = pool.utf8_bytes(self.name)?;
        Ok(String::from_utf8_lossy(bytes))
    }

    pub fn is_debug(&self, pool: &ConstantPool) -> Result<bool> {
        let name = self.name(pool)?;
        Ok(DEBUG_ATTRIBUTES.contains(&name.as_ref()))
    }
}

fn write_u16s(w: &mut ByteWriter, values: &[u16], what: &'static str) -> Result<()> {
    w.len_u16(values.len(), what)?;
    for v in values {
        w.u16(*v);
    }
    Ok(())
}

impl AttributeBody {
    fn parse(name: &str, r: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Self> {
        let body = match name {
            "Code" => {
                let max_stack = r.u16()?;
                let max_locals = r.u16()?;
                let code_len = usize::try_from(r.u32()?).unwrap_or(usize::MAX);
                let code = r.take(code_len)?.to_vec();
                let exception_table = r.list(|r| {
                    Ok(ExceptionHandler {
                        start_pc: r.u16()?,
                        end_pc: r.u16()?,
                        handler_pc: r.u16()?,
                        catch_type: r.u16()?,
                    })
                })?;
                let attributes = Attribute::parse_list(r, pool)?;
                AttributeBody::Code(Code {
                    max_stack,
                    max_locals,
                    code,
                    exception_table,
                    attributes,
                })
            }
            "ConstantValue" => AttributeBody::ConstantValue(r.u16()?),
            "Exceptions" => AttributeBody::Exceptions(r.list(ByteReader::u16)?),
            "Signature" => AttributeBody::Signature(r.u16()?),
            "SourceFile" => AttributeBody::SourceFile(r.u16()?),
            "InnerClasses" => AttributeBody::InnerClasses(r.list(|r| {
                Ok(InnerClass {
                    inner_class: r.u16()?,
                    outer_class: r.u16()?,
                    inner_name: r.u16()?,
                    access_flags: r.u16()?,
                })
            })?),
            "EnclosingMethod" => AttributeBody::EnclosingMethod {
                class: r.u16()?,
                method: r.u16()?,
            },
            "NestHost" => AttributeBody::NestHost(r.u16()?),
            "NestMembers" => AttributeBody::NestMembers(r.list(ByteReader::u16)?),
            "PermittedSubclasses" => AttributeBody::PermittedSubclasses(r.list(ByteReader::u16)?),
            "BootstrapMethods" => AttributeBody::BootstrapMethods(r.list(|r| {
                Ok(BootstrapMethod {
                    method_handle: r.u16()?,
                    arguments: r.list(ByteReader::u16)?,
                })
            })?),
            "Record" => AttributeBody::Record(r.list(|r| {
                Ok(RecordComponent {
                    name: r.u16()?,
                    descriptor: r.u16()?,
                    attributes: Attribute::parse_list(r, pool)?,
                })
            })?),
            "AnnotationDefault" => AttributeBody::AnnotationDefault(ElementValue::parse(r)?),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                AttributeBody::Annotations(r.list(Annotation::parse)?)
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let count = r.u8()?;
                let mut params = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    params.push(r.list(Annotation::parse)?);
                }
                AttributeBody::ParameterAnnotations(params)
            }
            "RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations" => {
                AttributeBody::TypeAnnotations(r.list(TypeAnnotation::parse)?)
            }
            "Deprecated" | "Synthetic" => AttributeBody::Empty,
            _ => {
                let rest = r.take(r.remaining())?;
                AttributeBody::Raw(rest.to_vec())
            }
        };
        Ok(body)
    }

    fn write(&self, w: &mut ByteWriter) -> Result<()> {
        match self {
            AttributeBody::Code(code) => {
                w.u16(code.max_stack);
                w.u16(code.max_locals);
                let len = u32::try_from(code.code.len())
                    .map_err(|_| ClassFileError::PoolOverflow("code longer than 4 GiB"))?;
                w.u32(len);
                w.bytes(&code.code);
                w.len_u16(code.exception_table.len(), "exception table length")?;
                for h in &code.exception_table {
                    w.u16(h.start_pc);
                    w.u16(h.end_pc);
                    w.u16(h.handler_pc);
                    w.u16(h.catch_type);
                }
                Attribute::write_list(&code.attributes, w)?;
            }
            AttributeBody::ConstantValue(i)
            | AttributeBody::Signature(i)
            | AttributeBody::SourceFile(i)
            | AttributeBody::NestHost(i) => w.u16(*i),
            AttributeBody::Exceptions(v) => write_u16s(w, v, "exception count")?,
            AttributeBody::NestMembers(v) => write_u16s(w, v, "nest member count")?,
            AttributeBody::PermittedSubclasses(v) => write_u16s(w, v, "permitted subclass count")?,
            AttributeBody::InnerClasses(classes) => {
                w.len_u16(classes.len(), "inner class count")?;
                for c in classes {
                    w.u16(c.inner_class);
                    w.u16(c.outer_class);
                    w.u16(c.inner_name);
                    w.u16(c.access_flags);
                }
            }
            AttributeBody::EnclosingMethod { class, method } => {
                w.u16(*class);
                w.u16(*method);
            }
            AttributeBody::BootstrapMethods(methods) => {
                w.len_u16(methods.len(), "bootstrap method count")?;
                for m in methods {
                    w.u16(m.method_handle);
                    write_u16s(w, &m.arguments, "bootstrap argument count")?;
                }
            }
            AttributeBody::Record(components) => {
                w.len_u16(components.len(), "record component count")?;
                for c in components {
                    w.u16(c.name);
                    w.u16(c.descriptor);
                    Attribute::write_list(&c.attributes, w)?;
                }
            }
            AttributeBody::AnnotationDefault(value) => value.write(w)?,
            AttributeBody::Annotations(annotations) => {
                w.len_u16(annotations.len(), "annotation count")?;
                for a in annotations {
                    a.write(w)?;
                }
            }
            AttributeBody::ParameterAnnotations(params) => {
                let count = u8::try_from(params.len())
                    .map_err(|_| ClassFileError::PoolOverflow("more than 255 parameters"))?;
                w.u8(count);
                for annotations in params {
                    w.len_u16(annotations.len(), "annotation count")?;
                    for a in annotations {
                        a.write(w)?;
                    }
                }
            }
            AttributeBody::TypeAnnotations(annotations) => {
                w.len_u16(annotations.len(), "type annotation count")?;
                for a in annotations {
                    a.write(w)?;
                }
            }
            AttributeBody::Empty => {}
            AttributeBody::Raw(bytes) => w.bytes(bytes),
        }
        Ok(())
    }
}
