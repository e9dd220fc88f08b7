//! Programmatic class file construction for tests.
//!
//! Test suites across the workspace need small, well-formed class files
//! (annotation types, processors, marked test classes) without invoking a
//! Java compiler. [`ClassBuilder`] assembles them directly.
//!
//! Names passed to the builder are binary names (`com.example.Foo`).

use crate::access::AccessFlags;
use crate::annotation::{Annotation, ElementValue, ResolvedAnnotation, ResolvedValue};
use crate::attribute::{Attribute, AttributeBody, Code};
use crate::class::{ClassFile, Member};
use crate::constant::{Constant, ConstantPool, PoolBuilder};
use crate::error::{ClassFileError, Result};
use crate::names::binary_to_internal;

/// Java 8 class files.
pub const JAVA_8: u16 = 52;

/// Method body handed to [`ClassBuilder::method`].
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    /// `(start_pc, line_number)` entries for a `LineNumberTable`.
    pub lines: Vec<(u16, u16)>,
}

impl Bytecode {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        Bytecode {
            max_stack,
            max_locals,
            code,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_lines(mut self, lines: &[(u16, u16)]) -> Self {
        self.lines = lines.to_vec();
        self
    }
}

/// Builder for a single class file.
///
/// Errors from interning are held until [`ClassBuilder::build`].
#[derive(Debug)]
pub struct ClassBuilder {
    pool: PoolBuilder,
    class: ClassFile,
    error: Option<ClassFileError>,
}

impl ClassBuilder {
    /// A public class extending `java.lang.Object`.
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            pool: PoolBuilder::new(),
            class: ClassFile {
                minor_version: 0,
                major_version: JAVA_8,
                constant_pool: ConstantPool::new(),
                access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
                this_class: 0,
                super_class: 0,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                attributes: Vec::new(),
            },
            error: None,
        }
        .with(|b| {
            b.class.this_class = b.pool.class(&binary_to_internal(name))?;
            b.class.super_class = b.pool.class("java/lang/Object")?;
            Ok(())
        })
    }

    /// A public annotation interface with runtime retention left to the caller.
    pub fn annotation_type(name: &str) -> Self {
        ClassBuilder::new(name)
            .access(
                AccessFlags::PUBLIC
                    | AccessFlags::INTERFACE
                    | AccessFlags::ABSTRACT
                    | AccessFlags::ANNOTATION,
            )
            .interface("java.lang.annotation.Annotation")
    }

    fn with(mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&mut self) {
                self.error = Some(e);
            }
        }
        self
    }

    #[must_use]
    pub fn access(mut self, flags: AccessFlags) -> Self {
        self.class.access_flags = flags;
        self
    }

    #[must_use]
    pub fn major_version(mut self, major: u16) -> Self {
        self.class.major_version = major;
        self
    }

    /// Replace the superclass; `None` gives the `java.lang.Object` shape.
    #[must_use]
    pub fn super_class(self, name: Option<&str>) -> Self {
        self.with(|b| {
            b.class.super_class = match name {
                Some(n) => b.pool.class(&binary_to_internal(n))?,
                None => 0,
            };
            Ok(())
        })
    }

    #[must_use]
    pub fn interface(self, name: &str) -> Self {
        self.with(|b| {
            let i = b.pool.class(&binary_to_internal(name))?;
            b.class.interfaces.push(i);
            Ok(())
        })
    }

    #[must_use]
    pub fn field(self, access: AccessFlags, name: &str, descriptor: &str) -> Self {
        self.with(|b| {
            let member = b.member(access, name, descriptor)?;
            b.class.fields.push(member);
            Ok(())
        })
    }

    /// Method without a body (abstract or interface method).
    #[must_use]
    pub fn abstract_method(self, name: &str, descriptor: &str) -> Self {
        self.with(|b| {
            let member = b.member(
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                name,
                descriptor,
            )?;
            b.class.methods.push(member);
            Ok(())
        })
    }

    /// Method with a body. `body` receives the pool so the bytecode can
    /// embed constant indices.
    #[must_use]
    pub fn method(
        self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        body: impl FnOnce(&mut PoolBuilder) -> Result<Bytecode>,
    ) -> Self {
        self.with(|b| {
            let mut member = b.member(access, name, descriptor)?;
            let bytecode = body(&mut b.pool)?;
            let mut code_attrs = Vec::new();
            if !bytecode.lines.is_empty() {
                let mut table = Vec::with_capacity(2 + bytecode.lines.len() * 4);
                let count = u16::try_from(bytecode.lines.len())
                    .map_err(|_| ClassFileError::PoolOverflow("line number table length"))?;
                table.extend_from_slice(&count.to_be_bytes());
                for (pc, line) in &bytecode.lines {
                    table.extend_from_slice(&pc.to_be_bytes());
                    table.extend_from_slice(&line.to_be_bytes());
                }
                code_attrs.push(Attribute {
                    name: b.pool.utf8("LineNumberTable")?,
                    body: AttributeBody::Raw(table),
                });
            }
            member.attributes.push(Attribute {
                name: b.pool.utf8("Code")?,
                body: AttributeBody::Code(Code {
                    max_stack: bytecode.max_stack,
                    max_locals: bytecode.max_locals,
                    code: bytecode.code,
                    exception_table: Vec::new(),
                    attributes: code_attrs,
                }),
            });
            b.class.methods.push(member);
            Ok(())
        })
    }

    /// `public <init>()` that calls the superclass constructor.
    #[must_use]
    pub fn default_constructor(self) -> Self {
        let super_class = self.class.super_class;
        self.method(AccessFlags::PUBLIC, "<init>", "()V", move |pool| {
            let nat = pool.name_and_type("<init>", "()V")?;
            let init = pool.intern(Constant::MethodRef {
                class: super_class,
                name_and_type: nat,
            })?;
            let [hi, lo] = init.to_be_bytes();
            // aload_0; invokespecial; return
            Ok(Bytecode::new(1, 1, vec![0x2a, 0xb7, hi, lo, 0xb1]))
        })
    }

    /// `public String name()` returning `value` through `ldc`.
    #[must_use]
    pub fn string_method(self, name: &str, value: &str) -> Self {
        self.method(
            AccessFlags::PUBLIC,
            name,
            "()Ljava/lang/String;",
            |pool| {
                let s = pool.string(value)?;
                let s = u8::try_from(s).map_err(|_| ClassFileError::PoolOverflow("ldc operand"))?;
                // ldc; areturn
                Ok(Bytecode::new(1, 1, vec![0x12, s, 0xb0]))
            },
        )
    }

    #[must_use]
    pub fn source_file(self, file: &str) -> Self {
        self.with(|b| {
            let name = b.pool.utf8("SourceFile")?;
            let value = b.pool.utf8(file)?;
            b.class.attributes.push(Attribute {
                name,
                body: AttributeBody::SourceFile(value),
            });
            Ok(())
        })
    }

    /// Add a `RuntimeVisibleAnnotations` entry to the class.
    #[must_use]
    pub fn annotation(self, annotation: &ResolvedAnnotation) -> Self {
        self.with(|b| {
            let lowered = lower_annotation(&mut b.pool, annotation)?;
            let existing = b.class.attributes.iter_mut().find_map(|a| match &mut a.body {
                AttributeBody::Annotations(list) => Some(list),
                _ => None,
            });
            if let Some(list) = existing {
                list.push(lowered);
            } else {
                b.class.attributes.push(Attribute {
                    name: b.pool.utf8("RuntimeVisibleAnnotations")?,
                    body: AttributeBody::Annotations(vec![lowered]),
                });
            }
            Ok(())
        })
    }

    fn member(&mut self, access: AccessFlags, name: &str, descriptor: &str) -> Result<Member> {
        Ok(Member {
            access_flags: access,
            name: self.pool.utf8(name)?,
            descriptor: self.pool.utf8(descriptor)?,
            attributes: Vec::new(),
        })
    }

    pub fn build_class(self) -> Result<ClassFile> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let mut class = self.class;
        class.constant_pool = self.pool.finish();
        Ok(class)
    }

    pub fn build(self) -> Result<Vec<u8>> {
        self.build_class()?.to_bytes()
    }
}

fn lower_annotation(pool: &mut PoolBuilder, a: &ResolvedAnnotation) -> Result<Annotation> {
    let type_index = pool.utf8(&a.descriptor)?;
    let elements = a
        .elements
        .iter()
        .map(|(name, value)| Ok((pool.utf8(name)?, lower_value(pool, value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Annotation {
        type_index,
        elements,
    })
}

fn lower_value(pool: &mut PoolBuilder, value: &ResolvedValue) -> Result<ElementValue> {
    let lowered = match value {
        ResolvedValue::Int(v) => match i32::try_from(*v) {
            Ok(v) => ElementValue::Const {
                tag: b'I',
                index: pool.intern(Constant::Integer(v))?,
            },
            Err(_) => ElementValue::Const {
                tag: b'J',
                index: pool.intern(Constant::Long(*v))?,
            },
        },
        ResolvedValue::Float(v) => ElementValue::Const {
            tag: b'D',
            index: pool.intern(Constant::Double(v.to_bits()))?,
        },
        ResolvedValue::Bool(v) => ElementValue::Const {
            tag: b'Z',
            index: pool.intern(Constant::Integer(i32::from(*v)))?,
        },
        ResolvedValue::Char(c) => ElementValue::Const {
            tag: b'C',
            index: pool.intern(Constant::Integer(
                i32::try_from(u32::from(*c)).unwrap_or(i32::MAX),
            ))?,
        },
        ResolvedValue::String(s) => ElementValue::Const {
            tag: b's',
            index: pool.utf8(s)?,
        },
        ResolvedValue::Enum {
            descriptor,
            constant,
        } => ElementValue::Enum {
            type_name: pool.utf8(descriptor)?,
            const_name: pool.utf8(constant)?,
        },
        ResolvedValue::Class(descriptor) => ElementValue::Class(pool.utf8(descriptor)?),
        ResolvedValue::Annotation(a) => ElementValue::Annotation(lower_annotation(pool, a)?),
        ResolvedValue::Array(values) => ElementValue::Array(
            values
                .iter()
                .map(|v| lower_value(pool, v))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(lowered)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_built_class_parses_back() {
        let bytes = ClassBuilder::new("com.example.Widget")
            .interface("java.io.Serializable")
            .field(AccessFlags::PRIVATE, "size", "I")
            .default_constructor()
            .string_method("label", "widget")
            .source_file("Widget.java")
            .build()
            .unwrap();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.name().unwrap(), "com.example.Widget");
        assert_eq!(class.super_name().unwrap().as_deref(), Some("java.lang.Object"));
        assert_eq!(class.interface_names().unwrap(), vec!["java.io.Serializable"]);
        assert_eq!(
            class.field_signatures().unwrap(),
            vec![("size".to_string(), "I".to_string())]
        );
        assert_eq!(class.method_signatures().unwrap().len(), 2);
        assert_eq!(class.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_annotation_values_resolve() {
        let marker = ResolvedAnnotation {
            descriptor: "Lcom/example/Marker;".to_string(),
            elements: vec![
                ("count".to_string(), ResolvedValue::Int(3)),
                (
                    "names".to_string(),
                    ResolvedValue::Array(vec![
                        ResolvedValue::String("a".to_string()),
                        ResolvedValue::String("b".to_string()),
                    ]),
                ),
                (
                    "kind".to_string(),
                    ResolvedValue::Enum {
                        descriptor: "Ljava/lang/annotation/ElementType;".to_string(),
                        constant: "FIELD".to_string(),
                    },
                ),
                ("type".to_string(), ResolvedValue::Class("[I".to_string())),
            ],
        };
        let bytes = ClassBuilder::new("com.example.Marked")
            .annotation(&marker)
            .build()
            .unwrap();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.runtime_visible_annotations().unwrap(), vec![marker]);
    }

    #[test]
    fn test_annotation_type_flags() {
        let class = ClassBuilder::annotation_type("com.example.Marker")
            .build_class()
            .unwrap();
        assert!(class.access_flags.is_annotation());
        assert_eq!(
            class.interface_names().unwrap(),
            vec!["java.lang.annotation.Annotation"]
        );
    }

    #[test]
    fn test_object_has_no_super() {
        let class = ClassBuilder::new("java.lang.Object")
            .super_class(None)
            .build_class()
            .unwrap();
        assert_eq!(class.super_name().unwrap(), None);
    }
}
