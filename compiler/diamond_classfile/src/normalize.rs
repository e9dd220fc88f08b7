//! Debug-info stripping and constant pool canonicalization.
//!
//! Two class files compiled from sources that differ only in layout
//! (blank lines, comments, line breaks) differ in their debug attributes
//! and, through them, in their constant pools. [`normalize`] drops the
//! debug attributes and rebuilds the pool from what is still referenced,
//! in an order that depends only on the remaining structure.

use rustc_hash::FxHashMap;

use crate::annotation::{Annotation, ElementValue};
use crate::attribute::{Attribute, AttributeBody};
use crate::class::{ClassFile, Member};
use crate::code;
use crate::constant::{Constant, ConstantPool, PoolBuilder};
use crate::error::Result;

/// Strip debug information from a class file and re-serialize it.
///
/// Deterministic and idempotent: the output depends only on the structural
/// content of the input, and normalizing it again yields the same bytes.
#[tracing::instrument(level = "trace", skip_all, fields(len = bytes.len()))]
pub fn normalize(bytes: &[u8]) -> Result<Vec<u8>> {
    let class = ClassFile::parse(bytes)?;
    strip_debug_info(class)?.to_bytes()
}

/// Structural half of [`normalize`], for callers that already parsed.
pub fn strip_debug_info(mut class: ClassFile) -> Result<ClassFile> {
    let old_pool = std::mem::take(&mut class.constant_pool);
    retain_non_debug(&mut class.attributes, &old_pool)?;
    for member in class.fields.iter_mut().chain(class.methods.iter_mut()) {
        retain_non_debug(&mut member.attributes, &old_pool)?;
    }

    let mut remapper = Remapper::new(&old_pool);

    // Constants loaded by the one-byte `ldc` go first so their new
    // indices stay below 256.
    for method in &class.methods {
        for attr in &method.attributes {
            if let AttributeBody::Code(c) = &attr.body {
                for operand in code::pool_operands(&c.code)? {
                    if operand.narrow {
                        remapper.remap(code::operand_value(&c.code, operand))?;
                    }
                }
            }
        }
    }

    class.this_class = remapper.remap(class.this_class)?;
    class.super_class = remapper.remap_optional(class.super_class)?;
    for i in &mut class.interfaces {
        *i = remapper.remap(*i)?;
    }
    for member in class.fields.iter_mut().chain(class.methods.iter_mut()) {
        remapper.member(member)?;
    }
    remapper.attributes(&mut class.attributes)?;

    class.constant_pool = remapper.finish();
    Ok(class)
}

/// Drop debug attributes, recursing into `Code` and `Record` bodies.
fn retain_non_debug(attrs: &mut Vec<Attribute>, pool: &ConstantPool) -> Result<()> {
    let mut kept = Vec::with_capacity(attrs.len());
    for mut attr in attrs.drain(..) {
        if attr.is_debug(pool)? {
            continue;
        }
        match &mut attr.body {
            AttributeBody::Code(c) => retain_non_debug(&mut c.attributes, pool)?,
            AttributeBody::Record(components) => {
                for component in components {
                    retain_non_debug(&mut component.attributes, pool)?;
                }
            }
            _ => {}
        }
        kept.push(attr);
    }
    *attrs = kept;
    Ok(())
}

/// Moves constants from an old pool into a fresh one on first use.
struct Remapper<'a> {
    old: &'a ConstantPool,
    new: PoolBuilder,
    seen: FxHashMap<u16, u16>,
}

impl<'a> Remapper<'a> {
    fn new(old: &'a ConstantPool) -> Self {
        Remapper {
            old,
            new: PoolBuilder::new(),
            seen: FxHashMap::default(),
        }
    }

    fn finish(self) -> ConstantPool {
        self.new.finish()
    }

    fn remap(&mut self, index: u16) -> Result<u16> {
        if let Some(&i) = self.seen.get(&index) {
            return Ok(i);
        }
        let constant = match self.old.get(index)?.clone() {
            c @ (Constant::Utf8(_)
            | Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)) => c,
            Constant::Class(i) => Constant::Class(self.remap(i)?),
            Constant::String(i) => Constant::String(self.remap(i)?),
            Constant::MethodType(i) => Constant::MethodType(self.remap(i)?),
            Constant::Module(i) => Constant::Module(self.remap(i)?),
            Constant::Package(i) => Constant::Package(self.remap(i)?),
            Constant::FieldRef {
                class,
                name_and_type,
            } => Constant::FieldRef {
                class: self.remap(class)?,
                name_and_type: self.remap(name_and_type)?,
            },
            Constant::MethodRef {
                class,
                name_and_type,
            } => Constant::MethodRef {
                class: self.remap(class)?,
                name_and_type: self.remap(name_and_type)?,
            },
            Constant::InterfaceMethodRef {
                class,
                name_and_type,
            } => Constant::InterfaceMethodRef {
                class: self.remap(class)?,
                name_and_type: self.remap(name_and_type)?,
            },
            Constant::NameAndType { name, descriptor } => Constant::NameAndType {
                name: self.remap(name)?,
                descriptor: self.remap(descriptor)?,
            },
            Constant::MethodHandle { kind, reference } => Constant::MethodHandle {
                kind,
                reference: self.remap(reference)?,
            },
            // The bootstrap index points into the BootstrapMethods table,
            // whose order is preserved.
            Constant::Dynamic {
                bootstrap,
                name_and_type,
            } => Constant::Dynamic {
                bootstrap,
                name_and_type: self.remap(name_and_type)?,
            },
            Constant::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => Constant::InvokeDynamic {
                bootstrap,
                name_and_type: self.remap(name_and_type)?,
            },
        };
        let new = self.new.intern(constant)?;
        self.seen.insert(index, new);
        Ok(new)
    }

    fn remap_optional(&mut self, index: u16) -> Result<u16> {
        if index == 0 {
            Ok(0)
        } else {
            self.remap(index)
        }
    }

    fn member(&mut self, member: &mut Member) -> Result<()> {
        member.name = self.remap(member.name)?;
        member.descriptor = self.remap(member.descriptor)?;
        self.attributes(&mut member.attributes)
    }

    fn attributes(&mut self, attrs: &mut [Attribute]) -> Result<()> {
        for attr in attrs {
            attr.name = self.remap(attr.name)?;
            self.body(&mut attr.body)?;
        }
        Ok(())
    }

    fn annotations(&mut self, annotations: &mut [Annotation]) -> Result<()> {
        for a in annotations {
            a.remap(&mut |i| self.remap(i))?;
        }
        Ok(())
    }

    fn body(&mut self, body: &mut AttributeBody) -> Result<()> {
        match body {
            AttributeBody::Code(c) => {
                code::remap_operands(&mut c.code, |i| self.remap(i))?;
                for handler in &mut c.exception_table {
                    handler.catch_type = self.remap_optional(handler.catch_type)?;
                }
                self.attributes(&mut c.attributes)?;
            }
            AttributeBody::ConstantValue(i)
            | AttributeBody::Signature(i)
            | AttributeBody::SourceFile(i)
            | AttributeBody::NestHost(i) => *i = self.remap(*i)?,
            AttributeBody::Exceptions(v)
            | AttributeBody::NestMembers(v)
            | AttributeBody::PermittedSubclasses(v) => {
                for i in v {
                    *i = self.remap(*i)?;
                }
            }
            AttributeBody::InnerClasses(classes) => {
                for c in classes {
                    c.inner_class = self.remap(c.inner_class)?;
                    c.outer_class = self.remap_optional(c.outer_class)?;
                    c.inner_name = self.remap_optional(c.inner_name)?;
                }
            }
            AttributeBody::EnclosingMethod { class, method } => {
                *class = self.remap(*class)?;
                *method = self.remap_optional(*method)?;
            }
            AttributeBody::BootstrapMethods(methods) => {
                for m in methods {
                    m.method_handle = self.remap(m.method_handle)?;
                    for arg in &mut m.arguments {
                        *arg = self.remap(*arg)?;
                    }
                }
            }
            AttributeBody::Record(components) => {
                for c in components {
                    c.name = self.remap(c.name)?;
                    c.descriptor = self.remap(c.descriptor)?;
                    self.attributes(&mut c.attributes)?;
                }
            }
            AttributeBody::AnnotationDefault(value) => self.element_value(value)?,
            AttributeBody::Annotations(annotations) => self.annotations(annotations)?,
            AttributeBody::ParameterAnnotations(params) => {
                for annotations in params {
                    self.annotations(annotations)?;
                }
            }
            AttributeBody::TypeAnnotations(annotations) => {
                for a in annotations {
                    a.annotation.remap(&mut |i| self.remap(i))?;
                }
            }
            AttributeBody::Empty | AttributeBody::Raw(_) => {}
        }
        Ok(())
    }

    fn element_value(&mut self, value: &mut ElementValue) -> Result<()> {
        value.remap(&mut |i| self.remap(i))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
