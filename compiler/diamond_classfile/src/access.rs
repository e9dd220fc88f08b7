//! Access and property flags of classes and members.

use bitflags::bitflags;

bitflags! {
    /// `access_flags` of a class, field, or method.
    ///
    /// Several bits mean different things depending on where they appear
    /// (`0x0020` is `ACC_SUPER` on classes and `ACC_SYNCHRONIZED` on methods),
    /// so only the class-level names are spelled out where they collide.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        /// `ACC_SUPER` on classes, `ACC_SYNCHRONIZED` on methods.
        const SUPER = 0x0020;
        /// `ACC_VOLATILE` on fields, `ACC_BRIDGE` on methods.
        const VOLATILE = 0x0040;
        /// `ACC_TRANSIENT` on fields, `ACC_VARARGS` on methods.
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        /// `ACC_MODULE` on classes, `ACC_MANDATED` on parameters.
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// An annotation interface: both `ACC_ANNOTATION` and `ACC_INTERFACE`.
    pub fn is_annotation(self) -> bool {
        self.contains(AccessFlags::ANNOTATION | AccessFlags::INTERFACE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }
}
