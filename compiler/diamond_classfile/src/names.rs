//! Conversions between the name forms used by the JVM.
//!
//! * binary name: `com.example.Outer$Inner` (what the loader is keyed by)
//! * internal name: `com/example/Outer$Inner` (what class files store)
//! * field descriptor: `Lcom/example/Outer$Inner;`, `[I`, `J`

/// `com/example/Foo` -> `com.example.Foo`.
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `com.example.Foo` -> `com/example/Foo`.
pub fn binary_to_internal(binary: &str) -> String {
    binary.replace('.', "/")
}

/// Binary name of an object-type descriptor (`Lcom/example/Foo;`).
///
/// Returns `None` for array and primitive descriptors.
pub fn descriptor_to_binary(descriptor: &str) -> Option<String> {
    descriptor
        .strip_prefix('L')
        .and_then(|d| d.strip_suffix(';'))
        .filter(|d| !d.is_empty())
        .map(internal_to_binary)
}

/// `com.example.Foo` -> `Lcom/example/Foo;`.
pub fn binary_to_descriptor(binary: &str) -> String {
    format!("L{};", binary_to_internal(binary))
}

/// Whether a field descriptor denotes an array type.
pub fn is_array_descriptor(descriptor: &str) -> bool {
    descriptor.starts_with('[')
}
