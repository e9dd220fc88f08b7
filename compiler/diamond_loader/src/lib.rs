//! Class loading for Diamond compile tests.
//!
//! Freshly compiled class files are inspected through an
//! [`IsolatedClassLoader`]: a two-tier resolver that defines names from its
//! own in-memory table first and asks a parent [`ClassResolver`] for
//! everything else. The parent chain used in practice is a
//! [`ClasspathResolver`] over the user classpath backed by
//! [`PlatformClasses`].
//!
//! Classification ("does this class implement `Processor`?") is a
//! transitive walk over the supertype graph, see [`all_interfaces`].

mod class;
mod error;
mod hierarchy;
mod loader;
mod resolver;

pub use class::{ClassOrigin, LoadedClass};
pub use error::{LoadError, Result};
pub use hierarchy::{all_interfaces, implements};
pub use loader::IsolatedClassLoader;
pub use resolver::{ClassResolver, ClasspathResolver, PlatformClasses};

/// Binary name of the annotation processor interface.
pub const PROCESSOR_INTERFACE: &str = "javax.annotation.processing.Processor";
