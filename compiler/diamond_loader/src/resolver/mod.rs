//! Parent resolvers consulted when a loader's own table has no entry.
//!
//! The chain used by discovery is [`ClasspathResolver`] (user classpath
//! directories and jars) falling back to [`PlatformClasses`] (well-known
//! JDK types).

mod classpath;
mod platform;

use std::sync::Arc;

use crate::class::LoadedClass;
use crate::error::Result;

pub use classpath::ClasspathResolver;
pub use platform::PlatformClasses;

/// Resolves binary class names to class definitions.
///
/// Implementations must return the same definition for a name every time
/// it resolves successfully.
pub trait ClassResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>>;
}

impl<R: ClassResolver + ?Sized> ClassResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>> {
        (**self).resolve(name)
    }
}
