//! A class loader over a fixed table of in-memory class files.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::class::{ClassOrigin, LoadedClass};
use crate::error::{LoadError, Result};
use crate::resolver::ClassResolver;

/// Per-name definition slot. The mutex serializes definition of one name
/// without blocking lookups of other names.
type Slot = Arc<Mutex<Option<Arc<LoadedClass>>>>;

/// Loads classes from a fixed `binary name -> bytes` table, delegating
/// every other name to a parent resolver.
///
/// Names in the table are always defined from the table, even when the
/// parent could resolve them too. Each name is defined at most once per
/// loader: concurrent `load` calls for the same name block on the same
/// slot and observe the same `Arc`.
pub struct IsolatedClassLoader {
    classes: FxHashMap<String, Arc<[u8]>>,
    slots: DashMap<String, Slot>,
    parent: Arc<dyn ClassResolver>,
}

impl IsolatedClassLoader {
    pub fn new(
        classes: impl IntoIterator<Item = (String, Arc<[u8]>)>,
        parent: Arc<dyn ClassResolver>,
    ) -> Self {
        IsolatedClassLoader {
            classes: classes.into_iter().collect(),
            slots: DashMap::new(),
            parent,
        }
    }

    /// Whether `name` is defined from this loader's own table.
    pub fn owns(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Names in this loader's own table, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(String::as_str)
    }

    /// Resolve `name`: cached definition, else own table, else parent.
    pub fn load(&self, name: &str) -> Result<Arc<LoadedClass>> {
        let Some(bytes) = self.classes.get(name) else {
            return self.parent.resolve(name);
        };

        // Clone the slot out so the shard lock is released before the
        // (possibly slow) definition runs.
        let slot = Arc::clone(
            &self
                .slots
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None))),
        );
        let mut defined = slot.lock();
        if let Some(class) = defined.as_ref() {
            return Ok(Arc::clone(class));
        }

        tracing::trace!(name, "defining class from isolated table");
        let class = LoadedClass::from_bytes(bytes, ClassOrigin::Isolated).map_err(|e| match e {
            LoadError::Malformed { source, .. } => LoadError::Malformed {
                name: name.to_string(),
                source,
            },
            other => other,
        })?;
        if class.name != name {
            return Err(LoadError::WrongName {
                expected: name.to_string(),
                found: class.name,
            });
        }
        let class = Arc::new(class);
        *defined = Some(Arc::clone(&class));
        Ok(class)
    }
}

impl ClassResolver for IsolatedClassLoader {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>> {
        self.load(name)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
