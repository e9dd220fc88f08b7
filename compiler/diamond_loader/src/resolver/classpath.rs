use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use diamond_classfile::names::binary_to_internal;
use parking_lot::Mutex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{ClassResolver, PlatformClasses};
use crate::class::{ClassOrigin, LoadedClass};
use crate::error::{LoadError, Result};

enum Entry {
    Directory(PathBuf),
    Jar {
        path: PathBuf,
        archive: Mutex<ZipArchive<File>>,
    },
}

impl Entry {
    fn path(&self) -> &Path {
        match self {
            Entry::Directory(path) | Entry::Jar { path, .. } => path,
        }
    }

    /// Bytes of `resource` (a `/`-separated `.class` path), if present.
    fn read(&self, resource: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Entry::Directory(dir) => {
                let file = resource.split('/').fold(dir.clone(), |p, part| p.join(part));
                if !file.is_file() {
                    return Ok(None);
                }
                std::fs::read(&file)
                    .map(Some)
                    .map_err(|e| LoadError::io(&file, &e))
            }
            Entry::Jar { path, archive } => {
                let mut archive = archive.lock();
                let mut file = match archive.by_name(resource) {
                    Ok(file) => file,
                    Err(ZipError::FileNotFound) => return Ok(None),
                    Err(e) => return Err(LoadError::archive(path, &e)),
                };
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)
                    .map_err(|e| LoadError::archive(path, &e))?;
                Ok(Some(bytes))
            }
        }
    }
}

/// Resolves classes from classpath directories and jars, falling back to
/// [`PlatformClasses`].
///
/// `java.*` names are always resolved by the platform, as the JVM refuses
/// to define them from the classpath. Missing entries are skipped, the
/// way `javac` treats them.
pub struct ClasspathResolver {
    entries: Vec<Entry>,
    platform: PlatformClasses,
    defined: DashMap<String, Arc<LoadedClass>>,
}

impl ClasspathResolver {
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            if path.is_dir() {
                entries.push(Entry::Directory(path.clone()));
            } else if path.is_file() {
                let file = File::open(path).map_err(|e| LoadError::io(path, &e))?;
                let archive = ZipArchive::new(file).map_err(|e| LoadError::archive(path, &e))?;
                entries.push(Entry::Jar {
                    path: path.clone(),
                    archive: Mutex::new(archive),
                });
            } else {
                tracing::debug!(path = %path.display(), "skipping missing classpath entry");
            }
        }
        Ok(ClasspathResolver {
            entries,
            platform: PlatformClasses::new(),
            defined: DashMap::new(),
        })
    }

    /// A resolver that only knows the platform classes.
    pub fn platform_only() -> Self {
        ClasspathResolver {
            entries: Vec::new(),
            platform: PlatformClasses::new(),
            defined: DashMap::new(),
        }
    }

    /// The directories and jars actually searched, in order.
    pub fn entries(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(Entry::path)
    }

    fn find(&self, name: &str) -> Result<Option<LoadedClass>> {
        let resource = format!("{}.class", binary_to_internal(name));
        for entry in &self.entries {
            let Some(bytes) = entry.read(&resource)? else {
                continue;
            };
            let class =
                LoadedClass::from_bytes(&bytes, ClassOrigin::Classpath(entry.path().to_path_buf()))?;
            if class.name != name {
                return Err(LoadError::WrongName {
                    expected: name.to_string(),
                    found: class.name,
                });
            }
            return Ok(Some(class));
        }
        Ok(None)
    }
}

impl ClassResolver for ClasspathResolver {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>> {
        if let Some(class) = self.defined.get(name) {
            return Ok(Arc::clone(&class));
        }
        if !name.starts_with("java.") {
            if let Some(class) = self.find(name)? {
                tracing::trace!(name, "resolved from classpath");
                let entry = self
                    .defined
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(class));
                return Ok(Arc::clone(&entry));
            }
        }
        self.platform.resolve(name)
    }
}
