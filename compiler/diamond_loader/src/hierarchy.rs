//! Transitive supertype queries.

use rustc_hash::FxHashSet;

use crate::class::LoadedClass;
use crate::error::Result;
use crate::resolver::ClassResolver;

/// Every interface `class` implements: its own declared interfaces, those
/// of every superclass up to the root, and all of their superinterfaces.
///
/// Walks an explicit worklist with a visited set, so diamond-shaped and
/// repeated supertype declarations are visited once.
pub fn all_interfaces(class: &LoadedClass, resolver: &dyn ClassResolver) -> Result<FxHashSet<String>> {
    let mut interfaces = FxHashSet::default();
    let mut visited = FxHashSet::default();
    let mut worklist: Vec<(String, bool)> = Vec::new();
    push_supertypes(class, &mut worklist);
    visited.insert(class.name.clone());

    while let Some((name, is_interface)) = worklist.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let supertype = resolver.resolve(&name)?;
        if is_interface || supertype.is_interface() {
            interfaces.insert(name);
        }
        push_supertypes(&supertype, &mut worklist);
    }
    Ok(interfaces)
}

fn push_supertypes(class: &LoadedClass, worklist: &mut Vec<(String, bool)>) {
    if let Some(super_name) = &class.super_name {
        worklist.push((super_name.clone(), false));
    }
    for i in &class.interfaces {
        worklist.push((i.clone(), true));
    }
}

/// Whether `class` implements `interface` (a binary name), directly or
/// through any supertype.
pub fn implements(class: &LoadedClass, interface: &str, resolver: &dyn ClassResolver) -> Result<bool> {
    Ok(all_interfaces(class, resolver)?.contains(interface))
}
