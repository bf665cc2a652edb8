//! Cross-object requirements and their resolution.
//!
//! # Design
//! A type declares requirements as tagged variants, checked when its
//! descriptor is registered. After all of an object's fields are assigned,
//! each requirement is resolved against the `DecodeContext` in declaration
//! order and handed to the object's `on_requirement` hook. An unresolved
//! requirement is `None`, never an error: upstream payloads omit sibling data
//! inconsistently.
//!
//! Resolved references are non-owning. Every handle wraps a `Weak<T>`, so a
//! child pointing at its parent never keeps the parent alive, and the handle
//! can be produced before the referenced object has finished decoding.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::decode::context::DecodeContext;
use crate::decode::value::FieldValues;

/// A declared cross-object dependency, delivered to the hook under `slot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    slot: &'static str,
    kind: RequirementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementKind {
    /// The object tagged `registry_key` whose identifier equals this
    /// object's `local_field`.
    IndexLookup {
        local_field: &'static str,
        registry_key: &'static str,
    },
    /// The nearest enclosing object tagged `kind`.
    Ancestor { kind: &'static str },
}

impl Requirement {
    pub const fn lookup(
        slot: &'static str,
        local_field: &'static str,
        registry_key: &'static str,
    ) -> Self {
        Self {
            slot,
            kind: RequirementKind::IndexLookup {
                local_field,
                registry_key,
            },
        }
    }

    pub const fn ancestor(slot: &'static str, kind: &'static str) -> Self {
        Self {
            slot,
            kind: RequirementKind::Ancestor { kind },
        }
    }

    pub fn slot(&self) -> &'static str {
        self.slot
    }

    pub fn kind(&self) -> &RequirementKind {
        &self.kind
    }
}

/// A type-erased, non-owning reference to a decoded object.
#[derive(Clone)]
pub struct Resolved {
    tag: &'static str,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Resolved {
    pub(crate) fn new<T: Send + Sync + 'static>(tag: &'static str, object: Weak<T>) -> Self {
        Self {
            tag,
            handle: Arc::new(object),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The weak reference, if the object is a `T`.
    pub fn downgrade<T: Send + Sync + 'static>(&self) -> Option<Weak<T>> {
        (*self.handle).downcast_ref::<Weak<T>>().cloned()
    }

    /// A strong reference, if the object is a `T` and has finished decoding.
    pub fn upgrade<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.downgrade::<T>()?.upgrade()
    }

    /// True when this handle refers to exactly `object`.
    pub fn refers_to<T: Send + Sync + 'static>(&self, object: &Arc<T>) -> bool {
        self.downgrade::<T>()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(object)))
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved").field("tag", &self.tag).finish()
    }
}

/// All requirement outcomes for one object, in declaration order.
#[derive(Debug, Default)]
pub struct Resolutions {
    entries: Vec<(&'static str, Option<Resolved>)>,
}

impl Resolutions {
    pub(crate) fn push(&mut self, slot: &'static str, value: Option<Resolved>) {
        self.entries.push((slot, value));
    }

    pub fn get(&self, slot: &str) -> Option<&Resolved> {
        self.entries
            .iter()
            .find(|(s, _)| *s == slot)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&Resolved>)> {
        self.entries.iter().map(|(slot, value)| (*slot, value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve one requirement for the object whose scalar fields are `values`.
pub fn resolve(
    requirement: &Requirement,
    values: &FieldValues,
    ctx: &DecodeContext<'_>,
) -> Option<Resolved> {
    match requirement.kind() {
        RequirementKind::IndexLookup {
            local_field,
            registry_key,
        } => {
            let id = values.get(local_field)?.key();
            ctx.lookup(registry_key, &id).cloned()
        }
        RequirementKind::Ancestor { kind } => ctx.nearest_ancestor(kind).cloned(),
    }
}
