//! Type-keyed store of validated descriptors.
//!
//! Registering a type also registers every type its object and list fields
//! reference, so registering a root envelope payload makes its whole graph
//! decodable. Type tags must be unique across the registry because they key
//! both the object index and ancestor matching.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use tracing::debug;

use crate::decode::descriptor::Descriptor;
use crate::decode::Decodable;
use crate::error::DescriptorError;

pub(crate) type Registrar = fn(&mut DescriptorRegistry) -> Result<(), DescriptorError>;

#[derive(Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    tags: HashMap<&'static str, &'static str>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Decodable>(&mut self) -> Result<(), DescriptorError> {
        let id = TypeId::of::<T>();
        if self.descriptors.contains_key(&id) {
            return Ok(());
        }
        if let Some(existing) = self.tags.get(T::TAG) {
            return Err(DescriptorError::DuplicateTag {
                tag: T::TAG,
                existing: *existing,
                incoming: type_name::<T>(),
            });
        }

        let (descriptor, dependencies) = T::describe().build()?;
        debug!(
            tag = T::TAG,
            fields = descriptor.fields().len(),
            requirements = descriptor.requirements().len(),
            "registered descriptor"
        );
        self.descriptors.insert(id, Box::new(descriptor));
        self.tags.insert(T::TAG, type_name::<T>());

        for register in dependencies {
            register(self)?;
        }
        Ok(())
    }

    pub fn get<T: Decodable>(&self) -> Option<&Descriptor<T>> {
        self.descriptors
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Descriptor<T>>()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.tags.keys().collect();
        tags.sort();
        f.debug_struct("DescriptorRegistry").field("tags", &tags).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DescriptorBuilder;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Leaf;

    impl Decodable for Leaf {
        const TAG: &'static str = "leaf";
        fn describe() -> DescriptorBuilder<Self> {
            DescriptorBuilder::<Self>::new()
        }
    }

    #[derive(Debug, Default)]
    struct Branch {
        leaves: Vec<Arc<Leaf>>,
        children: Vec<Arc<Branch>>,
    }

    impl Decodable for Branch {
        const TAG: &'static str = "branch";
        fn describe() -> DescriptorBuilder<Self> {
            DescriptorBuilder::<Self>::new()
                .list::<Leaf>("leaves", |b, v| b.leaves = v)
                .list::<Branch>("children", |b, v| b.children = v)
        }
    }

    #[derive(Debug, Default)]
    struct Impostor;

    impl Decodable for Impostor {
        const TAG: &'static str = "leaf";
        fn describe() -> DescriptorBuilder<Self> {
            DescriptorBuilder::<Self>::new()
        }
    }

    #[test]
    fn registering_a_root_registers_its_graph() {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Branch>().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains_tag("leaf"));
        assert!(registry.get::<Leaf>().is_some());
        assert!(registry.get::<Branch>().is_some());
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Leaf>().unwrap();
        registry.register::<Leaf>().unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn tags_must_be_unique() {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Leaf>().unwrap();
        let err = registry.register::<Impostor>().unwrap_err();
        assert!(matches!(err, DescriptorError::DuplicateTag { tag: "leaf", .. }));
    }
}
