//! Target descriptors: the per-type field and requirement metadata the
//! decoder is driven by.
//!
//! # Design
//! A descriptor is a list of fields, each with a setter. Scalar setters are
//! plain `fn` pointers. Nested setters are boxed closures that call back into
//! the generic decoder for the element type, so the decoder never needs
//! per-type code. `DescriptorBuilder::build` rejects inconsistent
//! declarations up front so decode time never parses or checks metadata.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::decode::context::DecodeContext;
use crate::decode::registry::{DescriptorRegistry, Registrar};
use crate::decode::requirements::{Requirement, RequirementKind};
use crate::decode::value::{self, ExpectedKind, JsonKind, Scalar};
use crate::decode::Decodable;
use crate::error::{DecodeError, DescriptorError};

pub(crate) type NestedDecode<T> = Box<
    dyn Fn(&mut T, &Value, &mut DecodeContext<'_>) -> Result<(), DecodeError> + Send + Sync,
>;

pub enum ScalarSetter<T> {
    Int(fn(&mut T, i64)),
    Float(fn(&mut T, f64)),
    Bool(fn(&mut T, bool)),
    Str(fn(&mut T, String)),
}

impl<T> ScalarSetter<T> {
    pub fn expected(&self) -> ExpectedKind {
        match self {
            ScalarSetter::Int(_) => ExpectedKind::Int,
            ScalarSetter::Float(_) => ExpectedKind::Float,
            ScalarSetter::Bool(_) => ExpectedKind::Bool,
            ScalarSetter::Str(_) => ExpectedKind::String,
        }
    }

    pub(crate) fn coerce(&self, raw: &Value) -> Result<Option<Scalar>, JsonKind> {
        Ok(match self {
            ScalarSetter::Int(_) => value::int(raw)?.map(Scalar::Int),
            ScalarSetter::Float(_) => value::float(raw)?.map(Scalar::Float),
            ScalarSetter::Bool(_) => value::boolean(raw)?.map(Scalar::Bool),
            ScalarSetter::Str(_) => value::string(raw)?.map(Scalar::Str),
        })
    }

    pub(crate) fn assign(&self, target: &mut T, value: Scalar) {
        match (self, value) {
            (ScalarSetter::Int(set), Scalar::Int(v)) => set(target, v),
            (ScalarSetter::Float(set), Scalar::Float(v)) => set(target, v),
            (ScalarSetter::Bool(set), Scalar::Bool(v)) => set(target, v),
            (ScalarSetter::Str(set), Scalar::Str(v)) => set(target, v),
            _ => {}
        }
    }
}

pub enum FieldKind<T> {
    Scalar(ScalarSetter<T>),
    Object {
        tag: &'static str,
        decode: NestedDecode<T>,
    },
    List {
        tag: &'static str,
        decode: NestedDecode<T>,
    },
}

impl<T> FieldKind<T> {
    pub fn expected(&self) -> ExpectedKind {
        match self {
            FieldKind::Scalar(setter) => setter.expected(),
            FieldKind::Object { .. } => ExpectedKind::Object,
            FieldKind::List { .. } => ExpectedKind::List,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldKind::Scalar(_))
    }
}

pub struct Field<T> {
    name: &'static str,
    source: Option<&'static str>,
    optional: bool,
    kind: FieldKind<T>,
}

impl<T> Field<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Alternate JSON key, consulted when the field name itself is absent.
    pub fn source(&self) -> Option<&'static str> {
        self.source
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn kind(&self) -> &FieldKind<T> {
        &self.kind
    }

    /// The JSON key and raw value this field reads from, if present.
    pub(crate) fn locate<'v>(
        &self,
        raw: &'v Map<String, Value>,
    ) -> Option<(&'static str, &'v Value)> {
        if let Some(value) = raw.get(self.name) {
            return Some((self.name, value));
        }
        let source = self.source?;
        raw.get(source).map(|value| (source, value))
    }
}

pub struct Descriptor<T> {
    tag: &'static str,
    fields: Vec<Field<T>>,
    identifier: Option<usize>,
    requirements: Vec<Requirement>,
}

impl<T> Descriptor<T> {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier(&self) -> Option<&Field<T>> {
        self.identifier.map(|i| &self.fields[i])
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Registry key of a raw object, read before it is instantiated so a
    /// repeat occurrence can short-circuit to the existing instance.
    pub(crate) fn identity(&self, raw: &Map<String, Value>) -> Option<String> {
        let field = self.identifier()?;
        let (_, value) = field.locate(raw)?;
        match field.kind() {
            FieldKind::Scalar(setter) => setter.coerce(value).ok().flatten().map(|s| s.key()),
            _ => None,
        }
    }
}

pub struct DescriptorBuilder<T> {
    tag: &'static str,
    fields: Vec<Field<T>>,
    identifier: Option<&'static str>,
    requirements: Vec<Requirement>,
    dependencies: Vec<Registrar>,
    dangling: Option<&'static str>,
}

impl<T: Decodable> DescriptorBuilder<T> {
    pub fn new() -> Self {
        Self {
            tag: T::TAG,
            fields: Vec::new(),
            identifier: None,
            requirements: Vec::new(),
            dependencies: Vec::new(),
            dangling: None,
        }
    }

    fn push(mut self, name: &'static str, kind: FieldKind<T>) -> Self {
        self.fields.push(Field {
            name,
            source: None,
            optional: false,
            kind,
        });
        self
    }

    pub fn int(self, name: &'static str, set: fn(&mut T, i64)) -> Self {
        self.push(name, FieldKind::Scalar(ScalarSetter::Int(set)))
    }

    pub fn float(self, name: &'static str, set: fn(&mut T, f64)) -> Self {
        self.push(name, FieldKind::Scalar(ScalarSetter::Float(set)))
    }

    pub fn boolean(self, name: &'static str, set: fn(&mut T, bool)) -> Self {
        self.push(name, FieldKind::Scalar(ScalarSetter::Bool(set)))
    }

    pub fn string(self, name: &'static str, set: fn(&mut T, String)) -> Self {
        self.push(name, FieldKind::Scalar(ScalarSetter::Str(set)))
    }

    pub fn object<U: Decodable>(mut self, name: &'static str, set: fn(&mut T, Arc<U>)) -> Self {
        self.dependencies.push(DescriptorRegistry::register::<U>);
        let decode: NestedDecode<T> = Box::new(
            move |target: &mut T, raw: &Value, ctx: &mut DecodeContext<'_>| -> Result<(), DecodeError> {
                if let Some(object) = value::object::<U>(raw, ctx)? {
                    set(target, object);
                }
                Ok(())
            },
        );
        self.push(name, FieldKind::Object { tag: U::TAG, decode })
    }

    pub fn list<U: Decodable>(mut self, name: &'static str, set: fn(&mut T, Vec<Arc<U>>)) -> Self {
        self.dependencies.push(DescriptorRegistry::register::<U>);
        let decode: NestedDecode<T> = Box::new(
            move |target: &mut T, raw: &Value, ctx: &mut DecodeContext<'_>| -> Result<(), DecodeError> {
                set(target, value::list::<U>(raw, ctx)?);
                Ok(())
            },
        );
        self.push(name, FieldKind::List { tag: U::TAG, decode })
    }

    /// Read the last declared field from `key` when its own name is absent.
    pub fn source(mut self, key: &'static str) -> Self {
        match self.fields.last_mut() {
            Some(field) => field.source = Some(key),
            None => self.dangling = Some("source"),
        }
        self
    }

    /// Mark the last declared field as optional in the payload.
    ///
    /// Only affects logging: a missing required field is traced, a missing
    /// optional one is not. Neither fails the decode.
    pub fn optional(mut self) -> Self {
        match self.fields.last_mut() {
            Some(field) => field.optional = true,
            None => self.dangling = Some("optional"),
        }
        self
    }

    /// Register decoded instances under the value of scalar field `name`.
    pub fn identifier(mut self, name: &'static str) -> Self {
        self.identifier = Some(name);
        self
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub(crate) fn build(self) -> Result<(Descriptor<T>, Vec<Registrar>), DescriptorError> {
        let tag = self.tag;
        if let Some(modifier) = self.dangling {
            return Err(DescriptorError::DanglingModifier { tag, modifier });
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name) {
                return Err(DescriptorError::DuplicateField {
                    tag,
                    field: field.name,
                });
            }
        }

        let scalar_field = |name: &str| {
            self.fields
                .iter()
                .position(|f| f.name == name && f.kind.is_scalar())
        };

        let identifier = match self.identifier {
            Some(name) => Some(
                scalar_field(name).ok_or(DescriptorError::InvalidIdentifier { tag, field: name })?,
            ),
            None => None,
        };

        let mut slots = HashSet::new();
        for requirement in &self.requirements {
            if !slots.insert(requirement.slot()) {
                return Err(DescriptorError::DuplicateSlot {
                    tag,
                    slot: requirement.slot(),
                });
            }
            if let RequirementKind::IndexLookup { local_field, .. } = requirement.kind() {
                if scalar_field(local_field).is_none() {
                    return Err(DescriptorError::InvalidLookupField {
                        tag,
                        field: *local_field,
                    });
                }
            }
        }

        let descriptor = Descriptor {
            tag,
            fields: self.fields,
            identifier,
            requirements: self.requirements,
        };
        Ok((descriptor, self.dependencies))
    }
}

impl<T: Decodable> Default for DescriptorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
