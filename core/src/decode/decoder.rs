//! The object graph decoder.
//!
//! # Design
//! Each object goes through the same sequence:
//!
//! 1. Instantiate `T::default()` inside `Arc::new_cyclic`, so a weak handle
//!    to the object exists before any child is decoded.
//! 2. Register `(tag, identifier)` in the context index. The identifier is
//!    read from the raw object, so the entry exists while the object's own
//!    subtree is decoded.
//! 3. Assign every descriptor field. The object is pushed on the ancestor
//!    chain while its nested fields recurse.
//! 4. Resolve requirements in declaration order and deliver each one.
//! 5. Run the post-decode hook.
//!
//! An identified object that is already registered short-circuits to the
//! existing instance, so repeated payload entries share one `Arc`. A repeat
//! of an object still under construction (one that reappears inside its own
//! subtree) has no strong handle yet and would own itself, so that reference
//! is left unset; requirements still reach it as an ancestor. Any coercion
//! failure aborts the whole document; the partially built graph is dropped
//! with the context.

use std::any::type_name;
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::decode::context::{DecodeContext, Segment};
use crate::decode::descriptor::{Descriptor, Field, FieldKind};
use crate::decode::registry::DescriptorRegistry;
use crate::decode::requirements::{self, Resolutions, Resolved};
use crate::decode::value::{ExpectedKind, FieldValues, JsonKind};
use crate::decode::Decodable;
use crate::error::DecodeError;

/// Decode one document rooted at `T`. The context is created here and
/// dropped before returning.
pub fn decode_value<T: Decodable>(
    descriptors: &DescriptorRegistry,
    raw: &Value,
) -> Result<Arc<T>, DecodeError> {
    let mut ctx = DecodeContext::new(descriptors);
    let (descriptor, map) = prepare::<T>(raw, &ctx)?;
    let root = instantiate(descriptor, map, &mut ctx)?;
    debug!(tag = T::TAG, registered = ctx.registered(), "decoded document");
    Ok(root)
}

pub fn decode_str<T: Decodable>(
    descriptors: &DescriptorRegistry,
    body: &str,
) -> Result<Arc<T>, DecodeError> {
    let raw: Value = serde_json::from_str(body)?;
    decode_value(descriptors, &raw)
}

pub fn decode_slice<T: Decodable>(
    descriptors: &DescriptorRegistry,
    body: &[u8],
) -> Result<Arc<T>, DecodeError> {
    let raw: Value = serde_json::from_slice(body)?;
    decode_value(descriptors, &raw)
}

/// Decode a nested object, reusing a registered instance when one exists.
///
/// `Ok(None)` means `raw` repeats an object that is still being decoded
/// further up the ancestor chain.
pub(crate) fn decode_object<T: Decodable>(
    raw: &Value,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<Arc<T>>, DecodeError> {
    let (descriptor, map) = prepare::<T>(raw, ctx)?;

    if let Some(id) = descriptor.identity(map) {
        if let Some(registered) = ctx.lookup(T::TAG, &id) {
            return Ok(match registered.upgrade::<T>() {
                Some(existing) => {
                    trace!(tag = T::TAG, id = %id, "reusing registered object");
                    Some(existing)
                }
                None => {
                    debug!(
                        tag = T::TAG,
                        id = %id,
                        "object repeats inside itself, reference left unset"
                    );
                    None
                }
            });
        }
    }

    instantiate(descriptor, map, ctx).map(Some)
}

fn prepare<'r, 'v, T: Decodable>(
    raw: &'v Value,
    ctx: &DecodeContext<'r>,
) -> Result<(&'r Descriptor<T>, &'v Map<String, Value>), DecodeError> {
    let descriptor = ctx
        .descriptors()
        .get::<T>()
        .ok_or(DecodeError::Unregistered {
            type_name: type_name::<T>(),
        })?;
    match raw {
        Value::Object(map) => Ok((descriptor, map)),
        other => Err(ctx.mismatch(ExpectedKind::Object, JsonKind::of(other))),
    }
}

fn instantiate<T: Decodable>(
    descriptor: &Descriptor<T>,
    map: &Map<String, Value>,
    ctx: &mut DecodeContext<'_>,
) -> Result<Arc<T>, DecodeError> {
    let mut failure = None;
    let object = Arc::new_cyclic(|this| match build(descriptor, map, this, ctx) {
        Ok(object) => object,
        Err(err) => {
            failure = Some(err);
            T::default()
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(object),
    }
}

fn build<T: Decodable>(
    descriptor: &Descriptor<T>,
    map: &Map<String, Value>,
    this: &Weak<T>,
    ctx: &mut DecodeContext<'_>,
) -> Result<T, DecodeError> {
    let mut object = T::default();
    let handle = Resolved::new(T::TAG, this.clone());

    if let Some(id) = descriptor.identity(map) {
        ctx.register(T::TAG, id, handle.clone());
    }

    ctx.push_ancestor(handle);
    let assigned = assign_fields(descriptor, map, &mut object, ctx);
    ctx.pop_ancestor();
    let values = assigned?;

    let mut resolutions = Resolutions::default();
    for requirement in descriptor.requirements() {
        let resolved = requirements::resolve(requirement, &values, ctx);
        if resolved.is_none() {
            debug!(tag = T::TAG, slot = requirement.slot(), "requirement unresolved");
        }
        object.on_requirement(requirement.slot(), resolved.as_ref());
        resolutions.push(requirement.slot(), resolved);
    }

    object.on_decode(map, &resolutions);
    Ok(object)
}

fn assign_fields<T: Decodable>(
    descriptor: &Descriptor<T>,
    map: &Map<String, Value>,
    object: &mut T,
    ctx: &mut DecodeContext<'_>,
) -> Result<FieldValues, DecodeError> {
    let mut values = FieldValues::default();
    for field in descriptor.fields() {
        let Some((key, raw)) = field.locate(map) else {
            if !field.is_optional() {
                trace!(tag = T::TAG, field = field.name(), "field missing from payload");
            }
            continue;
        };
        ctx.enter(Segment::Key(key));
        let result = assign_field(field, raw, object, &mut values, ctx);
        ctx.leave();
        result?;
    }
    Ok(values)
}

fn assign_field<T: Decodable>(
    field: &Field<T>,
    raw: &Value,
    object: &mut T,
    values: &mut FieldValues,
    ctx: &mut DecodeContext<'_>,
) -> Result<(), DecodeError> {
    match field.kind() {
        FieldKind::Scalar(setter) => match setter.coerce(raw) {
            Ok(Some(value)) => {
                setter.assign(object, value.clone());
                values.insert(field.name(), value);
                Ok(())
            }
            Ok(None) => {
                if !raw.is_null() {
                    debug!(
                        tag = T::TAG,
                        field = field.name(),
                        expected = %setter.expected(),
                        "uncoercible scalar left at default"
                    );
                }
                Ok(())
            }
            Err(found) => Err(ctx.mismatch(setter.expected(), found)),
        },
        FieldKind::Object { decode, .. } | FieldKind::List { decode, .. } => {
            decode(object, raw, ctx)
        }
    }
}
