//! Descriptor-driven decoding of loosely structured JSON into typed objects.
//!
//! # Overview
//! A DTO implements [`Decodable`]: it names its type tag, describes its
//! fields through a [`DescriptorBuilder`], and optionally receives resolved
//! cross-object requirements and a post-decode callback. The decoder walks a
//! JSON document against those descriptors, sharing one [`DecodeContext`]
//! per document for the object index and the ancestor chain.
//!
//! # Design
//! - Decoding is synchronous and touches no shared state, so independent
//!   documents can be decoded concurrently without coordination.
//! - Unknown keys and `null` values are ignored; only structural mismatches
//!   fail, and they fail the whole document.
//! - Children are owned by their parent through `Arc`; back-references are
//!   `Weak`, so the graph never forms an ownership cycle.

pub mod context;
pub mod decoder;
pub mod descriptor;
pub mod registry;
pub mod requirements;
pub mod value;

use serde_json::{Map, Value};

pub use context::{DecodeContext, Path, Segment};
pub use decoder::{decode_slice, decode_str, decode_value};
pub use descriptor::{Descriptor, DescriptorBuilder, Field, FieldKind, ScalarSetter};
pub use registry::DescriptorRegistry;
pub use requirements::{Requirement, RequirementKind, Resolutions, Resolved};
pub use value::{ExpectedKind, JsonKind, Scalar};

/// A type the object graph decoder can populate.
pub trait Decodable: Default + Send + Sync + Sized + 'static {
    /// Type tag used for index lookups and ancestor matching.
    const TAG: &'static str;

    fn describe() -> DescriptorBuilder<Self>;

    /// Receives each declared requirement, resolved or not, in declaration
    /// order once all fields are assigned.
    fn on_requirement(&mut self, slot: &str, value: Option<&Resolved>) {
        let _ = (slot, value);
    }

    /// Runs last, with the raw JSON object and every requirement outcome.
    fn on_decode(&mut self, raw: &Map<String, Value>, requirements: &Resolutions) {
        let _ = (raw, requirements);
    }
}
