//! Per-document decode state.
//!
//! A `DecodeContext` lives for exactly one top-level decode call. It holds
//! the object index keyed by `(type tag, identifier)`, the ancestor chain of
//! objects currently under construction, and the JSON path used in error
//! reports. Nothing here performs I/O; requirement resolution only queries
//! what is already materialized.

use std::collections::HashMap;
use std::fmt;

use crate::decode::registry::DescriptorRegistry;
use crate::decode::requirements::Resolved;
use crate::decode::value::{ExpectedKind, JsonKind};
use crate::error::DecodeError;

/// One step in a JSON path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Key(&'static str),
    Index(usize),
}

/// Location of a value inside the decoded document, e.g. `items[0].user_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn key(key: &'static str) -> Self {
        Path(vec![Segment::Key(key)])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

pub struct DecodeContext<'r> {
    descriptors: &'r DescriptorRegistry,
    index: HashMap<&'static str, HashMap<String, Resolved>>,
    ancestors: Vec<Resolved>,
    path: Vec<Segment>,
}

impl<'r> DecodeContext<'r> {
    pub(crate) fn new(descriptors: &'r DescriptorRegistry) -> Self {
        Self {
            descriptors,
            index: HashMap::new(),
            ancestors: Vec::new(),
            path: Vec::new(),
        }
    }

    pub(crate) fn descriptors(&self) -> &'r DescriptorRegistry {
        self.descriptors
    }

    /// Register an object as soon as it is instantiated. The first
    /// registration for a key wins.
    pub(crate) fn register(&mut self, tag: &'static str, id: String, object: Resolved) {
        self.index.entry(tag).or_default().entry(id).or_insert(object);
    }

    pub fn lookup(&self, tag: &str, id: &str) -> Option<&Resolved> {
        self.index.get(tag)?.get(id)
    }

    pub fn registered(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    pub(crate) fn push_ancestor(&mut self, object: Resolved) {
        self.ancestors.push(object);
    }

    pub(crate) fn pop_ancestor(&mut self) {
        self.ancestors.pop();
    }

    /// Nearest enclosing object under construction whose tag is `kind`.
    pub fn nearest_ancestor(&self, kind: &str) -> Option<&Resolved> {
        self.ancestors.iter().rev().find(|a| a.tag() == kind)
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub(crate) fn enter(&mut self, segment: Segment) {
        self.path.push(segment);
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    pub fn path(&self) -> Path {
        Path(self.path.clone())
    }

    pub(crate) fn mismatch(&self, expected: ExpectedKind, found: JsonKind) -> DecodeError {
        DecodeError::Mismatch {
            path: self.path(),
            expected,
            found,
        }
    }
}
